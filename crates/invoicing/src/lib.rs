//! Invoice backfill domain module.
//!
//! This crate holds the ticketing domain types the backfill reads (organizers,
//! events, orders, invoices), the per-order classification rules, the
//! collaborator ports, and the executor that ties them together. No IO lives
//! here; storage and invoice numbering are supplied through [`ports`].

pub mod action;
pub mod backfill;
pub mod classify;
pub mod event;
pub mod invoice;
pub mod order;
pub mod ports;
pub mod qualification;
pub mod report;

pub use action::ActionKind;
pub use backfill::{BackfillError, BackfillRunner};
pub use classify::{Classification, Classifier};
pub use event::{Event, EventSettings, InvoiceGenerateMode, Organizer};
pub use invoice::Invoice;
pub use order::{InvoiceAddress, Order, OrderCode, OrderStatus};
pub use ports::{
    ActionLog, GenerationError, InvoiceGenerator, InvoiceQualification, PlatformDirectory,
    StoreError,
};
pub use qualification::StandardQualification;
pub use report::{BackfillReport, BackfillSummary, FailedOrder, OrderEntry, OrderOutcome};
