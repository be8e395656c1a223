//! Per-order invoice classification.
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! 1. the order already carries a live invoice ([`Classification::AlreadyInvoiced`]),
//! 2. the event does not issue invoices or the order does not qualify
//!    ([`Classification::NotQualified`]),
//! 3. the order has no billing address ([`Classification::MissingAddress`]),
//! 4. otherwise an invoice should be created ([`Classification::Eligible`]).

use serde::{Deserialize, Serialize};

use crate::event::{Event, InvoiceGenerateMode};
use crate::order::Order;
use crate::ports::InvoiceQualification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AlreadyInvoiced,
    NotQualified,
    MissingAddress,
    Eligible,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::AlreadyInvoiced => "already_invoiced",
            Classification::NotQualified => "not_qualified",
            Classification::MissingAddress => "missing_address",
            Classification::Eligible => "eligible",
        }
    }
}

/// Classifier bound to one event.
///
/// The event's generation mode is resolved once; an unreadable mode disables
/// generation for the whole event.
pub struct Classifier<'a, Q: ?Sized> {
    event: &'a Event,
    mode: Option<InvoiceGenerateMode>,
    qualification: &'a Q,
}

impl<'a, Q> Classifier<'a, Q>
where
    Q: InvoiceQualification + ?Sized,
{
    pub fn new(event: &'a Event, qualification: &'a Q) -> Self {
        let mode = match event.settings.invoice_generate() {
            Ok(mode) => Some(mode),
            Err(e) => {
                tracing::warn!(
                    event = %event.slug,
                    error = %e,
                    "invoice generation mode unreadable; treating event as not generating invoices"
                );
                None
            }
        };
        Self {
            event,
            mode,
            qualification,
        }
    }

    fn generation_enabled(&self) -> bool {
        self.mode.is_some_and(|m| m.generates_invoices())
    }

    pub fn classify(&self, order: &Order) -> Classification {
        if order.has_invoices() && !order.is_reissue_eligible() {
            return Classification::AlreadyInvoiced;
        }

        if !self.generation_enabled() || !self.qualification.is_qualified(self.event, order) {
            return Classification::NotQualified;
        }

        if !order.has_invoice_address() {
            return Classification::MissingAddress;
        }

        Classification::Eligible
    }
}
