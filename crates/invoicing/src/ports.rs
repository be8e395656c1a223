//! Collaborator ports the backfill consumes.
//!
//! Every call takes the organizer (and event where relevant) explicitly; no
//! implementation may rely on ambient tenant state.

use std::sync::Arc;

use serde_json::Value;

use crate::action::ActionKind;
use crate::event::{Event, Organizer};
use crate::invoice::Invoice;
use crate::order::{Order, OrderCode};

/// Storage-level failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderCode),
    #[error("tenant isolation violation")]
    TenantIsolation,
    #[error("storage error: {0}")]
    Storage(String),
}

/// Invoice generation failure for a single order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("invoice generation rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lookup of organizers, events and orders.
pub trait PlatformDirectory: Send + Sync {
    /// Find an organizer by slug (case-insensitive).
    fn find_organizer(&self, slug: &str) -> Result<Option<Organizer>, StoreError>;

    /// Find an event of `organizer` by slug (case-insensitive).
    fn find_event(&self, organizer: &Organizer, slug: &str) -> Result<Option<Event>, StoreError>;

    /// All orders of `event`, in a stable order.
    fn list_orders(&self, organizer: &Organizer, event: &Event) -> Result<Vec<Order>, StoreError>;
}

/// Platform rule deciding whether an order may carry an invoice at all.
pub trait InvoiceQualification: Send + Sync {
    fn is_qualified(&self, event: &Event, order: &Order) -> bool;
}

/// Issues (numbers, renders, persists) a new invoice for an order.
pub trait InvoiceGenerator: Send + Sync {
    fn generate(
        &self,
        organizer: &Organizer,
        event: &Event,
        order: &Order,
    ) -> Result<Invoice, GenerationError>;
}

/// Append-only audit log attributed to orders.
pub trait ActionLog: Send + Sync {
    fn log_action(
        &self,
        organizer: &Organizer,
        order: &OrderCode,
        action: ActionKind,
        data: Value,
    ) -> Result<(), StoreError>;
}

macro_rules! forward_ports {
    ($($wrapper:ty),* $(,)?) => {$(
        impl<S> PlatformDirectory for $wrapper
        where
            S: PlatformDirectory + ?Sized,
        {
            fn find_organizer(&self, slug: &str) -> Result<Option<Organizer>, StoreError> {
                (**self).find_organizer(slug)
            }

            fn find_event(&self, organizer: &Organizer, slug: &str) -> Result<Option<Event>, StoreError> {
                (**self).find_event(organizer, slug)
            }

            fn list_orders(&self, organizer: &Organizer, event: &Event) -> Result<Vec<Order>, StoreError> {
                (**self).list_orders(organizer, event)
            }
        }

        impl<S> InvoiceQualification for $wrapper
        where
            S: InvoiceQualification + ?Sized,
        {
            fn is_qualified(&self, event: &Event, order: &Order) -> bool {
                (**self).is_qualified(event, order)
            }
        }

        impl<S> InvoiceGenerator for $wrapper
        where
            S: InvoiceGenerator + ?Sized,
        {
            fn generate(
                &self,
                organizer: &Organizer,
                event: &Event,
                order: &Order,
            ) -> Result<Invoice, GenerationError> {
                (**self).generate(organizer, event, order)
            }
        }

        impl<S> ActionLog for $wrapper
        where
            S: ActionLog + ?Sized,
        {
            fn log_action(
                &self,
                organizer: &Organizer,
                order: &OrderCode,
                action: ActionKind,
                data: Value,
            ) -> Result<(), StoreError> {
                (**self).log_action(organizer, order, action, data)
            }
        }
    )*};
}

forward_ports!(Arc<S>, &S);
