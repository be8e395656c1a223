//! In-memory platform adapter backed by a [`PlatformSnapshot`].
//!
//! Implements every backfill port: directory lookups, invoice generation with
//! sequential numbering, and the audit log.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use backfill_core::{Entity, EventId, OrganizerId};
use backfill_invoicing::{
    ActionKind, ActionLog, Event, GenerationError, Invoice, InvoiceGenerator, Order, OrderCode,
    Organizer, PlatformDirectory, StoreError,
};

use crate::read_model::{InMemoryTenantStore, TenantStore};
use crate::snapshot::{ActionLogEntry, PlatformSnapshot, SnapshotError};

/// Width of the zero-padded counter in invoice numbers.
const INVOICE_NUMBER_DIGITS: usize = 5;

pub struct SnapshotPlatform {
    organizers: Vec<Organizer>,
    events: Vec<Event>,
    orders: InMemoryTenantStore<OrderCode, Order>,
    action_log: RwLock<Vec<ActionLogEntry>>,
}

impl SnapshotPlatform {
    /// Build the platform, checking that every event and order points at an
    /// existing owner and that order codes are unique per organizer.
    pub fn from_snapshot(snapshot: PlatformSnapshot) -> Result<Self, SnapshotError> {
        let PlatformSnapshot {
            organizers,
            events,
            orders,
            action_log,
        } = snapshot;

        let mut organizer_ids = HashSet::new();
        for organizer in &organizers {
            if !organizer_ids.insert(organizer.id) {
                return Err(SnapshotError::Invalid(format!(
                    "duplicate organizer id {}",
                    organizer.id
                )));
            }
        }

        for event in &events {
            if !organizer_ids.contains(&event.organizer_id) {
                return Err(SnapshotError::Invalid(format!(
                    "event {} references unknown organizer {}",
                    event.slug, event.organizer_id
                )));
            }
        }

        let store = InMemoryTenantStore::new();
        let mut seen = HashSet::new();
        for order in orders {
            let organizer_id = events
                .iter()
                .find(|e| e.id == order.event_id)
                .map(|e| e.organizer_id)
                .ok_or_else(|| {
                    SnapshotError::Invalid(format!(
                        "order {} references unknown event {}",
                        order.code, order.event_id
                    ))
                })?;
            if !seen.insert((organizer_id, order.code.clone())) {
                return Err(SnapshotError::Invalid(format!(
                    "duplicate order code {} for organizer {}",
                    order.code, organizer_id
                )));
            }
            store.upsert(organizer_id, order.id().clone(), order);
        }

        Ok(Self {
            organizers,
            events,
            orders: store,
            action_log: RwLock::new(action_log),
        })
    }

    /// Export the current state, orders sorted by code.
    pub fn to_snapshot(&self) -> PlatformSnapshot {
        let mut orders: Vec<Order> = self.orders.list_all().into_iter().map(|(_, o)| o).collect();
        orders.sort_by(|a, b| a.event_id.cmp(&b.event_id).then_with(|| a.code.cmp(&b.code)));

        PlatformSnapshot {
            organizers: self.organizers.clone(),
            events: self.events.clone(),
            orders,
            action_log: self.action_log_entries(),
        }
    }

    pub fn order(&self, organizer_id: OrganizerId, code: &OrderCode) -> Option<Order> {
        self.orders.get(organizer_id, code)
    }

    pub fn action_log_entries(&self) -> Vec<ActionLogEntry> {
        self.action_log
            .read()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn next_invoice_number(
        &self,
        organizer: &Organizer,
        prefix: &str,
    ) -> Result<String, GenerationError> {
        let highest = self
            .orders
            .list(organizer.id)
            .iter()
            .flat_map(|o| o.invoices.iter())
            .filter_map(|i| i.number.strip_prefix(prefix))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let next = highest.checked_add(1).ok_or_else(|| {
            GenerationError::Rejected(format!("invoice numbers with prefix {prefix:?} exhausted"))
        })?;
        Ok(format!("{prefix}{next:0width$}", width = INVOICE_NUMBER_DIGITS))
    }
}

fn invoice_prefix(event: &Event) -> String {
    match event.settings.invoice_numbers_prefix() {
        Some(prefix) => prefix.to_string(),
        None => format!("{}-", event.slug.as_str().to_uppercase()),
    }
}

fn ensure_owned(organizer: &Organizer, event_id: EventId, event: &Event) -> Result<(), StoreError> {
    if event.organizer_id != organizer.id || event_id != event.id {
        return Err(StoreError::TenantIsolation);
    }
    Ok(())
}

impl PlatformDirectory for SnapshotPlatform {
    fn find_organizer(&self, slug: &str) -> Result<Option<Organizer>, StoreError> {
        Ok(self.organizers.iter().find(|o| o.slug.matches(slug)).cloned())
    }

    fn find_event(&self, organizer: &Organizer, slug: &str) -> Result<Option<Event>, StoreError> {
        Ok(self
            .events
            .iter()
            .find(|e| e.organizer_id == organizer.id && e.slug.matches(slug))
            .cloned())
    }

    fn list_orders(&self, organizer: &Organizer, event: &Event) -> Result<Vec<Order>, StoreError> {
        if event.organizer_id != organizer.id {
            return Err(StoreError::TenantIsolation);
        }
        let mut orders: Vec<Order> = self
            .orders
            .list(organizer.id)
            .into_iter()
            .filter(|o| o.event_id == event.id)
            .collect();
        orders.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(orders)
    }
}

impl InvoiceGenerator for SnapshotPlatform {
    fn generate(
        &self,
        organizer: &Organizer,
        event: &Event,
        order: &Order,
    ) -> Result<Invoice, GenerationError> {
        ensure_owned(organizer, order.event_id, event)?;

        let mut stored = self
            .orders
            .get(organizer.id, &order.code)
            .ok_or_else(|| StoreError::OrderNotFound(order.code.clone()))?;

        if stored.invoice_address.is_none() {
            return Err(GenerationError::Rejected(format!(
                "order {} has no invoice address",
                order.code
            )));
        }

        let number = self.next_invoice_number(organizer, &invoice_prefix(event))?;
        let invoice = Invoice::issued(number, Utc::now());
        debug!(order = %order.code, number = %invoice.number, "issued invoice");

        stored.invoices.push(invoice.clone());
        self.orders.upsert(organizer.id, stored.code.clone(), stored);

        let persisted = self
            .orders
            .get(organizer.id, &order.code)
            .is_some_and(|o| o.invoices.iter().any(|i| i.id == invoice.id));
        if !persisted {
            return Err(StoreError::Storage(format!(
                "invoice {} for order {} was not stored",
                invoice.number, order.code
            ))
            .into());
        }
        Ok(invoice)
    }
}

impl ActionLog for SnapshotPlatform {
    fn log_action(
        &self,
        organizer: &Organizer,
        order: &OrderCode,
        action: ActionKind,
        data: Value,
    ) -> Result<(), StoreError> {
        if self.orders.get(organizer.id, order).is_none() {
            return Err(StoreError::OrderNotFound(order.clone()));
        }
        let mut log = self
            .action_log
            .write()
            .map_err(|_| StoreError::Storage("action log lock poisoned".to_string()))?;
        log.push(ActionLogEntry {
            organizer_id: organizer.id,
            order_code: order.clone(),
            action_type: action,
            data,
            logged_at: Utc::now(),
        });
        Ok(())
    }
}
