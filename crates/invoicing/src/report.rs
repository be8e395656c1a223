//! Run report: per-order entries, outcome buckets and summary counts.

use std::collections::BTreeSet;

use serde::Serialize;

use backfill_core::InvoiceId;

use crate::classify::Classification;
use crate::order::OrderCode;

/// What happened to one order during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderOutcome {
    AlreadyInvoiced,
    NotQualified,
    MissingAddress,
    Created {
        invoice_id: InvoiceId,
        invoice_number: String,
    },
    /// Eligible, but the run was a dry run.
    Simulated,
    Failed {
        reason: String,
    },
}

impl OrderOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            OrderOutcome::AlreadyInvoiced => "already_invoiced",
            OrderOutcome::NotQualified => "not_qualified",
            OrderOutcome::MissingAddress => "missing_address",
            OrderOutcome::Created { .. } => "created",
            OrderOutcome::Simulated => "simulated",
            OrderOutcome::Failed { .. } => "failed",
        }
    }

    /// Human-readable description, completing "Order <code>: ...".
    pub fn describe(&self) -> String {
        match self {
            OrderOutcome::AlreadyInvoiced => "already has an invoice.".to_string(),
            OrderOutcome::NotQualified => "is not qualified.".to_string(),
            OrderOutcome::MissingAddress => "has no invoice address.".to_string(),
            OrderOutcome::Created { invoice_number, .. } => {
                format!("invoice {invoice_number} has been created.")
            }
            OrderOutcome::Simulated => "invoice would be created (dry run).".to_string(),
            OrderOutcome::Failed { reason } => format!("invoice generation failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEntry {
    pub code: OrderCode,
    pub classification: Classification,
    #[serde(flatten)]
    pub outcome: OrderOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedOrder {
    pub code: OrderCode,
    pub reason: String,
}

/// Result of one backfill run over one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub organizer: String,
    pub event: String,
    pub dry_run: bool,
    pub total_orders: usize,
    pub entries: Vec<OrderEntry>,
    pub has_invoice: Vec<OrderCode>,
    pub not_qualified: Vec<OrderCode>,
    pub has_no_address: Vec<OrderCode>,
    pub added: Vec<OrderCode>,
    pub simulated: Vec<OrderCode>,
    pub failed: Vec<FailedOrder>,
}

/// Summary counts derived from a [`BackfillReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub orders: usize,
    pub with_invoices: usize,
    /// Total minus `with_invoices`; not the sum of the other buckets.
    pub without_invoices: usize,
    /// Distinct codes across `not_qualified` and `has_no_address`.
    pub with_errors: usize,
    pub added: usize,
    pub simulated: usize,
    pub failed: usize,
}

impl BackfillReport {
    pub fn new(
        organizer: impl Into<String>,
        event: impl Into<String>,
        dry_run: bool,
        total_orders: usize,
    ) -> Self {
        Self {
            organizer: organizer.into(),
            event: event.into(),
            dry_run,
            total_orders,
            entries: Vec::with_capacity(total_orders),
            has_invoice: Vec::new(),
            not_qualified: Vec::new(),
            has_no_address: Vec::new(),
            added: Vec::new(),
            simulated: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record an order's outcome in its bucket and in the entry log.
    pub fn record(&mut self, code: OrderCode, classification: Classification, outcome: OrderOutcome) {
        match &outcome {
            OrderOutcome::AlreadyInvoiced => self.has_invoice.push(code.clone()),
            OrderOutcome::NotQualified => self.not_qualified.push(code.clone()),
            OrderOutcome::MissingAddress => self.has_no_address.push(code.clone()),
            OrderOutcome::Created { .. } => self.added.push(code.clone()),
            OrderOutcome::Simulated => self.simulated.push(code.clone()),
            OrderOutcome::Failed { reason } => self.failed.push(FailedOrder {
                code: code.clone(),
                reason: reason.clone(),
            }),
        }
        self.entries.push(OrderEntry {
            code,
            classification,
            outcome,
        });
    }

    pub fn summary(&self) -> BackfillSummary {
        let errors: BTreeSet<&OrderCode> = self
            .not_qualified
            .iter()
            .chain(self.has_no_address.iter())
            .collect();

        BackfillSummary {
            orders: self.total_orders,
            with_invoices: self.has_invoice.len(),
            without_invoices: self.total_orders.saturating_sub(self.has_invoice.len()),
            with_errors: errors.len(),
            added: self.added.len(),
            simulated: self.simulated.len(),
            failed: self.failed.len(),
        }
    }
}
