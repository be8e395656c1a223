//! Backfill executor: resolve organizer and event, classify every order, and
//! generate the invoices that are missing.

use serde_json::json;
use tracing::{error, info, info_span, warn};

use crate::action::ActionKind;
use crate::classify::{Classification, Classifier};
use crate::event::{Event, Organizer};
use crate::order::Order;
use crate::ports::{ActionLog, InvoiceGenerator, InvoiceQualification, PlatformDirectory, StoreError};
use crate::report::{BackfillReport, OrderOutcome};

/// Fatal backfill errors. Per-order outcomes are never errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackfillError {
    #[error("organizer not found: {slug}")]
    OrganizerNotFound { slug: String },
    #[error("event not found: {slug} (organizer {organizer})")]
    EventNotFound { organizer: String, slug: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs the backfill against a set of collaborators.
pub struct BackfillRunner<D, Q, G, L> {
    directory: D,
    qualification: Q,
    generator: G,
    action_log: L,
}

impl<D, Q, G, L> BackfillRunner<D, Q, G, L>
where
    D: PlatformDirectory,
    Q: InvoiceQualification,
    G: InvoiceGenerator,
    L: ActionLog,
{
    pub fn new(directory: D, qualification: Q, generator: G, action_log: L) -> Self {
        Self {
            directory,
            qualification,
            generator,
            action_log,
        }
    }

    /// Resolve `organizer_slug` / `event_slug` and run over all of the event's
    /// orders.
    ///
    /// Fails before listing any order when either slug does not resolve.
    pub fn execute(
        &self,
        organizer_slug: &str,
        event_slug: &str,
        dry_run: bool,
    ) -> Result<BackfillReport, BackfillError> {
        let organizer = self
            .directory
            .find_organizer(organizer_slug)?
            .ok_or_else(|| BackfillError::OrganizerNotFound {
                slug: organizer_slug.to_string(),
            })?;

        let event = self
            .directory
            .find_event(&organizer, event_slug)?
            .ok_or_else(|| BackfillError::EventNotFound {
                organizer: organizer.slug.to_string(),
                slug: event_slug.to_string(),
            })?;

        let orders = self.directory.list_orders(&organizer, &event)?;
        Ok(self.run(&organizer, &event, &orders, dry_run))
    }

    /// Classify and act on `orders`, in sequence.
    pub fn run(
        &self,
        organizer: &Organizer,
        event: &Event,
        orders: &[Order],
        dry_run: bool,
    ) -> BackfillReport {
        let span = info_span!(
            "backfill",
            organizer = %organizer.slug,
            event = %event.slug,
            dry_run
        );
        let _guard = span.enter();

        if dry_run {
            warn!("dry run: no invoices will be generated");
        }
        info!(orders = orders.len(), "scanning orders");

        let classifier = Classifier::new(event, &self.qualification);
        let mut report = BackfillReport::new(
            organizer.slug.as_str(),
            event.slug.as_str(),
            dry_run,
            orders.len(),
        );

        for order in orders {
            let classification = classifier.classify(order);
            let outcome = match classification {
                Classification::AlreadyInvoiced => OrderOutcome::AlreadyInvoiced,
                Classification::NotQualified => OrderOutcome::NotQualified,
                Classification::MissingAddress => OrderOutcome::MissingAddress,
                Classification::Eligible if dry_run => OrderOutcome::Simulated,
                Classification::Eligible => self.create_invoice(organizer, event, order),
            };
            log_outcome(order, &outcome);
            report.record(order.code.clone(), classification, outcome);
        }

        let summary = report.summary();
        info!(
            orders = summary.orders,
            with_invoices = summary.with_invoices,
            added = summary.added,
            simulated = summary.simulated,
            failed = summary.failed,
            with_errors = summary.with_errors,
            "backfill finished"
        );
        report
    }

    fn create_invoice(&self, organizer: &Organizer, event: &Event, order: &Order) -> OrderOutcome {
        let invoice = match self.generator.generate(organizer, event, order) {
            Ok(invoice) => invoice,
            Err(e) => {
                return OrderOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let data = json!({ "invoice": invoice.id, "number": invoice.number });
        if let Err(e) =
            self.action_log
                .log_action(organizer, &order.code, ActionKind::InvoiceGenerated, data)
        {
            warn!(order = %order.code, invoice = %invoice.id, error = %e, "failed to write audit log entry");
        }

        OrderOutcome::Created {
            invoice_id: invoice.id,
            invoice_number: invoice.number,
        }
    }
}

fn log_outcome(order: &Order, outcome: &OrderOutcome) {
    let outcome_label = outcome.label();
    let message = format!("Order {}: {}", order.code, outcome.describe());
    match outcome {
        OrderOutcome::Created { .. } | OrderOutcome::Simulated => {
            info!(order = %order.code, outcome = outcome_label, "{message}")
        }
        OrderOutcome::Failed { .. } => {
            error!(order = %order.code, outcome = outcome_label, "{message}")
        }
        _ => warn!(order = %order.code, outcome = outcome_label, "{message}"),
    }
}
