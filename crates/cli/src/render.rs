//! Report rendering for stdout.

use std::io::{self, Write};

use serde::Serialize;

use backfill_invoicing::{BackfillReport, BackfillSummary, OrderCode};

use crate::OutputFormat;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a BackfillReport,
    summary: BackfillSummary,
}

pub fn write_report(out: &mut impl Write, report: &BackfillReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let doc = JsonReport {
                report,
                summary: report.summary(),
            };
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)
        }
        OutputFormat::Text => write_text(out, report),
    }
}

fn join(codes: &[OrderCode]) -> String {
    codes.iter().map(OrderCode::as_str).collect::<Vec<_>>().join(", ")
}

fn write_text(out: &mut impl Write, report: &BackfillReport) -> io::Result<()> {
    if report.dry_run {
        writeln!(out, "Running Dry Run")?;
    }

    for entry in &report.entries {
        writeln!(out, "Order {}: {}", entry.code, entry.outcome.describe())?;
    }

    writeln!(out)?;
    writeln!(out, "Orders with invoices: {}", join(&report.has_invoice))?;
    writeln!(out, "Unqualified orders: {}", join(&report.not_qualified))?;
    writeln!(out, "Added invoices to orders: {}", join(&report.added))?;
    writeln!(out, "Orders without address: {}", join(&report.has_no_address))?;
    if report.dry_run {
        writeln!(out, "Would add invoices to orders: {}", join(&report.simulated))?;
    }
    if !report.failed.is_empty() {
        let failed: Vec<String> = report
            .failed
            .iter()
            .map(|f| format!("{} ({})", f.code, f.reason))
            .collect();
        writeln!(out, "Failed orders: {}", failed.join(", "))?;
    }

    let summary = report.summary();
    writeln!(out, "Orders: {}", summary.orders)?;
    writeln!(out, "Orders with invoices: {}", summary.with_invoices)?;
    writeln!(out, "Orders without invoices: {}", summary.without_invoices)?;
    writeln!(out, "Orders with errors: {}", summary.with_errors)?;
    writeln!(out, "Failed invoice generations: {}", summary.failed)?;
    Ok(())
}
