//! The backfill command: load the snapshot, run, persist, render.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use backfill_infra::{PlatformSnapshot, SnapshotPlatform};
use backfill_invoicing::{BackfillReport, BackfillRunner, StandardQualification};

use crate::render;
use crate::Config;

/// Execute the backfill command, writing the report to `out`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or saved, or if the
/// organizer or event does not exist. Per-order failures are reported, not
/// returned. The report is written before the snapshot is saved, so a failed
/// save still leaves the operator with the run's outcome.
pub fn execute(config: &Config, out: &mut impl Write) -> Result<BackfillReport> {
    let snapshot = PlatformSnapshot::load(&config.data)
        .with_context(|| format!("loading platform snapshot {}", config.data.display()))?;
    let platform = Arc::new(
        SnapshotPlatform::from_snapshot(snapshot).context("validating platform snapshot")?,
    );

    let runner = BackfillRunner::new(
        platform.clone(),
        StandardQualification,
        platform.clone(),
        platform.clone(),
    );
    let report = runner.execute(&config.organizer, &config.event, config.dry_run)?;

    render::write_report(out, &report, config.format).context("writing report")?;

    if !config.dry_run && !report.added.is_empty() {
        platform
            .to_snapshot()
            .save(&config.data)
            .with_context(|| format!("writing platform snapshot {}", config.data.display()))?;
        tracing::info!(
            path = %config.data.display(),
            added = report.added.len(),
            "platform snapshot updated"
        );
    }

    Ok(report)
}
