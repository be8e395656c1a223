//! # backfill-cli
//!
//! Operator command that generates missing invoices for one event.
//!
//! ```text
//! backfill-invoices --data platform.json <ORGANIZER> <EVENT> [--dry-run]
//! ```
//!
//! ## Configuration
//!
//! - `BACKFILL_DATA` - platform snapshot file (same as `--data`)
//! - `BACKFILL_LOG_FORMAT` - `text` or `json` log lines on stderr
//! - `RUST_LOG` - log filter (default `info`)

pub mod backfill;
pub mod render;

use std::path::PathBuf;

use clap::Parser;

/// Backfill missing invoices for the orders of one event.
#[derive(Debug, Parser)]
#[command(name = "backfill-invoices")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Organizer slug (case-insensitive).
    pub organizer: String,

    /// Event slug within the organizer (case-insensitive).
    pub event: String,

    /// Classify and report only; generate no invoices and write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Platform snapshot file to read (and update after a real run).
    #[arg(long, env = "BACKFILL_DATA")]
    pub data: PathBuf,

    /// Report format on stdout.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log line format on stderr.
    #[arg(long, value_enum, env = "BACKFILL_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormatArg,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            organizer: self.organizer.clone(),
            event: self.event.clone(),
            dry_run: self.dry_run,
            data: self.data.clone(),
            format: self.format,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Text,
    Json,
}

impl From<LogFormatArg> for backfill_observability::LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => backfill_observability::LogFormat::Text,
            LogFormatArg::Json => backfill_observability::LogFormat::Json,
        }
    }
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub organizer: String,
    pub event: String,
    pub dry_run: bool,
    pub data: PathBuf,
    pub format: OutputFormat,
}
