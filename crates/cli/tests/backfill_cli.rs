//! End-to-end runs of the backfill command against a snapshot file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use backfill_cli::{backfill, Config, OutputFormat};
use backfill_core::{EventId, OrganizerId, Slug};
use backfill_infra::PlatformSnapshot;
use backfill_invoicing::{
    ActionKind, BackfillError, Event, EventSettings, Invoice, InvoiceAddress, Order, OrderCode,
    OrderStatus, Organizer,
};

fn address() -> Option<InvoiceAddress> {
    Some(InvoiceAddress {
        company: Some("Acme Tickets GmbH".to_string()),
        street: Some("Hauptstr. 1".to_string()),
        zipcode: Some("10115".to_string()),
        city: Some("Berlin".to_string()),
        country: Some("DE".to_string()),
        ..InvoiceAddress::default()
    })
}

fn order(event: &Event, code: &str, status: OrderStatus) -> Order {
    let mut o = Order::new(OrderCode::new(code).unwrap(), event.id, status);
    o.total = 1500;
    o.invoice_address = address();
    o
}

/// Organizer `bigevents` with events `democon` (invoices on) and `othercon`.
fn write_snapshot(dir: &Path) -> PathBuf {
    let organizer = Organizer {
        id: OrganizerId::new(),
        slug: Slug::new("bigevents").unwrap(),
        name: "Big Events".to_string(),
    };
    let democon = Event {
        id: EventId::new(),
        organizer_id: organizer.id,
        slug: Slug::new("democon").unwrap(),
        name: "DemoCon".to_string(),
        settings: EventSettings::new().with("invoice_generate", "paid"),
    };
    let othercon = Event {
        id: EventId::new(),
        organizer_id: organizer.id,
        slug: Slug::new("othercon").unwrap(),
        name: "OtherCon".to_string(),
        settings: EventSettings::new().with("invoice_generate", "paid"),
    };

    let mut invoiced = order(&democon, "AAA01", OrderStatus::Paid);
    invoiced
        .invoices
        .push(Invoice::issued("DEMOCON-00001", Utc::now()));

    let mut reissue = order(&democon, "AAA02", OrderStatus::Paid);
    reissue
        .invoices
        .push(Invoice::issued("DEMOCON-00002", Utc::now()));
    reissue
        .invoices
        .push(Invoice::cancellation("DEMOCON-00003", Utc::now()));

    let fresh = order(&democon, "AAA03", OrderStatus::Pending);

    let mut no_address = order(&democon, "AAA04", OrderStatus::Paid);
    no_address.invoice_address = None;

    let mut box_office = order(&democon, "AAA05", OrderStatus::Paid);
    box_office.sales_channel = "box_office".to_string();

    let other_event_order = order(&othercon, "BBB01", OrderStatus::Paid);

    let snapshot = PlatformSnapshot {
        organizers: vec![organizer],
        events: vec![democon, othercon],
        orders: vec![invoiced, reissue, fresh, no_address, box_office, other_event_order],
        action_log: vec![],
    };

    let path = dir.join("platform.json");
    snapshot.save(&path).unwrap();
    path
}

fn config(data: PathBuf, organizer: &str, event: &str, dry_run: bool) -> Config {
    Config {
        organizer: organizer.to_string(),
        event: event.to_string(),
        dry_run,
        data,
        format: OutputFormat::Text,
    }
}

#[test]
fn real_run_generates_missing_invoices_and_persists_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    let mut out = Vec::new();
    let report = backfill::execute(&config(path.clone(), "BIGEVENTS", "DemoCon", false), &mut out)
        .unwrap();

    let codes = |v: &[OrderCode]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    assert_eq!(codes(&report.has_invoice), vec!["AAA01"]);
    assert_eq!(codes(&report.added), vec!["AAA02", "AAA03"]);
    assert_eq!(codes(&report.has_no_address), vec!["AAA04"]);
    assert_eq!(codes(&report.not_qualified), vec!["AAA05"]);
    assert_eq!(report.total_orders, 5);

    let saved = PlatformSnapshot::load(&path).unwrap();
    let reissued = saved
        .orders
        .iter()
        .find(|o| o.code.as_str() == "AAA02")
        .unwrap();
    assert_eq!(reissued.invoices.len(), 3);
    assert_eq!(reissued.invoices[2].number, "DEMOCON-00004");
    let fresh = saved
        .orders
        .iter()
        .find(|o| o.code.as_str() == "AAA03")
        .unwrap();
    assert_eq!(fresh.invoices[0].number, "DEMOCON-00005");

    assert_eq!(saved.action_log.len(), 2);
    assert!(saved
        .action_log
        .iter()
        .all(|e| e.action_type == ActionKind::InvoiceGenerated));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Order AAA03: invoice DEMOCON-00005 has been created."));
    assert!(text.contains("Added invoices to orders: AAA02, AAA03\n"));
    assert!(text.contains("Orders without invoices: 4\n"));
    assert!(text.contains("Orders with errors: 2\n"));
}

#[test]
fn second_run_finds_everything_invoiced() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    backfill::execute(&config(path.clone(), "bigevents", "democon", false), &mut Vec::new())
        .unwrap();
    let report =
        backfill::execute(&config(path, "bigevents", "democon", false), &mut Vec::new()).unwrap();

    assert!(report.added.is_empty());
    assert_eq!(report.has_invoice.len(), 3);
}

#[test]
fn dry_run_leaves_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());
    let before = std::fs::read(&path).unwrap();

    let mut out = Vec::new();
    let report =
        backfill::execute(&config(path.clone(), "bigevents", "democon", true), &mut out).unwrap();

    assert!(report.added.is_empty());
    assert_eq!(report.simulated.len(), 2);
    assert_eq!(std::fs::read(&path).unwrap(), before);

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Running Dry Run\n"));
}

#[test]
fn unknown_organizer_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());
    let before = std::fs::read(&path).unwrap();

    let err = backfill::execute(&config(path.clone(), "nobody", "democon", false), &mut Vec::new())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BackfillError>(),
        Some(BackfillError::OrganizerNotFound { .. })
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn unknown_event_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    let err = backfill::execute(&config(path, "bigevents", "nocon", false), &mut Vec::new())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BackfillError>(),
        Some(BackfillError::EventNotFound { .. })
    ));
}

#[test]
fn missing_snapshot_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = backfill::execute(
        &config(dir.path().join("absent.json"), "bigevents", "democon", false),
        &mut Vec::new(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("loading platform snapshot"));
}

#[cfg(target_os = "linux")]
#[test]
fn failed_save_still_writes_the_report() {
    use std::os::fd::AsRawFd;

    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());
    let before = std::fs::read(&path).unwrap();

    // Readable through procfs, but no temp file can be created next to it.
    let file = std::fs::File::open(&path).unwrap();
    let data = PathBuf::from(format!("/proc/self/fd/{}", file.as_raw_fd()));

    let mut out = Vec::new();
    let err = backfill::execute(&config(data, "bigevents", "democon", false), &mut out)
        .unwrap_err();

    assert!(format!("{err:#}").contains("writing platform snapshot"));
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Order AAA03: invoice DEMOCON-00005 has been created."));
    assert!(text.contains("Added invoices to orders: AAA02, AAA03\n"));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    drop(file);
}
