//! JSON snapshot of the platform data the backfill works on.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use backfill_core::OrganizerId;
use backfill_invoicing::{ActionKind, Event, Order, OrderCode, Organizer};

/// Snapshot load/save failure.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read or write snapshot {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("inconsistent snapshot: {0}")]
    Invalid(String),
}

/// One audit log entry attributed to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub organizer_id: OrganizerId,
    pub order_code: OrderCode,
    pub action_type: ActionKind,
    pub data: Value,
    pub logged_at: DateTime<Utc>,
}

/// Serialized platform state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    #[serde(default)]
    pub organizers: Vec<Organizer>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub action_log: Vec<ActionLogEntry>,
}

impl PlatformSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the snapshot next to `path` and atomically rename it into place.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |source: std::io::Error| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let json = serde_json::to_vec_pretty(self).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backfill_core::{EventId, Slug};
    use backfill_invoicing::{EventSettings, OrderStatus};

    fn sample() -> PlatformSnapshot {
        let organizer = Organizer {
            id: OrganizerId::new(),
            slug: Slug::new("bigevents").unwrap(),
            name: "Big Events".to_string(),
        };
        let event = Event {
            id: EventId::new(),
            organizer_id: organizer.id,
            slug: Slug::new("democon").unwrap(),
            name: "DemoCon".to_string(),
            settings: EventSettings::new().with("invoice_generate", "paid"),
        };
        let order = Order::new(OrderCode::new("Q1W2E").unwrap(), event.id, OrderStatus::Paid);
        PlatformSnapshot {
            organizers: vec![organizer],
            events: vec![event],
            orders: vec![order],
            action_log: vec![],
        }
    }

    #[test]
    fn save_then_load_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform.json");

        let snapshot = sample();
        snapshot.save(&path).unwrap();
        let loaded = PlatformSnapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlatformSnapshot::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn io_error_message_leaves_cause_to_the_source_chain() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlatformSnapshot::load(&dir.path().join("absent.json")).unwrap_err();
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert!(!err.to_string().contains(&cause));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn malformed_json_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{ \"organizers\": [ }").unwrap();

        let err = PlatformSnapshot::load(&path).unwrap_err();
        assert!(matches!(err, SnapshotError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, b"{}").unwrap();
        assert_eq!(PlatformSnapshot::load(&path).unwrap(), PlatformSnapshot::default());
    }
}
