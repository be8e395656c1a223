//! Infrastructure layer: tenant-isolated storage and the snapshot-backed
//! platform adapter implementing the backfill ports.

pub mod platform;
pub mod read_model;
pub mod snapshot;

pub use platform::SnapshotPlatform;
pub use read_model::{InMemoryTenantStore, TenantStore};
pub use snapshot::{ActionLogEntry, PlatformSnapshot, SnapshotError};
