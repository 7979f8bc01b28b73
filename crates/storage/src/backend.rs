//! Key/value snapshot store interface.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Key/value store holding serialized snapshots, with optional per-key expiry.
///
/// Keys are only ever read and written individually; the one scan operation
/// is prefix enumeration used to discover known components. Expiry is the
/// store's job: an expired key must simply read as absent.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Upsert `value` under `key`. With `ttl`, the key expires after that long.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// All live keys starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output (e.g. "memory", "redis").
    fn backend_name(&self) -> &str;
}
