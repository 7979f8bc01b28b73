//! Typed access to the per-component snapshot keys.
//!
//! Key scheme:
//! - `heartbeat:{component_id}` → [`HeartbeatSnapshot`], expires after the heartbeat TTL
//! - `file_status:{component_id}` → [`ComponentFileStatus`], no expiry
//! - `level_status:{component_id}` → [`LevelStatus`], no expiry

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use vigil_core::{ComponentFileStatus, HeartbeatSnapshot, LevelStatus};

use crate::backend::SnapshotStore;
use crate::error::StoreError;

pub const HEARTBEAT_PREFIX: &str = "heartbeat:";
pub const FILE_STATUS_PREFIX: &str = "file_status:";
pub const LEVEL_STATUS_PREFIX: &str = "level_status:";

/// Retention window after which a heartbeat reads as absent.
pub const DEFAULT_HEARTBEAT_TTL: Duration = Duration::from_secs(300);

pub fn heartbeat_key(component_id: &str) -> String {
    format!("{HEARTBEAT_PREFIX}{component_id}")
}

pub fn file_status_key(component_id: &str) -> String {
    format!("{FILE_STATUS_PREFIX}{component_id}")
}

pub fn level_status_key(component_id: &str) -> String {
    format!("{LEVEL_STATUS_PREFIX}{component_id}")
}

/// Snapshot repository over any [`SnapshotStore`].
///
/// Every write is a plain upsert of one key. Reads treat a value that no
/// longer deserializes as absent (logged), so one corrupt snapshot cannot
/// break status reads for the rest of the fleet.
#[derive(Clone)]
pub struct Snapshots {
    store: Arc<dyn SnapshotStore>,
    heartbeat_ttl: Duration,
}

impl Snapshots {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            heartbeat_ttl: DEFAULT_HEARTBEAT_TTL,
        }
    }

    pub fn with_heartbeat_ttl(mut self, ttl: Duration) -> Self {
        self.heartbeat_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn heartbeat_ttl(&self) -> Duration {
        self.heartbeat_ttl
    }

    // ── Write path ────────────────────────────────────────────

    pub async fn record_heartbeat(
        &self,
        component_id: &str,
        snapshot: &HeartbeatSnapshot,
    ) -> Result<(), StoreError> {
        self.put_json(&heartbeat_key(component_id), snapshot, Some(self.heartbeat_ttl))
            .await
    }

    pub async fn record_file_status(
        &self,
        component_id: &str,
        status: &ComponentFileStatus,
    ) -> Result<(), StoreError> {
        self.put_json(&file_status_key(component_id), status, None).await
    }

    pub async fn record_level_status(
        &self,
        component_id: &str,
        status: &LevelStatus,
    ) -> Result<(), StoreError> {
        self.put_json(&level_status_key(component_id), status, None).await
    }

    // ── Read path ─────────────────────────────────────────────

    pub async fn heartbeat(&self, component_id: &str) -> Result<Option<HeartbeatSnapshot>, StoreError> {
        self.get_json(&heartbeat_key(component_id)).await
    }

    pub async fn file_status(
        &self,
        component_id: &str,
    ) -> Result<Option<ComponentFileStatus>, StoreError> {
        self.get_json(&file_status_key(component_id)).await
    }

    pub async fn level_status(&self, component_id: &str) -> Result<Option<LevelStatus>, StoreError> {
        self.get_json(&level_status_key(component_id)).await
    }

    /// Sorted, de-duplicated IDs of every component with at least one live snapshot.
    pub async fn component_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = BTreeSet::new();
        for prefix in [HEARTBEAT_PREFIX, FILE_STATUS_PREFIX, LEVEL_STATUS_PREFIX] {
            for key in self.store.keys_with_prefix(prefix).await? {
                if let Some(id) = key.strip_prefix(prefix) {
                    if !id.is_empty() {
                        ids.insert(id.to_string());
                    }
                }
            }
        }
        Ok(ids.into_iter().collect())
    }

    // ── Helpers ───────────────────────────────────────────────

    async fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json, ttl).await
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding undecodable snapshot");
                Ok(None)
            }
        }
    }
}
