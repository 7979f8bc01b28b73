//! Snapshot storage for vigil.
//!
//! This crate provides:
//! - The [`SnapshotStore`] key/value interface with optional per-key TTL
//! - [`MemoryStore`], an in-process implementation
//! - `RedisStore` behind the `redis` feature
//! - [`Snapshots`], typed upserts and reads on the per-component key scheme

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod snapshots;

use std::sync::Arc;

use tracing::info;

use vigil_core::config::StoreConfig;

pub use backend::SnapshotStore;
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use snapshots::Snapshots;

/// Open the snapshot store selected by config (`memory` or `redis`).
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Snapshot store: in-memory (snapshots are lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
        "redis" => open_redis(&config.redis_url).await,
        other => Err(StoreError::NotConfigured(format!(
            "unknown store backend '{}'; supported: memory, redis",
            other
        ))),
    }
}

#[cfg(feature = "redis")]
async fn open_redis(url: &str) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    Ok(Arc::new(RedisStore::connect(url).await?))
}

#[cfg(not(feature = "redis"))]
async fn open_redis(_url: &str) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    Err(StoreError::NotConfigured(
        "redis snapshot store requires the 'redis' Cargo feature".into(),
    ))
}
