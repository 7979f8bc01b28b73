//! Read-time status assembly.
//!
//! Nothing here writes. Each read pulls the latest snapshots, classifies the
//! heartbeat against the current time and aggregates the three signals.

use chrono::{DateTime, FixedOffset, Utc};

use vigil_core::{
    is_valid_component_id, ComponentFileStatus, ComponentStatus, HeartbeatSnapshot, LevelStatus,
    StatusOverview,
};
use vigil_storage::{Snapshots, StoreError};

use crate::aggregate::aggregate;
use crate::heartbeat::HeartbeatPolicy;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// No heartbeat, file status, or level status exists for the component.
    #[error("component '{0}' not found")]
    NotFound(String),

    #[error("invalid component id '{0}'")]
    InvalidComponentId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Combine one component's snapshots into its externally visible status.
pub fn build_component_status(
    component_id: &str,
    heartbeat: Option<&HeartbeatSnapshot>,
    file_status: Option<ComponentFileStatus>,
    level_status: Option<LevelStatus>,
    policy: &HeartbeatPolicy,
    now: DateTime<FixedOffset>,
) -> ComponentStatus {
    let heartbeat = heartbeat.map(|hb| policy.verdict(hb, &now));
    let overall_status = aggregate(
        heartbeat.as_ref().map(|h| h.status),
        file_status.as_ref().map(|f| f.overall_file_health),
        level_status.as_ref().map(|l| l.compliant),
    );
    ComponentStatus {
        component_id: component_id.to_string(),
        heartbeat,
        file_status,
        level_status,
        overall_status,
    }
}

/// Status queries over the snapshot store.
#[derive(Clone)]
pub struct StatusService {
    snapshots: Snapshots,
    policy: HeartbeatPolicy,
    offset: FixedOffset,
}

impl StatusService {
    pub fn new(snapshots: Snapshots, policy: HeartbeatPolicy, offset: FixedOffset) -> Self {
        Self {
            snapshots,
            policy,
            offset,
        }
    }

    pub fn snapshots(&self) -> &Snapshots {
        &self.snapshots
    }

    /// Status of one component at `now`.
    pub async fn component_status(
        &self,
        component_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ComponentStatus, StatusError> {
        if !is_valid_component_id(component_id) {
            return Err(StatusError::InvalidComponentId(component_id.to_string()));
        }
        let (heartbeat, file_status, level_status) = self.read(component_id).await?;
        if heartbeat.is_none() && file_status.is_none() && level_status.is_none() {
            return Err(StatusError::NotFound(component_id.to_string()));
        }
        Ok(build_component_status(
            component_id,
            heartbeat.as_ref(),
            file_status,
            level_status,
            &self.policy,
            now.with_timezone(&self.offset),
        ))
    }

    /// Status of every component with at least one live snapshot, sorted by ID.
    pub async fn all_statuses(&self, now: DateTime<Utc>) -> Result<StatusOverview, StatusError> {
        let local_now = now.with_timezone(&self.offset);
        let ids = self.snapshots.component_ids().await?;
        let mut components = Vec::with_capacity(ids.len());
        for id in &ids {
            // A snapshot that expired since listing still yields an entry (unknown).
            let (heartbeat, file_status, level_status) = self.read(id).await?;
            components.push(build_component_status(
                id,
                heartbeat.as_ref(),
                file_status,
                level_status,
                &self.policy,
                local_now,
            ));
        }
        Ok(StatusOverview::new(components, local_now))
    }

    async fn read(
        &self,
        component_id: &str,
    ) -> Result<
        (
            Option<HeartbeatSnapshot>,
            Option<ComponentFileStatus>,
            Option<LevelStatus>,
        ),
        StoreError,
    > {
        let heartbeat = self.snapshots.heartbeat(component_id).await?;
        let file_status = self.snapshots.file_status(component_id).await?;
        let level_status = self.snapshots.level_status(component_id).await?;
        Ok((heartbeat, file_status, level_status))
    }
}
