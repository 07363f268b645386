//! Zone Hierarchy Synchronizer
//!
//! Keeps the map's shapes equal to the last zone snapshot and turns user
//! gestures and admin actions into document writes.
//!
//! ```text
//!   ZoneStore ──snapshot──▶ apply_snapshot ──reconcile──▶ MapSurface
//!       ▲                                                    │
//!       │                                                    │ edit / draw
//!       └──── set / merge / delete ◀── ZoneSynchronizer ◀────┘
//! ```
//!
//! Local edits never touch the registry directly. A write is visible only
//! once its own snapshot comes back through [`ZoneSynchronizer::apply_snapshot`].
//!
//! Operations are split by concern:
//! - snapshot intake and accessors (this module)
//! - edit propagation ([`crate::edit`])
//! - drawing and creation ([`crate::creation`])
//! - deletion and volunteer assignment ([`crate::actions`])

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{User, Zone, ZonePatch};
use zone_store::{ZoneSnapshot, ZoneStore, ZoneWrite};

use crate::config::EditorConfig;
use crate::error::{SyncError, SyncResult};
use crate::map::{MapSurface, ShapeHandle};
use crate::prompt::Prompter;
use crate::reconcile::{ReconcileStats, ShapeKey, ShapeRegistry};

pub(crate) const STATUS_INITIALIZING: &str = "Initializing...";
pub(crate) const STATUS_READY: &str = "Ready";

/// Result of an operation that finished without error
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The write was accepted by the store
    Written(ZoneWrite),
    /// Local editor state changed; nothing was written
    Local,
    /// Nothing was written
    Skipped(Skip),
}

impl Outcome {
    pub fn write(&self) -> Option<&ZoneWrite> {
        match self {
            Outcome::Written(w) => Some(w),
            Outcome::Local | Outcome::Skipped(_) => None,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Written(_))
    }
}

/// Why an operation wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The map surface is not initialized
    MapNotReady,
    /// The user declined a confirmation
    Declined,
    /// The user cancelled or left the name prompt empty
    Cancelled,
    /// The zone, sub-zone, volunteer or shape is no longer known
    Missing,
    /// Shape edits arrived on a read-only map
    ReadOnly,
}

impl Skip {
    /// Code reported for this skip in logs and replies
    pub fn code(&self) -> ErrorCode {
        match self {
            Skip::MapNotReady => ErrorCode::MapNotReady,
            Skip::Declined => ErrorCode::Cancelled,
            Skip::Cancelled => ErrorCode::ZoneNameRequired,
            Skip::Missing => ErrorCode::NotFound,
            Skip::ReadOnly => ErrorCode::EditingDisabled,
        }
    }
}

/// Two-way sync between the zone collection and the map
pub struct ZoneSynchronizer<M, P> {
    pub(crate) store: Arc<dyn ZoneStore>,
    pub(crate) map: M,
    pub(crate) prompter: P,
    pub(crate) config: EditorConfig,
    pub(crate) registry: ShapeRegistry,
    pub(crate) snapshot: ZoneSnapshot,
    pub(crate) volunteers: Vec<User>,
    /// Zone a sub-zone drawing was started for (single use)
    pub(crate) pending_parent: Option<String>,
    pub(crate) status: String,
    pub(crate) last_error: Option<AppError>,
}

impl<M: MapSurface, P: Prompter> ZoneSynchronizer<M, P> {
    pub fn new(store: Arc<dyn ZoneStore>, map: M, prompter: P, config: EditorConfig) -> Self {
        let status = if map.is_ready() {
            STATUS_READY
        } else {
            STATUS_INITIALIZING
        };
        Self {
            store,
            map,
            prompter,
            config,
            registry: ShapeRegistry::new(),
            snapshot: ZoneSnapshot::default(),
            volunteers: Vec::new(),
            pending_parent: None,
            status: status.to_string(),
            last_error: None,
        }
    }

    // ========== Snapshot intake ==========

    /// Accept a snapshot from the store subscription
    ///
    /// Snapshots older than the current one are ignored. The snapshot is kept
    /// even when the map is not ready; it is rendered by [`Self::mark_ready`].
    /// Returns the reconciliation counts when shapes were reconciled.
    pub fn apply_snapshot(&mut self, snapshot: ZoneSnapshot) -> Option<ReconcileStats> {
        if snapshot.version < self.snapshot.version {
            tracing::debug!(
                version = snapshot.version,
                current = self.snapshot.version,
                "Ignoring stale snapshot"
            );
            return None;
        }
        self.snapshot = snapshot;

        if let Some(parent) = &self.pending_parent
            && self.snapshot.zone(parent).is_none()
        {
            tracing::info!(zone_id = %parent, "Parent zone removed, cancelling sub-zone drawing");
            self.pending_parent = None;
            if self.map.is_ready() {
                self.map.set_drawing_mode(None);
            }
        }

        self.render()
    }

    /// Replace the volunteer read model (non-volunteers are dropped)
    pub fn apply_volunteers(&mut self, users: Vec<User>) {
        self.volunteers = users.into_iter().filter(User::is_volunteer).collect();
        tracing::debug!(count = self.volunteers.len(), "Volunteers updated");
    }

    /// The map finished initializing; render the current snapshot
    pub fn mark_ready(&mut self) -> Option<ReconcileStats> {
        if !self.map.is_ready() {
            return None;
        }
        if self.status == STATUS_INITIALIZING {
            self.status = STATUS_READY.to_string();
        }
        self.render()
    }

    fn render(&mut self) -> Option<ReconcileStats> {
        if !self.map.is_ready() {
            tracing::debug!(version = self.snapshot.version, "Map not ready, deferring render");
            return None;
        }
        let stats = self
            .registry
            .reconcile(&mut self.map, &self.snapshot, &self.config);
        if !stats.is_noop() {
            tracing::info!(
                version = self.snapshot.version,
                created = stats.created,
                updated = stats.updated,
                removed = stats.removed,
                "Reconciled zones"
            );
        }
        Some(stats)
    }

    // ========== Accessors ==========

    pub fn snapshot(&self) -> &ZoneSnapshot {
        &self.snapshot
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.snapshot.zone(zone_id)
    }

    pub fn volunteers(&self) -> &[User] {
        &self.volunteers
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn shape_of(&self, key: &ShapeKey) -> Option<ShapeHandle> {
        self.registry.handle(key)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Zone a sub-zone drawing is pending for
    pub fn pending_parent(&self) -> Option<&str> {
        self.pending_parent.as_deref()
    }

    /// Best-effort status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    /// `(zone_id, subzone_id)` pairs whose sub-zone leaves its parent
    pub fn containment_violations(&self) -> Vec<(String, String)> {
        self.snapshot
            .zones
            .iter()
            .flat_map(|z| {
                z.containment_violations()
                    .into_iter()
                    .map(move |sz| (z.id.clone(), sz))
            })
            .collect()
    }

    // ========== Write helpers ==========

    pub(crate) async fn write_merge(
        &mut self,
        zone_id: &str,
        patch: ZonePatch,
        status: Option<&str>,
    ) -> SyncResult<Outcome> {
        match self.store.merge(zone_id, &patch).await {
            Ok(()) => {
                tracing::info!(zone_id = %zone_id, "Zone patched");
                self.succeeded(status);
                Ok(Outcome::Written(ZoneWrite::Merge {
                    id: zone_id.to_string(),
                    patch,
                }))
            }
            Err(e) => Err(self.failed(zone_id, e.into())),
        }
    }

    pub(crate) fn succeeded(&mut self, status: Option<&str>) {
        self.last_error = None;
        if let Some(status) = status {
            self.status = status.to_string();
        }
    }

    /// Record a failure for the status line and hand it back
    pub(crate) fn failed(&mut self, doc_id: &str, err: SyncError) -> SyncError {
        match &err {
            SyncError::Store(_) => {
                tracing::warn!(id = %doc_id, error = %err, "Store write failed")
            }
            _ => tracing::debug!(id = %doc_id, error = %err, "Operation rejected"),
        }
        self.status = format!("Error: {}", err);
        self.last_error = Some(AppError::from(&err));
        err
    }
}
