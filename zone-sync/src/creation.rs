//! Drawing and creation
//!
//! Which entity a completed polygon becomes is decided by an explicit
//! [`CreationTarget`], computed from the pending sub-zone parent when the
//! drawing completes. The pending parent is consumed on every completion,
//! whatever the outcome.

use std::fmt;

use shared::geo;
use shared::models::{LatLng, SubZone, ZoneCreate, ZonePatch};
use shared::util::timestamped_id;
use zone_store::ZoneWrite;

use crate::error::{SyncError, SyncResult};
use crate::map::{DrawingMode, MapSurface, ShapeHandle};
use crate::prompt::Prompter;
use crate::synchronizer::{Outcome, Skip, ZoneSynchronizer};

const STATUS_ZONE_ADDED: &str = "Zone added.";
const STATUS_SUBZONE_ADDED: &str = "Sub-zone added.";

/// What a completed polygon becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationTarget {
    /// A new top-level zone in this event
    NewZone(String),
    /// A new sub-zone appended to this zone
    NewSubZone(String),
}

impl CreationTarget {
    pub fn is_subzone(&self) -> bool {
        matches!(self, CreationTarget::NewSubZone(_))
    }

    /// Name prompt shown to the user
    pub fn prompt(&self) -> &'static str {
        match self {
            CreationTarget::NewZone(_) => "Enter Zone Name",
            CreationTarget::NewSubZone(_) => "Enter Sub-zone Name",
        }
    }

    /// Prefix of generated ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            CreationTarget::NewZone(_) => "zone",
            CreationTarget::NewSubZone(_) => "sub",
        }
    }

    /// Pre-filled name given how many siblings already exist
    pub fn default_name(&self, existing: usize) -> String {
        match self {
            CreationTarget::NewZone(_) => format!("Zone {}", existing + 1),
            CreationTarget::NewSubZone(_) => format!("Sub-zone {}", existing + 1),
        }
    }
}

impl fmt::Display for CreationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreationTarget::NewZone(event_id) => write!(f, "new zone in {}", event_id),
            CreationTarget::NewSubZone(zone_id) => write!(f, "new sub-zone of {}", zone_id),
        }
    }
}

impl<M: MapSurface, P: Prompter> ZoneSynchronizer<M, P> {
    /// Target for the next completed drawing
    pub fn creation_target(&self) -> CreationTarget {
        match &self.pending_parent {
            Some(zone_id) => CreationTarget::NewSubZone(zone_id.clone()),
            None => CreationTarget::NewZone(self.config.event_id.clone()),
        }
    }

    /// Switch the drawing tool on for a new zone
    pub fn begin_zone(&mut self) -> Outcome {
        if !self.map.is_ready() {
            return Outcome::Skipped(Skip::MapNotReady);
        }
        self.pending_parent = None;
        self.map.set_drawing_mode(Some(DrawingMode::Polygon));
        Outcome::Local
    }

    /// Switch the drawing tool on for a sub-zone of `zone_id`
    pub fn begin_subzone(&mut self, zone_id: &str) -> Outcome {
        if !self.map.is_ready() {
            return Outcome::Skipped(Skip::MapNotReady);
        }
        if self.snapshot.zone(zone_id).is_none() {
            tracing::debug!(zone_id = %zone_id, "Sub-zone drawing for unknown zone");
            return Outcome::Skipped(Skip::Missing);
        }
        self.pending_parent = Some(zone_id.to_string());
        self.map.set_drawing_mode(Some(DrawingMode::Polygon));
        self.status = format!("Drawing sub-zone for {}. Draw on map.", zone_id);
        Outcome::Local
    }

    /// Leave drawing mode and forget any pending sub-zone parent
    pub fn cancel_drawing(&mut self) {
        self.pending_parent = None;
        if self.map.is_ready() {
            self.map.set_drawing_mode(None);
        }
    }

    /// The drawing tool finished a polygon
    ///
    /// The temporary shape is always removed and the drawing tool switched
    /// off before the user is asked for a name.
    pub async fn polygon_completed(&mut self, drawn: ShapeHandle) -> SyncResult<Outcome> {
        if !self.map.is_ready() {
            return Ok(Outcome::Skipped(Skip::MapNotReady));
        }
        let path = self.map.path(drawn);
        self.map.remove_polygon(drawn);
        self.map.set_drawing_mode(None);

        let target = self.creation_target();
        self.pending_parent = None;

        let Some(path) = path else {
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        self.complete_drawing(target, path).await
    }

    /// Create the entity described by `target` from a drawn path
    pub async fn complete_drawing(
        &mut self,
        target: CreationTarget,
        path: Vec<LatLng>,
    ) -> SyncResult<Outcome> {
        if !geo::is_valid_ring(&path) {
            let err = SyncError::InvalidPolygon(format!("{} vertices", path.len()));
            return Err(self.failed(&target.to_string(), err));
        }

        let existing = match &target {
            CreationTarget::NewZone(_) => self.snapshot.len(),
            CreationTarget::NewSubZone(zone_id) => match self.snapshot.zone(zone_id) {
                Some(zone) => zone.subzones.len(),
                None => {
                    tracing::debug!(zone_id = %zone_id, "Parent zone gone before sub-zone was drawn");
                    return Ok(Outcome::Skipped(Skip::Missing));
                }
            },
        };
        let Some(name) = self.ask_name(target.prompt(), &target.default_name(existing)) else {
            return Ok(Outcome::Skipped(Skip::Cancelled));
        };

        let id = timestamped_id(target.id_prefix());
        match target {
            CreationTarget::NewZone(event_id) => {
                let doc = ZoneCreate::new(name, event_id, path);
                match self.store.set(&id, &doc).await {
                    Ok(()) => {
                        tracing::info!(zone_id = %id, name = %doc.name, "Zone created");
                        self.succeeded(Some(STATUS_ZONE_ADDED));
                        Ok(Outcome::Written(ZoneWrite::Set { id, doc }))
                    }
                    Err(e) => Err(self.failed(&id, e.into())),
                }
            }
            CreationTarget::NewSubZone(zone_id) => {
                let Some(zone) = self.snapshot.zone(&zone_id) else {
                    return Ok(Outcome::Skipped(Skip::Missing));
                };
                if self.config.enforce_containment && !geo::contains_polygon(&zone.polygon, &path) {
                    let err = SyncError::OutsideParent {
                        zone_id: zone_id.clone(),
                        subzone: name,
                    };
                    return Err(self.failed(&zone_id, err));
                }

                let subzone = SubZone::new(id, name, path);
                tracing::info!(zone_id = %zone_id, subzone_id = %subzone.id, "Adding sub-zone");
                let patch = ZonePatch::subzones(zone.subzones_with(subzone));
                self.write_merge(&zone_id, patch, Some(STATUS_SUBZONE_ADDED))
                    .await
            }
        }
    }

    /// Prompt for a name; `None` when cancelled or blank
    fn ask_name(&mut self, message: &str, default: &str) -> Option<String> {
        let name = self.prompter.prompt(message, default)?;
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Name prompt left empty, discarding drawing");
            return None;
        }
        Some(name.to_string())
    }
}
