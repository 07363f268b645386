//! Outbound edit propagation (shape edits → merge-patches)
//!
//! Vertex moves, vertex inserts and drag-ends are handled the same way: the
//! shape's whole path is read back and written to the owning zone document.
//! Every event produces its own write.

use shared::geo;
use shared::models::ZonePatch;

use crate::error::{SyncError, SyncResult};
use crate::map::{MapSurface, ShapeEvent};
use crate::prompt::Prompter;
use crate::reconcile::ShapeKey;
use crate::synchronizer::{Outcome, Skip, ZoneSynchronizer};

impl<M: MapSurface, P: Prompter> ZoneSynchronizer<M, P> {
    /// Translate an edit on a rendered shape into a write
    ///
    /// - zone shape: `{polygon}` on the zone
    /// - sub-zone shape: `{subzones}` with that entry's polygon replaced
    ///
    /// Read-only maps never write. A path that no longer forms a polygon, or
    /// a sub-zone leaving its parent while containment is enforced, is
    /// reverted on the map and rejected.
    pub async fn handle_shape_event(&mut self, event: ShapeEvent) -> SyncResult<Outcome> {
        if !self.map.is_ready() {
            return Ok(Outcome::Skipped(Skip::MapNotReady));
        }
        if !self.config.is_editable() {
            tracing::debug!(shape = %event.handle, "Edit ignored on read-only map");
            return Ok(Outcome::Skipped(Skip::ReadOnly));
        }
        let Some(key) = self.registry.key_for(event.handle).cloned() else {
            tracing::debug!(shape = %event.handle, "Edit on unknown shape");
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        let Some(path) = self.map.path(event.handle) else {
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        tracing::debug!(shape = %event.handle, event = ?event.event, key = ?key, "Shape edited");

        if !geo::is_valid_ring(&path) {
            self.revert(&key);
            let err = SyncError::InvalidPolygon(format!("{} vertices", path.len()));
            return Err(self.failed(key.zone_id(), err));
        }

        match &key {
            ShapeKey::Zone(zone_id) => {
                if self.snapshot.zone(zone_id).is_none() {
                    return Ok(Outcome::Skipped(Skip::Missing));
                }
                self.write_merge(zone_id, ZonePatch::polygon(path), None)
                    .await
            }
            ShapeKey::SubZone {
                zone_id,
                subzone_id,
            } => {
                let Some(zone) = self.snapshot.zone(zone_id) else {
                    return Ok(Outcome::Skipped(Skip::Missing));
                };
                if self.config.enforce_containment && !geo::contains_polygon(&zone.polygon, &path)
                {
                    let err = SyncError::OutsideParent {
                        zone_id: zone_id.clone(),
                        subzone: subzone_id.clone(),
                    };
                    self.revert(&key);
                    return Err(self.failed(zone_id, err));
                }
                let Some(subzones) = zone.subzones_with_polygon(subzone_id, path) else {
                    return Ok(Outcome::Skipped(Skip::Missing));
                };
                self.write_merge(zone_id, ZonePatch::subzones(subzones), None)
                    .await
            }
        }
    }

    /// Put a shape back to its last snapshot path
    fn revert(&mut self, key: &ShapeKey) {
        let snapshot_path = match key {
            ShapeKey::Zone(zone_id) => self.snapshot.zone(zone_id).map(|z| z.polygon.clone()),
            ShapeKey::SubZone {
                zone_id,
                subzone_id,
            } => self
                .snapshot
                .zone(zone_id)
                .and_then(|z| z.subzone(subzone_id))
                .map(|sz| sz.polygon.clone()),
        };
        if let (Some(handle), Some(path)) = (self.registry.handle(key), snapshot_path) {
            self.map.set_path(handle, &path);
        }
    }
}
