//! Administrative actions: deletion and volunteer assignment
//!
//! None of these need the map; they only read the last snapshot and write.
//! Ids that are no longer in the snapshot are skipped, not errors.

use serde::Serialize;
use shared::models::{SubZone, ZonePatch};
use zone_store::ZoneWrite;

use crate::error::SyncResult;
use crate::map::MapSurface;
use crate::prompt::Prompter;
use crate::synchronizer::{Outcome, Skip, ZoneSynchronizer};

const CONFIRM_DELETE_ZONE: &str = "Are you sure you want to delete this zone and all its sub-zones?";
const CONFIRM_DELETE_SUBZONE: &str = "Delete sub-zone?";

/// One entry of the volunteer picker for a sub-zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolunteerOption {
    pub id: String,
    pub name: String,
    /// Already assigned to this sub-zone
    pub disabled: bool,
}

impl<M: MapSurface, P: Prompter> ZoneSynchronizer<M, P> {
    /// Delete a zone document and, with it, all its sub-zones
    pub async fn delete_zone(&mut self, zone_id: &str) -> SyncResult<Outcome> {
        if self.snapshot.zone(zone_id).is_none() {
            return Ok(Outcome::Skipped(Skip::Missing));
        }
        if !self.prompter.confirm(CONFIRM_DELETE_ZONE) {
            return Ok(Outcome::Skipped(Skip::Declined));
        }

        match self.store.delete(zone_id).await {
            Ok(()) => {
                tracing::info!(zone_id = %zone_id, "Zone deleted");
                self.succeeded(Some("Zone deleted."));
                Ok(Outcome::Written(ZoneWrite::Delete {
                    id: zone_id.to_string(),
                }))
            }
            Err(e) => Err(self.failed(zone_id, e.into())),
        }
    }

    /// Remove one sub-zone from its parent's `subzones` array
    pub async fn delete_subzone(&mut self, zone_id: &str, subzone_id: &str) -> SyncResult<Outcome> {
        if self.find_subzone(zone_id, subzone_id).is_none() {
            return Ok(Outcome::Skipped(Skip::Missing));
        }
        if !self.prompter.confirm(CONFIRM_DELETE_SUBZONE) {
            return Ok(Outcome::Skipped(Skip::Declined));
        }

        let Some(subzones) = self
            .snapshot
            .zone(zone_id)
            .and_then(|z| z.subzones_without(subzone_id))
        else {
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        tracing::info!(zone_id = %zone_id, subzone_id = %subzone_id, "Deleting sub-zone");
        self.write_merge(zone_id, ZonePatch::subzones(subzones), Some("Sub-zone deleted."))
            .await
    }

    /// Add a volunteer's display name to a sub-zone
    ///
    /// Assigning a name that is already present still writes, and the name
    /// stays listed once.
    pub async fn assign_volunteer(
        &mut self,
        zone_id: &str,
        subzone_id: &str,
        volunteer_id: &str,
    ) -> SyncResult<Outcome> {
        let Some(name) = self
            .volunteers
            .iter()
            .find(|v| v.id == volunteer_id)
            .map(|v| v.name.clone())
        else {
            tracing::debug!(volunteer_id = %volunteer_id, "Unknown volunteer");
            return Ok(Outcome::Skipped(Skip::Missing));
        };

        let Some(subzones) = self
            .snapshot
            .zone(zone_id)
            .and_then(|z| z.subzones_updated(subzone_id, |sz| {
                sz.assign(&name);
            }))
        else {
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        tracing::info!(zone_id = %zone_id, subzone_id = %subzone_id, volunteer = %name, "Assigning volunteer");
        self.write_merge(zone_id, ZonePatch::subzones(subzones), Some("Volunteer assigned."))
            .await
    }

    /// Remove a volunteer name from a sub-zone
    pub async fn remove_volunteer(
        &mut self,
        zone_id: &str,
        subzone_id: &str,
        name: &str,
    ) -> SyncResult<Outcome> {
        let Some(subzones) = self
            .snapshot
            .zone(zone_id)
            .and_then(|z| z.subzones_updated(subzone_id, |sz| {
                sz.unassign(name);
            }))
        else {
            return Ok(Outcome::Skipped(Skip::Missing));
        };
        tracing::info!(zone_id = %zone_id, subzone_id = %subzone_id, volunteer = %name, "Removing volunteer");
        self.write_merge(zone_id, ZonePatch::subzones(subzones), Some("Volunteer removed."))
            .await
    }

    /// Volunteer picker for a sub-zone; assigned volunteers are disabled
    ///
    /// Empty when the sub-zone is unknown.
    pub fn volunteer_options(&self, zone_id: &str, subzone_id: &str) -> Vec<VolunteerOption> {
        let Some(subzone) = self.find_subzone(zone_id, subzone_id) else {
            return Vec::new();
        };
        self.volunteers
            .iter()
            .map(|v| VolunteerOption {
                id: v.id.clone(),
                name: v.name.clone(),
                disabled: subzone.has_volunteer(&v.name),
            })
            .collect()
    }

    fn find_subzone(&self, zone_id: &str, subzone_id: &str) -> Option<&SubZone> {
        self.snapshot.zone(zone_id)?.subzone(subzone_id)
    }
}
