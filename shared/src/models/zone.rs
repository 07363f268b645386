//! Zone Model
//!
//! A Zone document embeds its SubZones. The document id is the store key and
//! is not part of the document body.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo;

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Zone entity (top level of the spatial hierarchy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Document key, filled in from the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub polygon: Vec<LatLng>,
    #[serde(default)]
    pub subzones: Vec<SubZone>,
}

impl Zone {
    /// Sub-zone by id; with duplicate ids the last entry wins
    pub fn subzone(&self, subzone_id: &str) -> Option<&SubZone> {
        self.subzones.iter().rev().find(|sz| sz.id == subzone_id)
    }

    fn subzone_index(&self, subzone_id: &str) -> Option<usize> {
        self.subzones.iter().rposition(|sz| sz.id == subzone_id)
    }

    /// The `subzones` array with one entry's polygon replaced
    ///
    /// Returns `None` when the subzone is not part of this zone.
    pub fn subzones_with_polygon(
        &self,
        subzone_id: &str,
        polygon: Vec<LatLng>,
    ) -> Option<Vec<SubZone>> {
        self.subzones_updated(subzone_id, |sz| sz.polygon = polygon)
    }

    /// The `subzones` array with one entry filtered out
    pub fn subzones_without(&self, subzone_id: &str) -> Option<Vec<SubZone>> {
        self.subzone(subzone_id)?;
        Some(
            self.subzones
                .iter()
                .filter(|sz| sz.id != subzone_id)
                .cloned()
                .collect(),
        )
    }

    /// The `subzones` array with `subzone` appended
    pub fn subzones_with(&self, subzone: SubZone) -> Vec<SubZone> {
        let mut subzones = self.subzones.clone();
        subzones.push(subzone);
        subzones
    }

    /// The `subzones` array after applying `f` to one entry
    pub fn subzones_updated(
        &self,
        subzone_id: &str,
        f: impl FnOnce(&mut SubZone),
    ) -> Option<Vec<SubZone>> {
        let index = self.subzone_index(subzone_id)?;
        let mut subzones = self.subzones.clone();
        f(&mut subzones[index]);
        Some(subzones)
    }

    /// Ids of subzones whose polygon is not contained in this zone's polygon
    pub fn containment_violations(&self) -> Vec<String> {
        self.subzones
            .iter()
            .filter(|sz| !geo::contains_polygon(&self.polygon, &sz.polygon))
            .map(|sz| sz.id.clone())
            .collect()
    }
}

/// SubZone entity (embedded in its parent Zone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub polygon: Vec<LatLng>,
    /// Assigned volunteer display names (set semantics)
    #[serde(default)]
    pub volunteers: Vec<String>,
    /// Fields written by other tools, carried through array rewrites
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, polygon: Vec<LatLng>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            polygon,
            volunteers: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn has_volunteer(&self, name: &str) -> bool {
        self.volunteers.iter().any(|v| v == name)
    }

    /// Add a volunteer name; returns false when already assigned
    ///
    /// Repeated names already stored are collapsed, keeping first-seen order.
    pub fn assign(&mut self, name: &str) -> bool {
        let mut seen = HashSet::new();
        self.volunteers.retain(|v| seen.insert(v.clone()));
        if self.has_volunteer(name) {
            return false;
        }
        self.volunteers.push(name.to_string());
        true
    }

    /// Remove every occurrence of a volunteer name; returns false when absent
    pub fn unassign(&mut self, name: &str) -> bool {
        let before = self.volunteers.len();
        self.volunteers.retain(|v| v != name);
        self.volunteers.len() != before
    }
}

/// Create zone payload (the full document written for a new zone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCreate {
    pub name: String,
    pub event_id: String,
    pub polygon: Vec<LatLng>,
    pub subzones: Vec<SubZone>,
}

impl ZoneCreate {
    pub fn new(name: impl Into<String>, event_id: impl Into<String>, polygon: Vec<LatLng>) -> Self {
        Self {
            name: name.into(),
            event_id: event_id.into(),
            polygon,
            subzones: Vec::new(),
        }
    }

    pub fn into_zone(self, id: impl Into<String>) -> Zone {
        Zone {
            id: id.into(),
            name: self.name,
            event_id: self.event_id,
            polygon: self.polygon,
            subzones: self.subzones,
        }
    }
}

/// Merge-patch of a zone document
///
/// Only the fields that are `Some` are written; `subzones` always replaces the
/// whole array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<LatLng>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subzones: Option<Vec<SubZone>>,
}

impl ZonePatch {
    pub fn polygon(polygon: Vec<LatLng>) -> Self {
        Self {
            polygon: Some(polygon),
            ..Default::default()
        }
    }

    pub fn subzones(subzones: Vec<SubZone>) -> Self {
        Self {
            subzones: Some(subzones),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygon.is_none() && self.subzones.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(min: f64, max: f64) -> Vec<LatLng> {
        vec![
            LatLng::new(min, min),
            LatLng::new(min, max),
            LatLng::new(max, max),
            LatLng::new(max, min),
        ]
    }

    fn zone_with_subzones() -> Zone {
        Zone {
            id: "z1".to_string(),
            name: "Main Stage".to_string(),
            event_id: "evt".to_string(),
            polygon: square(0.0, 10.0),
            subzones: vec![
                SubZone::new("s1", "Front", square(1.0, 2.0)),
                SubZone::new("s2", "Back", square(3.0, 4.0)),
            ],
        }
    }

    #[test]
    fn test_zone_deserializes_camel_case() {
        let zone: Zone = serde_json::from_value(json!({
            "name": "Gate A",
            "eventId": "evt-1",
            "polygon": [{"lat": 0.0, "lng": 0.0}, {"lat": 0.0, "lng": 1.0}, {"lat": 1.0, "lng": 1.0}]
        }))
        .unwrap();

        assert_eq!(zone.event_id, "evt-1");
        assert_eq!(zone.polygon.len(), 3);
        assert!(zone.subzones.is_empty());
        assert!(zone.id.is_empty());
    }

    #[test]
    fn test_zone_create_serializes_empty_subzones() {
        let create = ZoneCreate::new("Gate A", "evt-1", square(0.0, 1.0));
        let value = serde_json::to_value(&create).unwrap();

        assert_eq!(value["eventId"], "evt-1");
        assert_eq!(value["subzones"], json!([]));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_subzone_extra_fields_survive_rewrite() {
        let sz: SubZone = serde_json::from_value(json!({
            "id": "s1",
            "name": "Front",
            "polygon": [],
            "volunteers": ["Amit"],
            "capacity": 250
        }))
        .unwrap();
        let zone = Zone {
            id: "z1".to_string(),
            name: "Z".to_string(),
            event_id: String::new(),
            polygon: Vec::new(),
            subzones: vec![sz],
        };

        let rewritten = zone.subzones_with_polygon("s1", square(0.0, 1.0)).unwrap();
        let value = serde_json::to_value(&rewritten).unwrap();

        assert_eq!(value[0]["capacity"], 250);
        assert_eq!(value[0]["volunteers"], json!(["Amit"]));
        assert_eq!(value[0]["polygon"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_subzones_with_polygon_leaves_siblings() {
        let zone = zone_with_subzones();
        let updated = zone.subzones_with_polygon("s1", square(1.0, 3.0)).unwrap();

        assert_eq!(updated[0].polygon, square(1.0, 3.0));
        assert_eq!(updated[1], zone.subzones[1]);
        assert!(zone.subzones_with_polygon("missing", Vec::new()).is_none());
    }

    #[test]
    fn test_subzones_without() {
        let zone = zone_with_subzones();
        let remaining = zone.subzones_without("s1").unwrap();

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "s2");
        assert!(zone.subzones_without("s9").is_none());
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut sz = SubZone::new("s1", "Front", Vec::new());

        assert!(sz.assign("Amit"));
        assert!(!sz.assign("Amit"));
        assert_eq!(sz.volunteers, vec!["Amit".to_string()]);

        assert!(sz.unassign("Amit"));
        assert!(!sz.unassign("Amit"));
        assert!(sz.volunteers.is_empty());
    }

    #[test]
    fn test_assign_collapses_stored_duplicates() {
        let mut sz = SubZone::new("s1", "Front", Vec::new());
        sz.volunteers = vec!["Amit".to_string(), "Neha".to_string(), "Amit".to_string()];

        assert!(!sz.assign("Amit"));
        assert_eq!(sz.volunteers, vec!["Amit", "Neha"]);

        sz.volunteers.push("Neha".to_string());
        assert!(sz.assign("Ravi"));
        assert_eq!(sz.volunteers, vec!["Amit", "Neha", "Ravi"]);
    }

    #[test]
    fn test_duplicate_subzone_id_patches_last_entry() {
        let mut zone = zone_with_subzones();
        zone.subzones.push(SubZone::new("s1", "Front again", square(5.0, 6.0)));

        assert_eq!(zone.subzone("s1").unwrap().name, "Front again");
        let updated = zone.subzones_with_polygon("s1", square(7.0, 8.0)).unwrap();

        assert_eq!(updated[0].polygon, square(1.0, 2.0));
        assert_eq!(updated[2].polygon, square(7.0, 8.0));
        assert_eq!(updated[2].name, "Front again");
    }

    #[test]
    fn test_containment_violations() {
        let mut zone = zone_with_subzones();
        assert!(zone.containment_violations().is_empty());

        zone.subzones.push(SubZone::new("s3", "Outside", square(9.0, 12.0)));
        assert_eq!(zone.containment_violations(), vec!["s3".to_string()]);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ZonePatch::polygon(square(0.0, 1.0));
        let value = serde_json::to_value(&patch).unwrap();

        assert!(value.get("polygon").is_some());
        assert!(value.get("subzones").is_none());
        assert!(ZonePatch::default().is_empty());
    }
}
