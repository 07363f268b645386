//! Inbound reconciliation (snapshot → rendered shapes)
//!
//! Every zone and sub-zone in the last snapshot owns exactly one shape on the
//! map. The registry maps entity keys to shape handles and their listener
//! registrations, which are always added and removed together.

use std::collections::{BTreeMap, HashMap};

use shared::models::LatLng;
use zone_store::ZoneSnapshot;

use crate::config::{EditorConfig, ReconcileMode};
use crate::map::{EditEvent, ListenerId, MapSurface, ShapeHandle, ShapeStyle};

/// Identity of a rendered entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKey {
    Zone(String),
    SubZone { zone_id: String, subzone_id: String },
}

impl ShapeKey {
    pub fn zone(id: impl Into<String>) -> Self {
        ShapeKey::Zone(id.into())
    }

    pub fn subzone(zone_id: impl Into<String>, subzone_id: impl Into<String>) -> Self {
        ShapeKey::SubZone {
            zone_id: zone_id.into(),
            subzone_id: subzone_id.into(),
        }
    }

    /// The zone document that owns this shape
    pub fn zone_id(&self) -> &str {
        match self {
            ShapeKey::Zone(id) => id,
            ShapeKey::SubZone { zone_id, .. } => zone_id,
        }
    }
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }
}

#[derive(Debug, Clone)]
struct Rendered {
    handle: ShapeHandle,
    listeners: Vec<ListenerId>,
}

/// Rendered shapes keyed by entity
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: BTreeMap<ShapeKey, Rendered>,
    by_handle: HashMap<ShapeHandle, ShapeKey>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn handle(&self, key: &ShapeKey) -> Option<ShapeHandle> {
        self.shapes.get(key).map(|r| r.handle)
    }

    pub fn key_for(&self, handle: ShapeHandle) -> Option<&ShapeKey> {
        self.by_handle.get(&handle)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ShapeKey> {
        self.shapes.keys()
    }

    /// Rendered zone ids, sorted
    pub fn zone_ids(&self) -> Vec<String> {
        self.shapes
            .keys()
            .filter_map(|k| match k {
                ShapeKey::Zone(id) => Some(id.clone()),
                ShapeKey::SubZone { .. } => None,
            })
            .collect()
    }

    /// Rendered sub-zone ids of one zone, sorted
    pub fn subzone_ids(&self, zone: &str) -> Vec<String> {
        self.shapes
            .keys()
            .filter_map(|k| match k {
                ShapeKey::SubZone {
                    zone_id,
                    subzone_id,
                } if zone_id == zone => Some(subzone_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Total listener registrations held
    pub fn listener_count(&self) -> usize {
        self.shapes.values().map(|r| r.listeners.len()).sum()
    }

    /// Bring the map in line with `snapshot`
    pub fn reconcile<M: MapSurface>(
        &mut self,
        map: &mut M,
        snapshot: &ZoneSnapshot,
        config: &EditorConfig,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        if config.reconcile_mode == ReconcileMode::Rebuild {
            stats.removed = self.clear(map);
        }

        let zone_style = config.zone_style();
        let subzone_style = config.subzone_style();

        // Later duplicates of a key win, matching what a reader of the
        // document would see last.
        let mut desired: BTreeMap<ShapeKey, (&[LatLng], &ShapeStyle)> = BTreeMap::new();
        for zone in &snapshot.zones {
            desired.insert(
                ShapeKey::zone(&zone.id),
                (zone.polygon.as_slice(), &zone_style),
            );
            for sz in &zone.subzones {
                desired.insert(
                    ShapeKey::subzone(&zone.id, &sz.id),
                    (sz.polygon.as_slice(), &subzone_style),
                );
            }
        }

        let stale: Vec<ShapeKey> = self
            .shapes
            .keys()
            .filter(|k| !desired.contains_key(*k))
            .cloned()
            .collect();
        for key in stale {
            self.remove(map, &key);
            stats.removed += 1;
        }

        for (key, (path, style)) in desired {
            match self.shapes.get(&key).map(|r| r.handle) {
                Some(handle) => match map.path(handle) {
                    Some(current) if current == path => stats.unchanged += 1,
                    Some(_) => {
                        map.set_path(handle, path);
                        stats.updated += 1;
                    }
                    None => {
                        // Shape vanished underneath us
                        self.remove(map, &key);
                        self.create(map, key, path, style, config.is_editable());
                        stats.created += 1;
                    }
                },
                None => {
                    self.create(map, key, path, style, config.is_editable());
                    stats.created += 1;
                }
            }
        }

        stats
    }

    /// Remove every shape and listener; returns the number of shapes removed
    pub fn clear<M: MapSurface>(&mut self, map: &mut M) -> usize {
        let keys: Vec<ShapeKey> = self.shapes.keys().cloned().collect();
        for key in &keys {
            self.remove(map, key);
        }
        keys.len()
    }

    fn create<M: MapSurface>(
        &mut self,
        map: &mut M,
        key: ShapeKey,
        path: &[LatLng],
        style: &ShapeStyle,
        editable: bool,
    ) {
        let handle = map.add_polygon(path, style);
        let listeners = if editable {
            EditEvent::ALL
                .iter()
                .map(|event| map.add_listener(handle, *event))
                .collect()
        } else {
            Vec::new()
        };
        self.by_handle.insert(handle, key.clone());
        self.shapes.insert(key, Rendered { handle, listeners });
    }

    fn remove<M: MapSurface>(&mut self, map: &mut M, key: &ShapeKey) {
        if let Some(rendered) = self.shapes.remove(key) {
            for listener in rendered.listeners {
                map.remove_listener(listener);
            }
            map.remove_polygon(rendered.handle);
            self.by_handle.remove(&rendered.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditMode;
    use crate::map::InMemoryMap;
    use shared::models::{SubZone, Zone};

    fn square(min: f64, max: f64) -> Vec<LatLng> {
        vec![
            LatLng::new(min, min),
            LatLng::new(min, max),
            LatLng::new(max, max),
            LatLng::new(max, min),
        ]
    }

    fn zone(id: &str, subzones: &[&str]) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_uppercase(),
            event_id: "evt".to_string(),
            polygon: square(0.0, 10.0),
            subzones: subzones
                .iter()
                .map(|s| SubZone::new(*s, *s, square(1.0, 2.0)))
                .collect(),
        }
    }

    fn snapshot(version: u64, zones: Vec<Zone>) -> ZoneSnapshot {
        ZoneSnapshot::new(version, zones)
    }

    #[test]
    fn test_creates_shapes_with_paired_listeners() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default();

        let stats = registry.reconcile(&mut map, &snapshot(1, vec![zone("z1", &["s1", "s2"])]), &config);

        assert_eq!(stats.created, 3);
        assert_eq!(map.shape_count(), 3);
        assert_eq!(map.listener_count(), 9);
        assert_eq!(registry.listener_count(), 9);
        assert_eq!(registry.zone_ids(), vec!["z1"]);
        assert_eq!(registry.subzone_ids("z1"), vec!["s1", "s2"]);
    }

    #[test]
    fn test_diff_is_idempotent() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default();
        let snap = snapshot(1, vec![zone("z1", &["s1"]), zone("z2", &[])]);

        registry.reconcile(&mut map, &snap, &config);
        let before = map.paths();
        let stats = registry.reconcile(&mut map, &snap, &config);

        assert!(stats.is_noop());
        assert_eq!(stats.unchanged, 3);
        assert_eq!(map.paths(), before);
    }

    #[test]
    fn test_removes_stale_and_updates_changed() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default();
        registry.reconcile(&mut map, &snapshot(1, vec![zone("z1", &["s1", "s2"]), zone("z2", &[])]), &config);

        let mut z1 = zone("z1", &["s2"]);
        z1.polygon = square(0.0, 20.0);
        let stats = registry.reconcile(&mut map, &snapshot(2, vec![z1]), &config);

        assert_eq!(stats.removed, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(map.shape_count(), 2);
        assert_eq!(map.listener_count(), 6);
        let handle = registry.handle(&ShapeKey::zone("z1")).unwrap();
        assert_eq!(map.path(handle), Some(square(0.0, 20.0)));
    }

    #[test]
    fn test_rebuild_mode_recreates_everything() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default().with_reconcile_mode(ReconcileMode::Rebuild);
        let snap = snapshot(1, vec![zone("z1", &["s1"])]);

        registry.reconcile(&mut map, &snap, &config);
        let first = registry.handle(&ShapeKey::zone("z1")).unwrap();
        let stats = registry.reconcile(&mut map, &snap, &config);

        assert_eq!(stats.removed, 2);
        assert_eq!(stats.created, 2);
        assert_ne!(registry.handle(&ShapeKey::zone("z1")), Some(first));
        assert!(!map.contains(first));
        assert_eq!(map.listener_count(), 6);
    }

    #[test]
    fn test_readonly_shapes_have_no_listeners() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default().with_edit_mode(EditMode::ReadOnly);

        registry.reconcile(&mut map, &snapshot(1, vec![zone("z1", &["s1"])]), &config);

        assert_eq!(map.shape_count(), 2);
        assert_eq!(map.listener_count(), 0);
        let handle = registry.handle(&ShapeKey::zone("z1")).unwrap();
        assert!(!map.style(handle).unwrap().editable);
    }

    #[test]
    fn test_same_subzone_id_under_different_zones() {
        let mut map = InMemoryMap::ready();
        let mut registry = ShapeRegistry::new();
        let config = EditorConfig::default();

        registry.reconcile(&mut map, &snapshot(1, vec![zone("z1", &["s1"]), zone("z2", &["s1"])]), &config);

        assert_eq!(map.shape_count(), 4);
        assert_eq!(registry.subzone_ids("z2"), vec!["s1"]);
        let key = registry
            .key_for(registry.handle(&ShapeKey::subzone("z2", "s1")).unwrap())
            .unwrap();
        assert_eq!(key.zone_id(), "z2");
    }
}
