// Shared fixtures for zone-sync integration tests

#![allow(dead_code)]

use std::sync::Arc;

use shared::models::{LatLng, SubZone, Zone};
use zone_store::MemoryStore;
use zone_sync::{Answer, EditorConfig, InMemoryMap, ScriptedPrompter, ZoneSynchronizer};

pub type TestSync = ZoneSynchronizer<InMemoryMap, ScriptedPrompter>;

pub fn ll(lat: f64, lng: f64) -> LatLng {
    LatLng::new(lat, lng)
}

pub fn square(min: f64, max: f64) -> Vec<LatLng> {
    vec![ll(min, min), ll(min, max), ll(max, max), ll(max, min)]
}

pub fn zone(id: &str, polygon: Vec<LatLng>, subzones: Vec<SubZone>) -> Zone {
    Zone {
        id: id.to_string(),
        name: id.to_uppercase(),
        event_id: "active-event-id".to_string(),
        polygon,
        subzones,
    }
}

/// Store, ready map and synchronizer sharing state
pub struct Harness {
    pub store: MemoryStore,
    pub map: InMemoryMap,
    pub sync: TestSync,
}

impl Harness {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self::with_config(answers, EditorConfig::default())
    }

    pub fn with_config(answers: Vec<Answer>, config: EditorConfig) -> Self {
        let store = MemoryStore::new();
        let map = InMemoryMap::ready();
        let sync = ZoneSynchronizer::new(
            Arc::new(store.clone()),
            map.clone(),
            ScriptedPrompter::with_answers(answers),
            config,
        );
        Self { store, map, sync }
    }

    /// Seed zones without recording writes, then deliver the snapshot
    pub async fn seed(&mut self, zones: Vec<Zone>) {
        for zone in zones {
            self.store.seed_zone(zone).unwrap();
        }
        self.echo().await;
    }

    /// Deliver the store's current state, as the subscription would
    pub async fn echo(&mut self) {
        use zone_store::ZoneStore;
        let snapshot = self.store.snapshot().await.unwrap();
        self.sync.apply_snapshot(snapshot);
    }
}
