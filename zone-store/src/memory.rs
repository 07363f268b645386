//! In-process document store
//!
//! Holds zone documents as JSON values so merge writes behave like the hosted
//! store: untouched fields survive, arrays are replaced. Used by tests and
//! the demo editor.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use shared::models::{Role, User, Zone, ZoneCreate, ZonePatch};
use tokio::sync::broadcast;

use crate::error::{StoreError, StoreResult};
use crate::merge::merge_json;
use crate::snapshot::{ZoneSnapshot, ZoneWrite};
use crate::store::{UserDirectory, ZoneStore};

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct Documents {
    zones: BTreeMap<String, Value>,
    version: u64,
}

#[derive(Debug)]
struct Inner {
    /// Zone documents; the lock also orders snapshot publication
    documents: Mutex<Documents>,
    users: DashMap<String, User>,
    zone_tx: broadcast::Sender<ZoneSnapshot>,
    user_tx: broadcast::Sender<Vec<User>>,
    /// Accepted writes, oldest first
    writes: Mutex<Vec<ZoneWrite>>,
    offline: AtomicBool,
    read_only: AtomicBool,
}

/// In-memory implementation of [`ZoneStore`] and [`UserDirectory`]
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create with a specific subscription channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (zone_tx, _) = broadcast::channel(capacity);
        let (user_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                documents: Mutex::new(Documents {
                    zones: BTreeMap::new(),
                    version: 0,
                }),
                users: DashMap::new(),
                zone_tx,
                user_tx,
                writes: Mutex::new(Vec::new()),
                offline: AtomicBool::new(false),
                read_only: AtomicBool::new(false),
            }),
        }
    }

    /// Simulate lost connectivity: every write fails with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulate security rules rejecting writes
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Writes accepted so far
    pub fn writes(&self) -> Vec<ZoneWrite> {
        self.inner.writes.lock().clone()
    }

    /// Raw stored document, for assertions on merge behaviour
    pub fn raw_document(&self, id: &str) -> Option<Value> {
        self.inner.documents.lock().zones.get(id).cloned()
    }

    /// Load a zone without recording a write (fixtures)
    pub fn seed_zone(&self, zone: Zone) -> StoreResult<()> {
        let id = zone.id.clone();
        let mut value = serde_json::to_value(&zone)?;
        if let Value::Object(map) = &mut value {
            map.remove("id");
        }
        self.apply(None, |docs| {
            docs.insert(id, value);
        })
    }

    /// Insert or replace a user and publish the user list
    pub fn put_user(&self, user: User) {
        self.inner.users.insert(user.id.clone(), user);
        let _ = self.inner.user_tx.send(self.sorted_users());
    }

    pub fn remove_user(&self, id: &str) {
        self.inner.users.remove(id);
        let _ = self.inner.user_tx.send(self.sorted_users());
    }

    fn sorted_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("client is offline".to_string()));
        }
        if self.inner.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied(
                "missing or insufficient permissions".to_string(),
            ));
        }
        Ok(())
    }

    /// Mutate documents, record the write and publish the resulting snapshot
    fn apply(
        &self,
        record: Option<ZoneWrite>,
        mutate: impl FnOnce(&mut BTreeMap<String, Value>),
    ) -> StoreResult<()> {
        let mut docs = self.inner.documents.lock();
        mutate(&mut docs.zones);
        docs.version += 1;
        let snapshot = build_snapshot(&docs);

        if let Some(write) = record {
            tracing::debug!(op = write.kind(), id = write.doc_id(), version = docs.version, "Write applied");
            self.inner.writes.lock().push(write);
        }

        // No subscribers is fine
        let _ = self.inner.zone_tx.send(snapshot);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn build_snapshot(docs: &Documents) -> ZoneSnapshot {
    let zones = docs
        .zones
        .iter()
        .filter_map(|(id, value)| match serde_json::from_value::<Zone>(value.clone()) {
            Ok(mut zone) => {
                zone.id = id.clone();
                Some(zone)
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Skipping malformed zone document");
                None
            }
        })
        .collect();
    ZoneSnapshot::new(docs.version, zones)
}

#[async_trait]
impl ZoneStore for MemoryStore {
    async fn set(&self, id: &str, doc: &ZoneCreate) -> StoreResult<()> {
        self.check_writable()?;
        let value = serde_json::to_value(doc)?;
        let record = ZoneWrite::Set {
            id: id.to_string(),
            doc: doc.clone(),
        };
        self.apply(Some(record), |docs| {
            docs.insert(id.to_string(), value);
        })
    }

    async fn merge(&self, id: &str, patch: &ZonePatch) -> StoreResult<()> {
        self.check_writable()?;
        let value = serde_json::to_value(patch)?;
        let record = ZoneWrite::Merge {
            id: id.to_string(),
            patch: patch.clone(),
        };
        self.apply(Some(record), |docs| {
            let doc = docs.entry(id.to_string()).or_insert(Value::Null);
            merge_json(doc, value);
        })
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check_writable()?;
        let record = ZoneWrite::Delete { id: id.to_string() };
        self.apply(Some(record), |docs| {
            docs.remove(id);
        })
    }

    async fn snapshot(&self) -> StoreResult<ZoneSnapshot> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("client is offline".to_string()));
        }
        Ok(build_snapshot(&self.inner.documents.lock()))
    }

    fn subscribe(&self) -> broadcast::Receiver<ZoneSnapshot> {
        self.inner.zone_tx.subscribe()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        Ok(self
            .sorted_users()
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }

    fn subscribe_users(&self) -> broadcast::Receiver<Vec<User>> {
        self.inner.user_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::{LatLng, SubZone};

    fn triangle() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
        ]
    }

    #[tokio::test]
    async fn test_set_publishes_snapshot() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store
            .set("z1", &ZoneCreate::new("Gate", "evt", triangle()))
            .await
            .unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.len(), 1);
        let zone = snapshot.zone("z1").unwrap();
        assert_eq!(zone.name, "Gate");
        assert_eq!(zone.event_id, "evt");
        assert!(zone.subzones.is_empty());
    }

    #[tokio::test]
    async fn test_merge_keeps_other_fields() {
        let store = MemoryStore::new();
        store
            .set("z1", &ZoneCreate::new("Gate", "evt", triangle()))
            .await
            .unwrap();

        let mut polygon = triangle();
        polygon.push(LatLng::new(1.0, 0.0));
        store.merge("z1", &ZonePatch::polygon(polygon.clone())).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        let zone = snapshot.zone("z1").unwrap();
        assert_eq!(zone.polygon, polygon);
        assert_eq!(zone.name, "Gate");

        let raw = store.raw_document("z1").unwrap();
        assert_eq!(raw["eventId"], "evt");
        assert!(raw.get("id").is_none());
    }

    #[tokio::test]
    async fn test_merge_replaces_subzones_array() {
        let store = MemoryStore::new();
        let mut zone = ZoneCreate::new("Gate", "evt", triangle()).into_zone("z1");
        zone.subzones = vec![
            SubZone::new("s1", "A", triangle()),
            SubZone::new("s2", "B", triangle()),
        ];
        store.seed_zone(zone).unwrap();

        store
            .merge("z1", &ZonePatch::subzones(vec![SubZone::new("s2", "B", triangle())]))
            .await
            .unwrap();

        let snapshot = store.snapshot().await.unwrap();
        let ids: Vec<_> = snapshot.zone("z1").unwrap().subzones.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["s2".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_and_write_log() {
        let store = MemoryStore::new();
        store
            .set("z1", &ZoneCreate::new("Gate", "evt", triangle()))
            .await
            .unwrap();
        store.delete("z1").await.unwrap();
        // deleting twice is not an error
        store.delete("z1").await.unwrap();

        assert!(store.snapshot().await.unwrap().is_empty());
        let kinds: Vec<_> = store.writes().iter().map(|w| w.kind()).collect();
        assert_eq!(kinds, vec!["set", "delete", "delete"]);
    }

    #[tokio::test]
    async fn test_offline_rejects_writes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.set_offline(true);

        let err = store
            .set("z1", &ZoneCreate::new("Gate", "evt", triangle()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.writes().is_empty());
        assert!(rx.try_recv().is_err());

        store.set_offline(false);
        store.set_read_only(true);
        let err = store.delete("z1").await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_seed_is_not_recorded() {
        let store = MemoryStore::new();
        store
            .seed_zone(ZoneCreate::new("Gate", "evt", triangle()).into_zone("z1"))
            .unwrap();

        assert!(store.writes().is_empty());
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document_skipped() {
        let store = MemoryStore::new();
        // a merge into a missing document produces a zone without a name
        store.merge("broken", &ZonePatch::polygon(triangle())).await.unwrap();
        store
            .set("z1", &ZoneCreate::new("Gate", "evt", triangle()))
            .await
            .unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.zone_ids().collect::<Vec<_>>(), vec!["z1"]);
        assert_eq!(store.raw_document("broken").unwrap(), json!({"polygon": serde_json::to_value(triangle()).unwrap()}));
    }

    #[tokio::test]
    async fn test_users_by_role() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe_users();
        store.put_user(User::new("u2", "Priya", Role::Volunteer));
        store.put_user(User::new("u1", "Amit", Role::Volunteer));
        store.put_user(User::new("u3", "Olga", Role::Organizer));

        let volunteers = store.list_by_role(Role::Volunteer).await.unwrap();
        let names: Vec<_> = volunteers.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Amit", "Priya"]);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.len(), 1);
        store.remove_user("u2");
        assert_eq!(store.list_by_role(Role::Volunteer).await.unwrap().len(), 1);
    }
}
