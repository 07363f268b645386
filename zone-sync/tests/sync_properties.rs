// zone-sync/tests/sync_properties.rs
// Reconciliation and write-translation properties of the synchronizer

mod common;

use common::{Harness, ll, square, zone};
use serde_json::json;
use shared::models::{Role, SubZone, User, Zone};
use zone_store::{ZoneSnapshot, ZoneWrite};
use zone_sync::{
    Answer, EditMode, EditorConfig, MapSurface, Outcome, ReconcileMode, ShapeKey, Skip, SyncError,
};

/// Small deterministic generator so runs are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }
}

fn random_zones(rng: &mut Lcg) -> Vec<Zone> {
    let mut zones = Vec::new();
    for i in 0..6 {
        if !rng.chance(60) {
            continue;
        }
        let base = i as f64 * 10.0;
        let size = 1.0 + (rng.next() % 3) as f64;
        let mut subzones = Vec::new();
        for j in 0..4 {
            if rng.chance(50) {
                let off = base + 0.1 * (j as f64 + 1.0);
                subzones.push(SubZone::new(
                    format!("s{}", j),
                    format!("Sub {}", j),
                    square(off, off + 0.05),
                ));
            }
        }
        zones.push(zone(&format!("z{}", i), square(base, base + size), subzones));
    }
    zones
}

fn assert_rendering_matches(h: &Harness, snapshot: &ZoneSnapshot, listeners_per_shape: usize) {
    let mut expected_zones: Vec<String> = snapshot.zone_ids().map(str::to_string).collect();
    expected_zones.sort();
    assert_eq!(h.sync.registry().zone_ids(), expected_zones);

    let mut shapes = 0;
    for z in &snapshot.zones {
        let mut expected: Vec<String> = z.subzones.iter().map(|s| s.id.clone()).collect();
        expected.sort();
        assert_eq!(h.sync.registry().subzone_ids(&z.id), expected, "zone {}", z.id);

        let handle = h.sync.shape_of(&ShapeKey::zone(&z.id)).unwrap();
        assert_eq!(h.map.path(handle).as_ref(), Some(&z.polygon));
        for sz in &z.subzones {
            let handle = h.sync.shape_of(&ShapeKey::subzone(&z.id, &sz.id)).unwrap();
            assert_eq!(h.map.path(handle).as_ref(), Some(&sz.polygon));
        }
        shapes += 1 + z.subzones.len();
    }
    assert_eq!(h.map.shape_count(), shapes);
    assert_eq!(h.map.listener_count(), shapes * listeners_per_shape);
}

fn check_random_sequence(config: EditorConfig, listeners_per_shape: usize) {
    let mut h = Harness::with_config(vec![], config);
    let mut rng = Lcg(42);

    for version in 1..=60 {
        let snapshot = ZoneSnapshot::new(version, random_zones(&mut rng));
        h.sync.apply_snapshot(snapshot.clone());
        assert_rendering_matches(&h, &snapshot, listeners_per_shape);

        // reconciling the same snapshot again changes nothing observable
        h.sync.apply_snapshot(snapshot.clone());
        assert_rendering_matches(&h, &snapshot, listeners_per_shape);
    }
}

#[test]
fn test_rendering_tracks_every_snapshot_diff() {
    check_random_sequence(EditorConfig::default(), 3);
}

#[test]
fn test_rendering_tracks_every_snapshot_rebuild() {
    check_random_sequence(
        EditorConfig::default().with_reconcile_mode(ReconcileMode::Rebuild),
        3,
    );
}

#[test]
fn test_rendering_tracks_every_snapshot_readonly() {
    check_random_sequence(
        EditorConfig::default().with_edit_mode(EditMode::ReadOnly),
        0,
    );
}

#[test]
fn test_diff_reapply_is_noop() {
    let mut h = Harness::new(vec![]);
    let snapshot = ZoneSnapshot::new(
        1,
        vec![zone("z1", square(0.0, 1.0), vec![SubZone::new("s1", "A", square(0.1, 0.2))])],
    );
    h.sync.apply_snapshot(snapshot.clone());
    let stats = h.sync.apply_snapshot(snapshot).unwrap();
    assert!(stats.is_noop());
}

#[tokio::test]
async fn test_create_zone_then_echo_renders_one_shape() {
    let mut h = Harness::new(vec![Answer::Text(Some("Gate A".to_string()))]);
    h.sync.begin_zone();
    let drawn_path = square(5.0, 6.0);
    let drawn = h.map.draw(&drawn_path);

    let outcome = h.sync.polygon_completed(drawn).await.unwrap();
    let Some(ZoneWrite::Set { id, doc }) = outcome.write().cloned() else {
        panic!("expected set, got {:?}", outcome);
    };
    assert_eq!(doc.name, "Gate A");
    assert_eq!(doc.event_id, "active-event-id");
    // not rendered until the write comes back
    assert_eq!(h.map.shape_count(), 0);

    h.echo().await;

    assert_eq!(h.map.shape_count(), 1);
    assert_eq!(h.sync.registry().zone_ids(), vec![id.clone()]);
    assert!(h.sync.registry().subzone_ids(&id).is_empty());
    let handle = h.sync.shape_of(&ShapeKey::zone(&id)).unwrap();
    assert_eq!(h.map.path(handle), Some(drawn_path));
}

#[tokio::test]
async fn test_cancelled_name_leaves_nothing_behind() {
    for answer in [Answer::Text(None), Answer::Text(Some(String::new()))] {
        let mut h = Harness::new(vec![answer]);
        h.seed(vec![zone("z1", square(0.0, 10.0), vec![])]).await;
        let shapes_before = h.map.shape_count();

        let drawn = h.map.draw(&square(20.0, 21.0));
        let outcome = h.sync.polygon_completed(drawn).await.unwrap();

        assert_eq!(outcome, Outcome::Skipped(Skip::Cancelled));
        assert!(h.store.writes().is_empty());
        assert_eq!(h.map.shape_count(), shapes_before);
        assert!(!h.map.contains(drawn));
    }
}

#[tokio::test]
async fn test_assign_twice_lists_name_once() {
    let mut h = Harness::new(vec![]);
    h.seed(vec![zone(
        "z1",
        square(0.0, 10.0),
        vec![SubZone::new("s1", "Front", square(1.0, 2.0))],
    )])
    .await;
    h.sync
        .apply_volunteers(vec![User::new("u1", "Amit", Role::Volunteer)]);

    h.sync.assign_volunteer("z1", "s1", "u1").await.unwrap();
    h.echo().await;
    h.sync.assign_volunteer("z1", "s1", "u1").await.unwrap();
    h.echo().await;

    assert_eq!(h.store.writes().len(), 2);
    assert_eq!(
        h.sync.zone("z1").unwrap().subzones[0].volunteers,
        vec!["Amit"]
    );
    assert!(h.sync.volunteer_options("z1", "s1")[0].disabled);
}

#[tokio::test]
async fn test_delete_zone_removes_subzones_from_rendering() {
    let mut h = Harness::new(vec![Answer::Confirm(true)]);
    h.seed(vec![
        zone(
            "z1",
            square(0.0, 10.0),
            vec![
                SubZone::new("s1", "A", square(1.0, 2.0)),
                SubZone::new("s2", "B", square(3.0, 4.0)),
            ],
        ),
        zone("z2", square(20.0, 30.0), vec![]),
    ])
    .await;
    assert_eq!(h.map.shape_count(), 4);

    h.sync.delete_zone("z1").await.unwrap();
    h.echo().await;

    assert_eq!(h.sync.registry().zone_ids(), vec!["z2"]);
    assert!(h.sync.registry().subzone_ids("z1").is_empty());
    assert_eq!(h.map.shape_count(), 1);
    assert_eq!(h.map.listener_count(), 3);
}

#[tokio::test]
async fn test_delete_subzone_leaves_siblings_untouched() {
    let mut h = Harness::new(vec![Answer::Confirm(true)]);
    let mut s2 = SubZone::new("s2", "B", square(3.0, 4.0));
    s2.volunteers.push("Neha".to_string());
    h.seed(vec![zone(
        "z1",
        square(0.0, 10.0),
        vec![SubZone::new("s1", "A", square(1.0, 2.0)), s2.clone()],
    )])
    .await;
    let s2_shape = h.sync.shape_of(&ShapeKey::subzone("z1", "s2")).unwrap();

    h.sync.delete_subzone("z1", "s1").await.unwrap();
    h.echo().await;

    let z1 = h.sync.zone("z1").unwrap();
    assert_eq!(z1.subzones, vec![s2]);
    assert_eq!(h.sync.registry().subzone_ids("z1"), vec!["s2"]);
    // sibling shape kept in place by the diff
    assert_eq!(h.sync.shape_of(&ShapeKey::subzone("z1", "s2")), Some(s2_shape));
}

#[tokio::test]
async fn test_vertex_added_to_zone_writes_polygon_patch() {
    let mut h = Harness::new(vec![]);
    h.seed(vec![zone(
        "z1",
        vec![ll(0.0, 0.0), ll(0.0, 1.0), ll(1.0, 1.0)],
        vec![],
    )])
    .await;
    let handle = h.sync.shape_of(&ShapeKey::zone("z1")).unwrap();

    let events = h.map.insert_vertex(handle, 3, ll(1.0, 0.0));
    assert_eq!(events.len(), 1);
    let outcome = h.sync.handle_shape_event(events[0]).await.unwrap();

    let Some(ZoneWrite::Merge { id, patch }) = outcome.write() else {
        panic!("expected merge, got {:?}", outcome);
    };
    assert_eq!(id, "z1");
    assert_eq!(
        serde_json::to_value(patch).unwrap(),
        json!({
            "polygon": [
                {"lat": 0.0, "lng": 0.0},
                {"lat": 0.0, "lng": 1.0},
                {"lat": 1.0, "lng": 1.0},
                {"lat": 1.0, "lng": 0.0}
            ]
        })
    );
}

#[tokio::test]
async fn test_remove_volunteer_writes_subzones_patch() {
    let mut h = Harness::new(vec![]);
    let mut s1 = SubZone::new("s1", "Front", square(0.1, 0.2));
    s1.volunteers.push("Amit".to_string());
    s1.extra.insert("capacity".to_string(), json!(50));
    h.seed(vec![zone("z1", square(0.0, 1.0), vec![s1])]).await;

    let outcome = h.sync.remove_volunteer("z1", "s1", "Amit").await.unwrap();

    let Some(ZoneWrite::Merge { id, patch }) = outcome.write() else {
        panic!("expected merge, got {:?}", outcome);
    };
    assert_eq!(id, "z1");
    let value = serde_json::to_value(patch).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 1);
    let entry = &value["subzones"][0];
    assert_eq!(entry["id"], "s1");
    assert_eq!(entry["volunteers"], json!([]));
    assert_eq!(entry["name"], "Front");
    assert_eq!(entry["capacity"], 50);

    // untouched zone fields survive the merge
    let doc = h.store.raw_document("z1").unwrap();
    assert_eq!(doc["name"], "Z1");
    assert_eq!(doc["subzones"][0]["volunteers"], json!([]));
}

#[tokio::test]
async fn test_pending_parent_cleared_when_parent_deleted() {
    let mut h = Harness::new(vec![Answer::Confirm(true), Answer::Default]);
    h.seed(vec![
        zone("z1", square(0.0, 10.0), vec![]),
        zone("z2", square(20.0, 30.0), vec![]),
    ])
    .await;

    assert_eq!(h.sync.begin_subzone("z1"), Outcome::Local);
    h.sync.delete_zone("z1").await.unwrap();
    h.echo().await;

    assert!(h.sync.pending_parent().is_none());
    assert_eq!(h.map.drawing_mode(), None);

    // a drawing completed now becomes a zone, not an orphan sub-zone
    let drawn = h.map.draw(&square(40.0, 41.0));
    let outcome = h.sync.polygon_completed(drawn).await.unwrap();
    assert!(matches!(outcome.write(), Some(ZoneWrite::Set { .. })));
}

#[tokio::test]
async fn test_concurrent_delete_makes_edit_a_noop() {
    let mut h = Harness::new(vec![]);
    h.seed(vec![zone(
        "z1",
        square(0.0, 10.0),
        vec![SubZone::new("s1", "A", square(1.0, 2.0))],
    )])
    .await;
    let handle = h.sync.shape_of(&ShapeKey::subzone("z1", "s1")).unwrap();
    let events = h.map.drag(handle, 0.5, 0.5);

    // another editor removed the zone before our event was handled
    h.sync.apply_snapshot(ZoneSnapshot::new(99, vec![]));

    let outcome = h.sync.handle_shape_event(events[0]).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped(Skip::Missing));
    assert!(h.store.writes().is_empty());
}

#[tokio::test]
async fn test_containment_checked_but_not_enforced_by_default() {
    let mut h = Harness::new(vec![]);
    h.seed(vec![zone(
        "z1",
        square(0.0, 10.0),
        vec![SubZone::new("s1", "A", square(1.0, 2.0))],
    )])
    .await;
    let handle = h.sync.shape_of(&ShapeKey::subzone("z1", "s1")).unwrap();

    let events = h.map.drag(handle, 50.0, 0.0);
    h.sync.handle_shape_event(events[0]).await.unwrap();
    h.echo().await;

    assert_eq!(
        h.sync.containment_violations(),
        vec![("z1".to_string(), "s1".to_string())]
    );

    let mut strict = Harness::with_config(vec![], EditorConfig::default().with_containment(true));
    strict
        .seed(vec![zone(
            "z1",
            square(0.0, 10.0),
            vec![SubZone::new("s1", "A", square(1.0, 2.0))],
        )])
        .await;
    let handle = strict.sync.shape_of(&ShapeKey::subzone("z1", "s1")).unwrap();
    let events = strict.map.drag(handle, 50.0, 0.0);
    let err = strict.sync.handle_shape_event(events[0]).await.unwrap_err();
    assert!(matches!(err, SyncError::OutsideParent { .. }));
}
