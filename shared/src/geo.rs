//! Polygon geometry helpers
//!
//! Planar predicates treat `lng` as x and `lat` as y, which is accurate enough
//! for event-sized regions. Area is computed on the sphere.

use serde::{Deserialize, Serialize};

use crate::models::LatLng;

/// Mean earth radius used by web map geometry libraries (metres)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

const EPSILON: f64 = 1e-12;

/// Vertex order of a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

/// Axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }
}

/// Drop repeated consecutive vertices and an explicit closing vertex
pub fn normalize_ring(path: &[LatLng]) -> Vec<LatLng> {
    let mut ring: Vec<LatLng> = Vec::with_capacity(path.len());
    for p in path {
        if ring.last() != Some(p) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// At least three distinct vertices enclosing a non-zero area
pub fn is_valid_ring(path: &[LatLng]) -> bool {
    let ring = normalize_ring(path);
    ring.len() >= 3 && signed_area(&ring).abs() > EPSILON
}

/// Shoelace area in degree units; positive for counter-clockwise rings
pub fn signed_area(path: &[LatLng]) -> f64 {
    edges(path)
        .map(|(a, b)| a.lng * b.lat - b.lng * a.lat)
        .sum::<f64>()
        / 2.0
}

pub fn winding(path: &[LatLng]) -> Option<Winding> {
    let area = signed_area(path);
    if area > EPSILON {
        Some(Winding::CounterClockwise)
    } else if area < -EPSILON {
        Some(Winding::Clockwise)
    } else {
        None
    }
}

/// Geodesic area in square metres
pub fn area_sq_meters(path: &[LatLng]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let total: f64 = edges(path)
        .map(|(a, b)| {
            let dlng = (b.lng - a.lng).to_radians();
            dlng * (2.0 + a.lat.to_radians().sin() + b.lat.to_radians().sin())
        })
        .sum();
    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

pub fn bounds(path: &[LatLng]) -> Option<Bounds> {
    let first = path.first()?;
    let init = Bounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    Some(path.iter().fold(init, |b, p| Bounds {
        south: b.south.min(p.lat),
        west: b.west.min(p.lng),
        north: b.north.max(p.lat),
        east: b.east.max(p.lng),
    }))
}

/// Area-weighted centroid; falls back to the vertex mean for degenerate rings
pub fn centroid(path: &[LatLng]) -> Option<LatLng> {
    if path.is_empty() {
        return None;
    }
    let area = signed_area(path);
    if area.abs() <= EPSILON {
        let n = path.len() as f64;
        let (lat, lng) = path
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        return Some(LatLng::new(lat / n, lng / n));
    }
    let (cx, cy) = edges(path).fold((0.0, 0.0), |(cx, cy), (a, b)| {
        let cross = a.lng * b.lat - b.lng * a.lat;
        (cx + (a.lng + b.lng) * cross, cy + (a.lat + b.lat) * cross)
    });
    Some(LatLng::new(cy / (6.0 * area), cx / (6.0 * area)))
}

/// True when no two non-adjacent edges touch
pub fn is_simple(path: &[LatLng]) -> bool {
    let ring = normalize_ring(path);
    let n = ring.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // adjacent edges share a vertex by construction
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_touch(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Point-in-polygon, boundary inclusive
pub fn contains_point(path: &[LatLng], p: LatLng) -> bool {
    if path.len() < 3 {
        return false;
    }
    if edges(path).any(|(a, b)| on_segment(a, b, p)) {
        return true;
    }
    let mut inside = false;
    for (a, b) in edges(path) {
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let x = a.lng + (p.lat - a.lat) * (b.lng - a.lng) / (b.lat - a.lat);
            if p.lng < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// `inner` lies within `outer`; shared edges and vertices are allowed
pub fn contains_polygon(outer: &[LatLng], inner: &[LatLng]) -> bool {
    if !is_valid_ring(outer) || !is_valid_ring(inner) {
        return false;
    }
    if !inner.iter().all(|p| contains_point(outer, *p)) {
        return false;
    }
    for (a, b) in edges(inner) {
        let mid = LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0);
        if !contains_point(outer, mid) {
            return false;
        }
        if edges(outer).any(|(c, d)| segments_cross(a, b, c, d)) {
            return false;
        }
    }
    true
}

fn edges(path: &[LatLng]) -> impl Iterator<Item = (LatLng, LatLng)> + '_ {
    let n = path.len();
    (0..n).map(move |i| (path[i], path[(i + 1) % n]))
}

fn orient(a: LatLng, b: LatLng, c: LatLng) -> f64 {
    (b.lng - a.lng) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lng - a.lng)
}

fn sign(v: f64) -> i8 {
    if v > EPSILON {
        1
    } else if v < -EPSILON {
        -1
    } else {
        0
    }
}

fn on_segment(a: LatLng, b: LatLng, p: LatLng) -> bool {
    sign(orient(a, b, p)) == 0
        && p.lng >= a.lng.min(b.lng) - EPSILON
        && p.lng <= a.lng.max(b.lng) + EPSILON
        && p.lat >= a.lat.min(b.lat) - EPSILON
        && p.lat <= a.lat.max(b.lat) + EPSILON
}

/// Segments intersect strictly inside both (no endpoint contact, not collinear)
fn segments_cross(a1: LatLng, a2: LatLng, b1: LatLng, b2: LatLng) -> bool {
    let d1 = sign(orient(b1, b2, a1));
    let d2 = sign(orient(b1, b2, a2));
    let d3 = sign(orient(a1, a2, b1));
    let d4 = sign(orient(a1, a2, b2));
    d1 * d2 < 0 && d3 * d4 < 0
}

/// Segments share at least one point
fn segments_touch(a1: LatLng, a2: LatLng, b1: LatLng, b2: LatLng) -> bool {
    segments_cross(a1, a2, b1, b2)
        || on_segment(b1, b2, a1)
        || on_segment(b1, b2, a2)
        || on_segment(a1, a2, b1)
        || on_segment(a1, a2, b2)
}
