//! Offline zone checks
//!
//! Validates a dump of the zone collection: polygon shape, area and whether
//! every sub-zone stays inside its zone. Used by `zone-editor check`.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::geo::{self, Winding};
use shared::models::{LatLng, Zone};
use zone_store::ZoneSnapshot;

/// Metrics for one polygon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonReport {
    pub id: String,
    pub name: String,
    pub vertices: usize,
    pub area_sq_m: f64,
    pub winding: Option<Winding>,
    pub simple: bool,
    pub valid: bool,
}

impl PolygonReport {
    fn new(id: &str, name: &str, polygon: &[LatLng]) -> Self {
        let ring = geo::normalize_ring(polygon);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            vertices: ring.len(),
            area_sq_m: geo::area_sq_meters(&ring),
            winding: geo::winding(&ring),
            simple: geo::is_simple(&ring),
            valid: geo::is_valid_ring(&ring) && geo::is_simple(&ring),
        }
    }
}

/// Metrics for a zone and its sub-zones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneReport {
    pub zone: PolygonReport,
    pub subzones: Vec<PolygonReport>,
    /// Sub-zone ids not contained in the zone polygon
    pub outside: Vec<String>,
    /// Sub-zone ids used more than once
    pub duplicate_ids: Vec<String>,
}

impl ZoneReport {
    pub fn is_ok(&self) -> bool {
        self.zone.valid
            && self.subzones.iter().all(|s| s.valid)
            && self.outside.is_empty()
            && self.duplicate_ids.is_empty()
    }
}

/// Result of checking a whole collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckReport {
    pub zones: Vec<ZoneReport>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.zones.iter().all(ZoneReport::is_ok)
    }

    pub fn problem_count(&self) -> usize {
        self.zones.iter().filter(|z| !z.is_ok()).count()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.zones {
            let z = &report.zone;
            writeln!(
                f,
                "{} {} ({}): {} vertices, {:.1} m², {}",
                if report.is_ok() { "OK  " } else { "FAIL" },
                z.id,
                z.name,
                z.vertices,
                z.area_sq_m,
                if z.valid { "valid" } else { "invalid polygon" },
            )?;
            for s in &report.subzones {
                let outside = report.outside.contains(&s.id);
                writeln!(
                    f,
                    "    {} ({}): {} vertices, {:.1} m²{}{}",
                    s.id,
                    s.name,
                    s.vertices,
                    s.area_sq_m,
                    if s.valid { "" } else { ", invalid polygon" },
                    if outside { ", outside zone" } else { "" },
                )?;
            }
            for id in &report.duplicate_ids {
                writeln!(f, "    duplicate sub-zone id {}", id)?;
            }
        }
        write!(
            f,
            "{} zone(s), {} with problems",
            self.zones.len(),
            self.problem_count()
        )
    }
}

/// Check every zone in a collection
pub fn check_zones(zones: &[Zone]) -> CheckReport {
    CheckReport {
        zones: zones.iter().map(check_zone).collect(),
    }
}

fn check_zone(zone: &Zone) -> ZoneReport {
    let mut seen = std::collections::HashSet::new();
    let mut duplicate_ids = Vec::new();
    for sz in &zone.subzones {
        if !seen.insert(sz.id.as_str()) && !duplicate_ids.contains(&sz.id) {
            duplicate_ids.push(sz.id.clone());
        }
    }
    ZoneReport {
        zone: PolygonReport::new(&zone.id, &zone.name, &zone.polygon),
        subzones: zone
            .subzones
            .iter()
            .map(|sz| PolygonReport::new(&sz.id, &sz.name, &sz.polygon))
            .collect(),
        outside: zone.containment_violations(),
        duplicate_ids,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZoneDump {
    Snapshot(ZoneSnapshot),
    List(Vec<Zone>),
}

/// Read zones from a JSON file holding either a zone array or a snapshot
pub fn load_zones(path: &Path) -> anyhow::Result<Vec<Zone>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let dump: ZoneDump = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse zones from {}", path.display()))?;
    Ok(match dump {
        ZoneDump::Snapshot(snapshot) => snapshot.zones,
        ZoneDump::List(zones) => zones,
    })
}
