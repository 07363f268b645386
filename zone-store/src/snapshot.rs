//! Snapshot and write record types

use serde::{Deserialize, Serialize};
use shared::models::{Zone, ZoneCreate, ZonePatch};

/// Full state of the zone collection at one point in time
///
/// Zones are ordered by document id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    /// Monotonic per store; increases with every accepted write
    pub version: u64,
    pub zones: Vec<Zone>,
}

impl ZoneSnapshot {
    pub fn new(version: u64, zones: Vec<Zone>) -> Self {
        Self { version, zones }
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// A write issued against the zone collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ZoneWrite {
    /// Whole-document write (new zone)
    Set { id: String, doc: ZoneCreate },
    /// Merge-patch of selected fields
    Merge { id: String, patch: ZonePatch },
    /// Whole-document delete
    Delete { id: String },
}

impl ZoneWrite {
    pub fn doc_id(&self) -> &str {
        match self {
            ZoneWrite::Set { id, .. } | ZoneWrite::Merge { id, .. } | ZoneWrite::Delete { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ZoneWrite::Set { .. } => "set",
            ZoneWrite::Merge { .. } => "merge",
            ZoneWrite::Delete { .. } => "delete",
        }
    }
}
