//! Editor configuration
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | ZONE_EVENT_ID | active-event-id | Event new zones are attached to |
//! | MAP_CENTER_LAT | 13.6288 | Initial map center latitude |
//! | MAP_CENTER_LNG | 79.4192 | Initial map center longitude |
//! | MAP_ZOOM | 17 | Initial zoom level |
//! | ZONE_EDIT_MODE | editable | `editable` or `readonly` |
//! | ZONE_RECONCILE_MODE | diff | `diff` or `rebuild` |
//! | ZONE_ENFORCE_CONTAINMENT | false | Reject sub-zones outside their zone |
//! | LOG_LEVEL | info | Log level |
//! | LOG_DIR | (unset) | Daily rolling log directory |

use std::str::FromStr;

use shared::models::LatLng;

use crate::map::ShapeStyle;

/// Whether shapes can be edited on this map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Zone editor: shapes editable and draggable, edit listeners attached
    #[default]
    Editable,
    /// Overview map: shapes rendered without edit handles or listeners
    ReadOnly,
}

impl FromStr for EditMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "editable" => Ok(EditMode::Editable),
            "readonly" | "read-only" | "read_only" => Ok(EditMode::ReadOnly),
            other => Err(format!("unknown edit mode: {}", other)),
        }
    }
}

/// How a snapshot is applied to rendered shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Create, update or remove only what changed, keyed by id
    #[default]
    Diff,
    /// Tear down every shape and rebuild from the snapshot
    Rebuild,
}

impl FromStr for ReconcileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diff" => Ok(ReconcileMode::Diff),
            "rebuild" => Ok(ReconcileMode::Rebuild),
            other => Err(format!("unknown reconcile mode: {}", other)),
        }
    }
}

/// Initial map viewport
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(13.6288, 79.4192),
            zoom: 17,
        }
    }
}

/// Zone editor configuration
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Event that newly drawn zones belong to
    pub event_id: String,
    pub map: MapOptions,
    pub edit_mode: EditMode,
    pub reconcile_mode: ReconcileMode,
    /// Reject sub-zone creation and edits that leave the parent polygon
    pub enforce_containment: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl EditorConfig {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            event_id: std::env::var("ZONE_EVENT_ID").unwrap_or(defaults.event_id),
            map: MapOptions {
                center: LatLng::new(
                    env_parse("MAP_CENTER_LAT").unwrap_or(defaults.map.center.lat),
                    env_parse("MAP_CENTER_LNG").unwrap_or(defaults.map.center.lng),
                ),
                zoom: env_parse("MAP_ZOOM").unwrap_or(defaults.map.zoom),
            },
            edit_mode: env_parse("ZONE_EDIT_MODE").unwrap_or(defaults.edit_mode),
            reconcile_mode: env_parse("ZONE_RECONCILE_MODE").unwrap_or(defaults.reconcile_mode),
            enforce_containment: env_parse("ZONE_ENFORCE_CONTAINMENT")
                .unwrap_or(defaults.enforce_containment),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().or(defaults.log_dir),
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn with_edit_mode(mut self, mode: EditMode) -> Self {
        self.edit_mode = mode;
        self
    }

    pub fn with_reconcile_mode(mut self, mode: ReconcileMode) -> Self {
        self.reconcile_mode = mode;
        self
    }

    pub fn with_containment(mut self, enforce: bool) -> Self {
        self.enforce_containment = enforce;
        self
    }

    /// Command-line log settings override the environment
    pub fn with_logging(mut self, level: Option<String>, dir: Option<String>) -> Self {
        if let Some(level) = level {
            self.log_level = level;
        }
        if dir.is_some() {
            self.log_dir = dir;
        }
        self
    }

    pub fn is_editable(&self) -> bool {
        self.edit_mode == EditMode::Editable
    }

    /// Style for top-level zones
    pub fn zone_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: "#1E88E5".to_string(),
            stroke_weight: 2,
            fill_color: "#90CAF9".to_string(),
            fill_opacity: 0.25,
            editable: self.is_editable(),
            draggable: self.is_editable(),
        }
    }

    /// Style for sub-zones, visually distinct from their parent
    pub fn subzone_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: "#2E7D32".to_string(),
            stroke_weight: 1,
            fill_color: "#A5D6A7".to_string(),
            fill_opacity: 0.35,
            editable: self.is_editable(),
            draggable: self.is_editable(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            event_id: "active-event-id".to_string(),
            map: MapOptions::default(),
            edit_mode: EditMode::Editable,
            reconcile_mode: ReconcileMode::Diff,
            enforce_containment: false,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
