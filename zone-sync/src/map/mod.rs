//! Map surface abstraction
//!
//! The interactive map owns rendering and gestures. The synchronizer only
//! creates polygon overlays, reads their paths back, registers edit
//! listeners and toggles the drawing tool.
//!
//! ```text
//!   ZoneSynchronizer ──add_polygon / add_listener──▶ MapSurface
//!          ▲                                            │
//!          └──────────── ShapeEvent (set/insert/drag) ──┘
//! ```

mod memory;

pub use memory::InMemoryMap;

use serde::{Deserialize, Serialize};
use shared::models::LatLng;
use std::fmt;

/// Opaque overlay handle issued by the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub u64);

impl fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Edit gestures that change a shape's path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditEvent {
    /// An existing vertex moved
    SetAt,
    /// A vertex was inserted (midpoint handle dragged)
    InsertAt,
    /// The whole shape was dragged and released
    DragEnd,
}

impl EditEvent {
    pub const ALL: [EditEvent; 3] = [EditEvent::SetAt, EditEvent::InsertAt, EditEvent::DragEnd];
}

/// An edit reported by a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeEvent {
    pub handle: ShapeHandle,
    pub event: EditEvent,
}

/// Drawing tool state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    Polygon,
}

/// Overlay style options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub fill_color: String,
    pub fill_opacity: f32,
    pub editable: bool,
    pub draggable: bool,
}

/// Interactive map surface
pub trait MapSurface {
    /// Whether the map finished initializing
    fn is_ready(&self) -> bool;

    fn add_polygon(&mut self, path: &[LatLng], style: &ShapeStyle) -> ShapeHandle;

    /// Current path of a shape, `None` when the handle is unknown
    fn path(&self, handle: ShapeHandle) -> Option<Vec<LatLng>>;

    fn set_path(&mut self, handle: ShapeHandle, path: &[LatLng]);

    fn remove_polygon(&mut self, handle: ShapeHandle);

    fn add_listener(&mut self, handle: ShapeHandle, event: EditEvent) -> ListenerId;

    fn remove_listener(&mut self, listener: ListenerId);

    /// `None` switches the drawing tool off
    fn set_drawing_mode(&mut self, mode: Option<DrawingMode>);
}
