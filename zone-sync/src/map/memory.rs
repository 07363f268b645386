//! In-memory map surface
//!
//! Clones share state, so a test (or the demo) can keep one handle to play
//! the user's gestures while the synchronizer owns another.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use shared::models::LatLng;

use super::{DrawingMode, EditEvent, ListenerId, MapSurface, ShapeEvent, ShapeHandle, ShapeStyle};

#[derive(Debug, Clone)]
struct Shape {
    path: Vec<LatLng>,
    style: ShapeStyle,
}

#[derive(Debug, Default)]
struct MapState {
    ready: bool,
    next_id: u64,
    shapes: BTreeMap<ShapeHandle, Shape>,
    listeners: HashMap<ListenerId, (ShapeHandle, EditEvent)>,
    drawing_mode: Option<DrawingMode>,
}

impl MapState {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn fire(&self, handle: ShapeHandle, event: EditEvent) -> Vec<ShapeEvent> {
        self.listeners
            .values()
            .filter(|(h, e)| *h == handle && *e == event)
            .map(|_| ShapeEvent { handle, event })
            .collect()
    }

    fn editable_path(&mut self, handle: ShapeHandle) -> Option<&mut Vec<LatLng>> {
        self.shapes
            .get_mut(&handle)
            .filter(|s| s.style.editable)
            .map(|s| &mut s.path)
    }
}

/// [`MapSurface`] kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryMap {
    state: Arc<Mutex<MapState>>,
}

impl InMemoryMap {
    /// A map that is not ready yet
    pub fn new() -> Self {
        Self::default()
    }

    /// A map that finished initializing
    pub fn ready() -> Self {
        let map = Self::new();
        map.set_ready(true);
        map
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    pub fn shape_count(&self) -> usize {
        self.state.lock().shapes.len()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn contains(&self, handle: ShapeHandle) -> bool {
        self.state.lock().shapes.contains_key(&handle)
    }

    pub fn style(&self, handle: ShapeHandle) -> Option<ShapeStyle> {
        self.state.lock().shapes.get(&handle).map(|s| s.style.clone())
    }

    /// Every shape currently on the map, in creation order
    pub fn paths(&self) -> Vec<(ShapeHandle, Vec<LatLng>)> {
        self.state
            .lock()
            .shapes
            .iter()
            .map(|(h, s)| (*h, s.path.clone()))
            .collect()
    }

    pub fn drawing_mode(&self) -> Option<DrawingMode> {
        self.state.lock().drawing_mode
    }

    // ========== User gestures ==========

    /// Finish drawing a polygon with the drawing tool
    ///
    /// The temporary shape has no listeners; the completion handler reads its
    /// path and removes it.
    pub fn draw(&self, path: &[LatLng]) -> ShapeHandle {
        let style = ShapeStyle {
            stroke_color: "#000000".to_string(),
            stroke_weight: 2,
            fill_color: "#000000".to_string(),
            fill_opacity: 0.3,
            editable: true,
            draggable: true,
        };
        let mut state = self.state.lock();
        let handle = ShapeHandle(state.next());
        state.shapes.insert(
            handle,
            Shape {
                path: path.to_vec(),
                style,
            },
        );
        handle
    }

    /// Drag a vertex to a new position
    pub fn move_vertex(&self, handle: ShapeHandle, index: usize, to: LatLng) -> Vec<ShapeEvent> {
        let mut state = self.state.lock();
        match state.editable_path(handle) {
            Some(path) if index < path.len() => path[index] = to,
            _ => return Vec::new(),
        }
        state.fire(handle, EditEvent::SetAt)
    }

    /// Insert a vertex before `index` (`index == len` appends)
    pub fn insert_vertex(&self, handle: ShapeHandle, index: usize, at: LatLng) -> Vec<ShapeEvent> {
        let mut state = self.state.lock();
        match state.editable_path(handle) {
            Some(path) if index <= path.len() => path.insert(index, at),
            _ => return Vec::new(),
        }
        state.fire(handle, EditEvent::InsertAt)
    }

    /// Drag the whole shape by an offset and release it
    pub fn drag(&self, handle: ShapeHandle, dlat: f64, dlng: f64) -> Vec<ShapeEvent> {
        let mut state = self.state.lock();
        let draggable = state
            .shapes
            .get(&handle)
            .is_some_and(|s| s.style.draggable);
        if !draggable {
            return Vec::new();
        }
        if let Some(shape) = state.shapes.get_mut(&handle) {
            for p in shape.path.iter_mut() {
                p.lat += dlat;
                p.lng += dlng;
            }
        }
        state.fire(handle, EditEvent::DragEnd)
    }
}

impl MapSurface for InMemoryMap {
    fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    fn add_polygon(&mut self, path: &[LatLng], style: &ShapeStyle) -> ShapeHandle {
        let mut state = self.state.lock();
        let handle = ShapeHandle(state.next());
        state.shapes.insert(
            handle,
            Shape {
                path: path.to_vec(),
                style: style.clone(),
            },
        );
        handle
    }

    fn path(&self, handle: ShapeHandle) -> Option<Vec<LatLng>> {
        self.state.lock().shapes.get(&handle).map(|s| s.path.clone())
    }

    fn set_path(&mut self, handle: ShapeHandle, path: &[LatLng]) {
        if let Some(shape) = self.state.lock().shapes.get_mut(&handle) {
            shape.path = path.to_vec();
        }
    }

    fn remove_polygon(&mut self, handle: ShapeHandle) {
        self.state.lock().shapes.remove(&handle);
    }

    fn add_listener(&mut self, handle: ShapeHandle, event: EditEvent) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.next());
        state.listeners.insert(id, (handle, event));
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.state.lock().listeners.remove(&listener);
    }

    fn set_drawing_mode(&mut self, mode: Option<DrawingMode>) {
        self.state.lock().drawing_mode = mode;
    }
}
