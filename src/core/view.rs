//! Dashboard view state: theme, tag filter, fullscreen target and drag tracking.
//!
//! Nothing here is part of the persisted registry. Reordering is delegated
//! to [`CameraRegistry::move_camera`] one step at a time while a card is
//! dragged over other cards.

use log::debug;

use super::camera::CameraId;
use super::registry::{CameraRegistry, TagFilter};

/// Tracks the card being dragged by its current registry index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    drag_index: Option<usize>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.drag_index.is_some()
    }

    /// Whether the card at `index` is the one being dragged.
    pub fn is_dragging_index(&self, index: usize) -> bool {
        self.drag_index == Some(index)
    }

    pub fn drag_index(&self) -> Option<usize> {
        self.drag_index
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub dark_mode: bool,
    filter: TagFilter,
    fullscreen: Option<CameraId>,
    drag: DragState,
}

impl ViewState {
    pub fn new(dark_mode: bool, filter: TagFilter) -> Self {
        Self {
            dark_mode,
            filter,
            fullscreen: None,
            drag: DragState::default(),
        }
    }

    // === Theme ===

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    // === Tag filter ===

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: TagFilter) {
        self.filter = filter;
    }

    // === Fullscreen ===

    pub fn fullscreen(&self) -> Option<CameraId> {
        self.fullscreen
    }

    /// Show `id` fullscreen, replacing any previous target.
    pub fn open_fullscreen(&mut self, id: CameraId) {
        self.fullscreen = Some(id);
    }

    pub fn close_fullscreen(&mut self) {
        self.fullscreen = None;
    }

    /// Drop a fullscreen target whose camera no longer exists.
    pub fn sync_fullscreen(&mut self, registry: &CameraRegistry) {
        if let Some(id) = self.fullscreen
            && !registry.contains(id)
        {
            self.fullscreen = None;
        }
    }

    // === Drag reorder ===

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn begin_drag(&mut self, index: usize) {
        self.drag.drag_index = Some(index);
    }

    /// Dragged item is over the card at `index`.
    ///
    /// Moves the dragged entry one relocation and tracks its new index.
    /// Returns true when the registry changed.
    pub fn hover(&mut self, index: usize, registry: &mut CameraRegistry) -> bool {
        let Some(drag_index) = self.drag.drag_index else {
            return false;
        };
        if drag_index == index {
            return false;
        }
        match registry.move_camera(drag_index, index) {
            Ok(()) => {
                self.drag.drag_index = Some(index);
                true
            }
            Err(e) => {
                debug!("Drag hover ignored: {}", e);
                self.drag.drag_index = None;
                false
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.drag.drag_index = None;
    }
}
