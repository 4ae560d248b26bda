//! Frame surfaces: the drawable targets decoders write into.
//!
//! A surface is mounted by the card (or the fullscreen view) the first time
//! it is drawn. The decoder manager can only bind a decoder to a mounted
//! surface; until then it retries on every reconciliation pass.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::camera::CameraId;

/// Which view of a camera a surface belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSlot {
    Grid,
    Fullscreen,
}

/// Surface address derived from a camera id.
///
/// Displays as `canvas-<id>` or `fullscreen-<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    pub camera: CameraId,
    pub slot: SurfaceSlot,
}

impl SurfaceId {
    pub fn grid(camera: CameraId) -> Self {
        Self { camera, slot: SurfaceSlot::Grid }
    }

    pub fn fullscreen(camera: CameraId) -> Self {
        Self { camera, slot: SurfaceSlot::Fullscreen }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            SurfaceSlot::Grid => write!(f, "canvas-{}", self.camera),
            SurfaceSlot::Fullscreen => write!(f, "fullscreen-{}", self.camera),
        }
    }
}

/// One decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceFrame {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    frame: Option<SurfaceFrame>,
    generation: u64,
}

/// Shared latest-frame slot. Writers replace, readers poll by generation.
#[derive(Debug, Clone, Default)]
pub struct FrameSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl FrameSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new frame.
    pub fn present(&self, frame: SurfaceFrame) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.frame = Some(frame);
        state.generation += 1;
    }

    /// Drop the current image (decoder gone).
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.frame = None;
        state.generation += 1;
    }

    /// Take a copy of the frame if it changed since `seen`.
    pub fn frame_since(&self, seen: u64) -> Option<(u64, Option<SurfaceFrame>)> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.generation != seen).then(|| (state.generation, state.frame.clone()))
    }

    pub fn same_as(&self, other: &FrameSurface) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Lookup of mounted surfaces.
pub trait SurfaceResolver {
    fn resolve(&self, id: &SurfaceId) -> Option<FrameSurface>;
}

/// Surfaces mounted by the UI, keyed by address.
#[derive(Debug, Default)]
pub struct SurfaceMap {
    mounted: HashMap<SurfaceId, FrameSurface>,
}

impl SurfaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount (or return the already mounted) surface for `id`.
    pub fn mount(&mut self, id: SurfaceId) -> FrameSurface {
        self.mounted.entry(id).or_default().clone()
    }

    pub fn get(&self, id: &SurfaceId) -> Option<&FrameSurface> {
        self.mounted.get(id)
    }

    pub fn unmount(&mut self, id: &SurfaceId) -> bool {
        self.mounted.remove(id).is_some()
    }

    /// Unmount every surface of cameras not in `keep`.
    pub fn retain_cameras(&mut self, keep: impl Fn(CameraId) -> bool) {
        self.mounted.retain(|id, _| keep(id.camera));
    }

    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }
}

impl SurfaceResolver for SurfaceMap {
    fn resolve(&self, id: &SurfaceId) -> Option<FrameSurface> {
        self.mounted.get(id).cloned()
    }
}
