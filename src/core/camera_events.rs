//! Events emitted by dashboard widgets and handled in `DashboardApp::handle_events`.

use std::path::PathBuf;

use super::camera::CameraId;
use super::registry::TagFilter;

// === Registry ===

/// Add-form submit. Fields are raw user input.
#[derive(Clone, Debug)]
pub struct AddCameraEvent {
    pub name: String,
    pub url: String,
    pub tags: String,
}

#[derive(Clone, Debug)]
pub struct RemoveCameraEvent(pub CameraId);

/// Replace the registry with the JSON array in this file.
#[derive(Clone, Debug)]
pub struct ImportCamerasEvent(pub PathBuf);

#[derive(Clone, Debug)]
pub struct ExportCamerasEvent(pub PathBuf);

// === Drag reorder (registry indices) ===

#[derive(Clone, Debug)]
pub struct DragStartedEvent(pub usize);

/// Dragged card is over the card at this index.
#[derive(Clone, Debug)]
pub struct HoverCardEvent(pub usize);

#[derive(Clone, Debug)]
pub struct DragEndedEvent;

// === View ===

#[derive(Clone, Debug)]
pub struct SetTagFilterEvent(pub TagFilter);

#[derive(Clone, Debug)]
pub struct OpenFullscreenEvent(pub CameraId);

#[derive(Clone, Debug)]
pub struct CloseFullscreenEvent;

#[derive(Clone, Debug)]
pub struct ToggleThemeEvent;

#[derive(Clone, Debug)]
pub struct ToggleSettingsEvent;

/// Re-arm decoder creation for a camera whose stream failed.
#[derive(Clone, Debug)]
pub struct RetryDecoderEvent(pub CameraId);
