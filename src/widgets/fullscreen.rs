//! Single camera enlarged over the whole central area.

use eframe::egui;

use super::card::{decoder_label, render_preview};
use super::{ActionQueue, SurfaceTextures};
use crate::core::camera::CameraEntry;
use crate::core::camera_events::CloseFullscreenEvent;
use crate::core::surface::{SurfaceMap, SurfaceSlot};
use crate::decoder::DecoderStatus;

pub fn render_fullscreen(
    ui: &mut egui::Ui,
    entry: &CameraEntry,
    decoder: Option<DecoderStatus>,
    surfaces: &mut SurfaceMap,
    textures: &mut SurfaceTextures,
    actions: &mut ActionQueue,
) {
    ui.horizontal(|ui| {
        if ui.button("Close").clicked() {
            actions.send(CloseFullscreenEvent);
        }
        ui.heading(entry.name());
        if let Some(status) = &decoder {
            ui.weak(decoder_label(status));
        }
    });
    ui.separator();

    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        actions.send(CloseFullscreenEvent);
    }

    let mut size = ui.available_size();
    if !entry.is_stream() {
        // Room for the browser link under the image
        size.y = (size.y - 24.0).max(0.0);
    }
    render_preview(
        ui,
        entry,
        SurfaceSlot::Fullscreen,
        decoder.as_ref(),
        size,
        surfaces,
        textures,
    );
}
