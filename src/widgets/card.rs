//! One camera card in the grid.

use eframe::egui;

use super::{ActionQueue, SurfaceTextures};
use crate::core::camera::CameraEntry;
use crate::core::camera_events::{
    DragEndedEvent, DragStartedEvent, HoverCardEvent, OpenFullscreenEvent, RemoveCameraEvent,
    RetryDecoderEvent,
};
use crate::core::surface::{SurfaceId, SurfaceMap, SurfaceSlot};
use crate::decoder::DecoderStatus;

/// Preview aspect ratio (16:9).
const PREVIEW_ASPECT: f32 = 9.0 / 16.0;

/// Everything a card needs to draw itself.
pub struct CardView<'a> {
    /// Position in the registry (not in the filtered list).
    pub index: usize,
    pub entry: &'a CameraEntry,
    pub decoder: Option<DecoderStatus>,
    pub width: f32,
    /// This card is being dragged.
    pub dragged: bool,
    /// Some card is being dragged.
    pub drag_active: bool,
}

pub fn render_card(
    ui: &mut egui::Ui,
    card: CardView<'_>,
    surfaces: &mut SurfaceMap,
    textures: &mut SurfaceTextures,
    actions: &mut ActionQueue,
) {
    let entry = card.entry;
    let inner_width = card.width - 16.0;

    // Ids keyed by camera so an in-flight drag survives the card moving
    let frame = ui
        .push_id(entry.id(), |ui| {
            if card.dragged {
                ui.set_opacity(0.5);
            }
            egui::Frame::group(ui.style())
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.set_width(inner_width);

                    ui.horizontal(|ui| {
                        let handle = ui
                            .add(egui::Label::new("↕").sense(egui::Sense::drag()))
                            .on_hover_cursor(egui::CursorIcon::Grab)
                            .on_hover_text("Drag to reorder");
                        if handle.drag_started() {
                            actions.send(DragStartedEvent(card.index));
                        }
                        if handle.drag_stopped() {
                            actions.send(DragEndedEvent);
                        }
                        ui.strong(entry.name());
                    });
                    ui.small(entry.url());
                    if !entry.tags().is_empty() {
                        ui.small(format!("Tags: {}", entry.tags_label()));
                    }
                    ui.add_space(4.0);

                    let size = egui::vec2(inner_width, inner_width * PREVIEW_ASPECT);
                    render_preview(ui, entry, SurfaceSlot::Grid, card.decoder.as_ref(), size, surfaces, textures);

                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.label(format!("Status: {}", entry.status()));
                        if let Some(status) = &card.decoder {
                            ui.weak(decoder_label(status));
                        }
                    });

                    ui.horizontal(|ui| {
                        if ui.button("Fullscreen").clicked() {
                            actions.send(OpenFullscreenEvent(entry.id()));
                        }
                        if ui.button("Remove").clicked() {
                            actions.send(RemoveCameraEvent(entry.id()));
                        }
                        if card.decoder.as_ref().is_some_and(DecoderStatus::is_retryable)
                            && ui.button("Retry").clicked()
                        {
                            actions.send(RetryDecoderEvent(entry.id()));
                        }
                    });
                })
                .response
        })
        .inner;

    if card.drag_active && !card.dragged && ui.rect_contains_pointer(frame.rect) {
        actions.send(HoverCardEvent(card.index));
    }
}

/// Live preview of a camera: decoded stream surface or the embeddable source.
pub fn render_preview(
    ui: &mut egui::Ui,
    entry: &CameraEntry,
    slot: SurfaceSlot,
    decoder: Option<&DecoderStatus>,
    size: egui::Vec2,
    surfaces: &mut SurfaceMap,
    textures: &mut SurfaceTextures,
) {
    if entry.is_stream() {
        let id = SurfaceId { camera: entry.id(), slot };
        let surface = surfaces.mount(id);
        let placeholder = decoder.map(decoder_label).unwrap_or_else(|| "Waiting for decoder".to_string());
        textures.show(ui, id, &surface, size, &placeholder);
    } else {
        let source = entry.embed_source();
        ui.add(
            egui::Image::new(source.as_str())
                .fit_to_exact_size(size)
                .maintain_aspect_ratio(true)
                .show_loading_spinner(true),
        );
        ui.hyperlink_to("Open in browser", source);
    }
}

pub fn decoder_label(status: &DecoderStatus) -> String {
    match status {
        DecoderStatus::Connecting => "Connecting...".to_string(),
        DecoderStatus::Playing => "Live".to_string(),
        DecoderStatus::Ended => "Stream ended".to_string(),
        DecoderStatus::Failed(e) => format!("Failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecoderError;

    #[test]
    fn test_decoder_labels() {
        assert_eq!(decoder_label(&DecoderStatus::Playing), "Live");
        assert_eq!(
            decoder_label(&DecoderStatus::Failed(DecoderError::NoVideoStream)),
            "Failed: no video stream found"
        );
    }
}
