//! Responsive grid of camera cards, filtered by tag.

use eframe::egui;

use super::card::{CardView, render_card};
use super::{ActionQueue, SurfaceTextures};
use crate::core::decoders::DecoderManager;
use crate::core::registry::{CameraRegistry, TagFilter};
use crate::core::surface::{SurfaceMap, SurfaceSlot};
use crate::core::view::DragState;

pub struct GridView<'a> {
    pub registry: &'a CameraRegistry,
    pub decoders: &'a DecoderManager,
    pub filter: &'a TagFilter,
    pub drag: DragState,
    pub card_width: f32,
}

pub fn render_grid(
    ui: &mut egui::Ui,
    grid: GridView<'_>,
    surfaces: &mut SurfaceMap,
    textures: &mut SurfaceTextures,
    actions: &mut ActionQueue,
) {
    if grid.registry.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label("No cameras yet. Add one above.");
        });
        return;
    }

    let mut shown = 0;
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
                for (index, entry) in grid.registry.filter_indexed(grid.filter) {
                    shown += 1;
                    let card = CardView {
                        index,
                        entry,
                        decoder: grid.decoders.status(entry.id(), SurfaceSlot::Grid),
                        width: grid.card_width,
                        dragged: grid.drag.is_dragging_index(index),
                        drag_active: grid.drag.is_dragging(),
                    };
                    render_card(ui, card, surfaces, textures, actions);
                }
            });
        });

    if shown == 0 {
        ui.label(format!("No cameras tagged '{}'.", grid.filter.label()));
    }
}
