//! Paints a [`FrameSurface`] into the UI through a cached texture.

use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, Rect, Sense, TextureHandle, TextureOptions, pos2};

use crate::core::surface::{FrameSurface, SurfaceFrame, SurfaceId};

#[derive(Default)]
struct TextureSlot {
    seen: u64,
    texture: Option<TextureHandle>,
}

/// Textures for mounted surfaces, re-uploaded only when the surface generation moves.
#[derive(Default)]
pub struct SurfaceTextures {
    slots: HashMap<SurfaceId, TextureSlot>,
}

impl SurfaceTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the surface into a `size` box, letterboxed. `placeholder` is
    /// shown while there is no frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        id: SurfaceId,
        surface: &FrameSurface,
        size: egui::Vec2,
        placeholder: &str,
    ) -> egui::Response {
        let slot = self.slots.entry(id).or_default();
        if let Some((generation, frame)) = surface.frame_since(slot.seen) {
            slot.seen = generation;
            match frame {
                Some(frame) => upload(ui.ctx(), id, slot, &frame),
                None => slot.texture = None,
            }
        }

        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, Color32::BLACK);

        match &slot.texture {
            Some(texture) => {
                let [w, h] = texture.size();
                painter.image(
                    texture.id(),
                    fit_rect(rect, w as f32, h as f32),
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    placeholder,
                    egui::FontId::proportional(14.0),
                    Color32::LIGHT_GRAY,
                );
            }
        }

        response
    }

    /// Drop textures of surfaces that are gone.
    pub fn retain(&mut self, keep: impl Fn(&SurfaceId) -> bool) {
        self.slots.retain(|id, _| keep(id));
    }

    pub fn forget(&mut self, id: &SurfaceId) {
        self.slots.remove(id);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn upload(ctx: &egui::Context, id: SurfaceId, slot: &mut TextureSlot, frame: &SurfaceFrame) {
    let image = ColorImage::from_rgba_unmultiplied([frame.width, frame.height], &frame.rgba);
    match &mut slot.texture {
        Some(texture) => texture.set(image, TextureOptions::LINEAR),
        None => slot.texture = Some(ctx.load_texture(id.to_string(), image, TextureOptions::LINEAR)),
    }
}

/// Largest rect with the image aspect ratio centered inside `outer`.
pub fn fit_rect(outer: Rect, width: f32, height: f32) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return outer;
    }
    let scale = (outer.width() / width).min(outer.height() / height);
    Rect::from_center_size(outer.center(), egui::vec2(width * scale, height * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::CameraId;

    #[test]
    fn test_fit_rect_letterbox() {
        let outer = Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(320.0, 240.0));
        let fitted = fit_rect(outer, 1920.0, 1080.0);
        assert_eq!(fitted.width(), 320.0);
        assert_eq!(fitted.height(), 180.0);
        assert_eq!(fitted.center(), outer.center());
    }

    #[test]
    fn test_fit_rect_pillarbox() {
        let outer = Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(400.0, 100.0));
        let fitted = fit_rect(outer, 100.0, 100.0);
        assert_eq!(fitted.width(), 100.0);
        assert_eq!(fitted.height(), 100.0);
    }

    #[test]
    fn test_fit_rect_degenerate() {
        let outer = Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(10.0, 10.0));
        assert_eq!(fit_rect(outer, 0.0, 5.0), outer);
    }

    #[test]
    fn test_retain_and_forget() {
        let a = CameraId::new();
        let b = CameraId::new();
        let mut textures = SurfaceTextures::new();
        textures.slots.insert(SurfaceId::grid(a), TextureSlot::default());
        textures.slots.insert(SurfaceId::fullscreen(a), TextureSlot::default());
        textures.slots.insert(SurfaceId::grid(b), TextureSlot::default());

        textures.retain(|id| id.camera != b);
        assert_eq!(textures.len(), 2);
        textures.forget(&SurfaceId::fullscreen(a));
        assert_eq!(textures.len(), 1);
    }
}
