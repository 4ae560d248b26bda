//! Main application loop - eframe::App implementation.
//!
//! Each frame:
//! - apply settings (theme, font size, bare-IP policy)
//! - process events queued by widgets last frame, reconcile decoders
//! - draw top bar, add form, filter bar and the grid or fullscreen view
//! - reconcile again so surfaces mounted this frame get decoders at once

use std::time::Duration;

use eframe::{egui, glow};
use log::{info, trace};

use super::DashboardApp;
use crate::core::camera_events::DragEndedEvent;
use crate::dialogs::prefs::render_settings_window;
use crate::widgets::ActionQueue;
use crate::widgets::fullscreen::render_fullscreen;
use crate::widgets::grid::{GridView, render_grid};
use crate::widgets::toolbar::{render_add_form, render_filter_bar, render_top_bar};
use crate::core::surface::SurfaceSlot;

/// Repaint interval while decoders are live (~30 fps).
const LIVE_REPAINT: Duration = Duration::from_millis(33);

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.start_health_server();

        if self.launch.fullscreen && !self.window_fullscreen_applied {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
            self.window_fullscreen_applied = true;
        }

        self.apply_settings();
        if self.settings.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
        let mut style = (*ctx.style()).clone();
        for (_, font_id) in style.text_styles.iter_mut() {
            font_id.size = self.settings.font_size;
        }
        ctx.set_style(style);

        // Pointer released outside any card: the handle never saw drag_stopped
        if self.view.drag().is_dragging() && !ctx.input(|i| i.pointer.any_down()) {
            self.event_bus.emit(DragEndedEvent);
        }

        self.handle_events();
        self.refresh_snapshots(ctx);

        let mut actions = ActionQueue::new();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            render_top_bar(ui, self.settings.dark_mode, &mut actions);
            ui.separator();
            render_add_form(ui, &mut self.form, self.error_msg.as_deref(), &mut actions);
            if let Some(err) = self.registry.last_persist_error() {
                ui.colored_label(ui.visuals().warn_fg_color, format!("Cameras not saved: {}", err));
            }
            render_filter_bar(ui, &self.registry.all_tags(), self.view.filter(), &mut actions);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let fullscreen = self.view.fullscreen().and_then(|id| self.registry.get(id));
            match fullscreen {
                Some(entry) => {
                    let decoder = self.decoders.status(entry.id(), SurfaceSlot::Fullscreen);
                    render_fullscreen(
                        ui,
                        entry,
                        decoder,
                        &mut self.surfaces,
                        &mut self.textures,
                        &mut actions,
                    );
                }
                None => {
                    let grid = GridView {
                        registry: &self.registry,
                        decoders: &self.decoders,
                        filter: self.view.filter(),
                        drag: self.view.drag(),
                        card_width: self.settings.card_width,
                    };
                    render_grid(ui, grid, &mut self.surfaces, &mut self.textures, &mut actions);
                }
            }
        });

        render_settings_window(ctx, &mut self.show_settings, &mut self.settings);

        if !actions.events.is_empty() {
            actions.flush(&self.event_bus);
            ctx.request_repaint();
        }

        self.reconcile_decoders();

        if self.decoders.live_count() > 0 || self.decoders.has_pending() {
            ctx.request_repaint_after(LIVE_REPAINT);
        }
    }

    /// Save app settings to persistent storage.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.dark_mode = self.view.dark_mode;
        self.settings.selected_tag = self.view.filter().clone();

        if let Ok(json) = serde_json::to_string(&self.settings) {
            storage.set_string(eframe::APP_KEY, json);
            trace!("Settings saved");
        }
        // Camera list is already write-through; this only covers a failed earlier write
        if self.registry.last_persist_error().is_some() {
            self.registry.save();
        }
    }

    /// Destroy every decoder before the window goes away.
    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.decoders.shutdown();
        info!("Dashboard closed");
    }
}

impl DashboardApp {
    /// Re-fetch embeddable previews every `snapshot_refresh_secs`.
    fn refresh_snapshots(&mut self, ctx: &egui::Context) {
        let interval = self.settings.snapshot_refresh_secs as f64;
        if interval <= 0.0 {
            return;
        }
        let now = ctx.input(|i| i.time);
        if now - self.last_snapshot_refresh < interval {
            ctx.request_repaint_after(Duration::from_secs_f64(interval));
            return;
        }
        self.last_snapshot_refresh = now;

        for entry in self.registry.entries().iter().filter(|e| !e.is_stream()) {
            ctx.forget_image(&entry.embed_source());
        }
        ctx.request_repaint_after(Duration::from_secs_f64(interval));
    }
}
