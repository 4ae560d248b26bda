//! Event handling for DashboardApp.

use log::{debug, info, trace};

use super::DashboardApp;
use crate::core::camera::parse_tags;
use crate::core::camera_events::*;
use crate::core::event_bus::downcast_event;
use crate::core::registry::{RegistryError, TagFilter};
use crate::core::surface::SurfaceId;

impl DashboardApp {
    /// Handle events from event bus, then bring decoders in line.
    pub fn handle_events(&mut self) {
        let events = self.event_bus.poll();
        for event in events {
            trace!("Event: {}", (*event).type_name());

            // === Registry ===
            if let Some(e) = downcast_event::<AddCameraEvent>(&event) {
                self.add_camera(e);
                continue;
            }
            if let Some(e) = downcast_event::<RemoveCameraEvent>(&event) {
                if self.registry.remove(e.0).is_some() {
                    self.forget_removed();
                }
                continue;
            }
            if let Some(e) = downcast_event::<ImportCamerasEvent>(&event) {
                if let Err(err) = self.import_cameras(&e.0) {
                    self.error_msg = Some(format!("Import failed: {:#}", err));
                } else {
                    self.error_msg = None;
                }
                continue;
            }
            if let Some(e) = downcast_event::<ExportCamerasEvent>(&event) {
                if let Err(err) = self.export_cameras(&e.0) {
                    self.error_msg = Some(format!("Export failed: {:#}", err));
                }
                continue;
            }

            // === Drag reorder ===
            if let Some(e) = downcast_event::<DragStartedEvent>(&event) {
                debug!("Drag started at {}", e.0);
                self.view.begin_drag(e.0);
                continue;
            }
            if let Some(e) = downcast_event::<HoverCardEvent>(&event) {
                self.view.hover(e.0, &mut self.registry);
                continue;
            }
            if downcast_event::<DragEndedEvent>(&event).is_some() {
                self.view.end_drag();
                continue;
            }

            // === View ===
            if let Some(e) = downcast_event::<SetTagFilterEvent>(&event) {
                debug!("Tag filter: {}", e.0.label());
                self.view.set_filter(e.0.clone());
                self.settings.selected_tag = e.0.clone();
                continue;
            }
            if let Some(e) = downcast_event::<OpenFullscreenEvent>(&event) {
                if let Some(previous) = self.view.fullscreen() {
                    self.unmount_fullscreen(previous);
                }
                self.view.open_fullscreen(e.0);
                continue;
            }
            if downcast_event::<CloseFullscreenEvent>(&event).is_some() {
                if let Some(id) = self.view.fullscreen() {
                    self.unmount_fullscreen(id);
                }
                self.view.close_fullscreen();
                continue;
            }
            if downcast_event::<ToggleThemeEvent>(&event).is_some() {
                self.view.toggle_theme();
                self.settings.dark_mode = self.view.dark_mode;
                continue;
            }
            if downcast_event::<ToggleSettingsEvent>(&event).is_some() {
                self.show_settings = !self.show_settings;
                continue;
            }
            if let Some(e) = downcast_event::<RetryDecoderEvent>(&event) {
                self.decoders.retry(e.0);
                self.reconciled = None;
                continue;
            }

            debug!("Unhandled event: {}", (*event).type_name());
        }

        self.reconcile_decoders();
    }

    fn add_camera(&mut self, e: &AddCameraEvent) {
        match self.registry.add(&e.name, &e.url, parse_tags(&e.tags)) {
            Ok(_) => {
                self.form.clear();
                self.error_msg = None;
            }
            Err(RegistryError::Validation(v)) => {
                info!("Add camera rejected: {}", v);
                self.error_msg = Some(v.to_string());
            }
            Err(other) => self.error_msg = Some(other.to_string()),
        }
    }

    /// Drop view state that points at cameras or tags no longer in the registry.
    pub(super) fn forget_removed(&mut self) {
        self.view.sync_fullscreen(&self.registry);
        let registry = &self.registry;
        self.surfaces.retain_cameras(|id| registry.contains(id));
        self.textures.retain(|id| registry.contains(id.camera));
        // Filter on a tag nobody carries anymore falls back to All
        if let TagFilter::Tag(tag) = self.view.filter().clone()
            && !self.registry.all_tags().contains(&tag)
        {
            debug!("Tag '{}' gone, clearing filter", tag);
            self.view.set_filter(TagFilter::All);
            self.settings.selected_tag = TagFilter::All;
        }
    }

    fn unmount_fullscreen(&mut self, camera: crate::core::camera::CameraId) {
        let id = SurfaceId::fullscreen(camera);
        self.surfaces.unmount(&id);
        self.textures.forget(&id);
    }

    /// Reconcile when the registry or fullscreen target changed, or a surface is still pending.
    pub(super) fn reconcile_decoders(&mut self) {
        let key = (self.registry.revision(), self.view.fullscreen());
        if self.reconciled == Some(key) && !self.decoders.has_pending() {
            return;
        }

        let report = self
            .decoders
            .reconcile(self.registry.entries(), self.view.fullscreen(), &self.surfaces);
        if !report.created.is_empty() || !report.destroyed.is_empty() || !report.failed.is_empty() {
            debug!(
                "Reconciled decoders: +{} -{} failed {} pending {}",
                report.created.len(),
                report.destroyed.len(),
                report.failed.len(),
                report.pending.len()
            );
        }
        self.reconciled = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LaunchOptions;
    use crate::core::camera::TransportKind;
    use crate::core::registry::{CameraRegistry, TagFilter};
    use crate::core::store::MemoryStore;
    use crate::core::surface::SurfaceSlot;
    use crate::decoder::testing::FakeBackend;
    use crate::dialogs::prefs::AppSettings;

    fn app() -> (DashboardApp, FakeBackend) {
        let backend = FakeBackend::new();
        let registry = CameraRegistry::open(Box::new(MemoryStore::new()), TransportKind::Stream);
        let app = DashboardApp::new(
            AppSettings::default(),
            registry,
            Box::new(backend.clone()),
            LaunchOptions::default(),
        );
        (app, backend)
    }

    fn add(app: &mut DashboardApp, name: &str, url: &str, tags: &str) {
        app.event_bus.emit(AddCameraEvent {
            name: name.into(),
            url: url.into(),
            tags: tags.into(),
        });
        app.handle_events();
    }

    /// Mount every grid surface the way drawing the cards would.
    fn draw_grid(app: &mut DashboardApp) {
        let ids: Vec<_> = app.registry.entries().iter().map(|e| e.id()).collect();
        for id in ids {
            app.surfaces.mount(SurfaceId::grid(id));
        }
    }

    #[test]
    fn test_add_then_draw_creates_decoder() {
        let (mut app, backend) = app();
        add(&mut app, "Front Door", "rtsp://10.0.0.5/live", "door, outside");
        assert_eq!(app.registry.len(), 1);
        assert!(app.form.name.is_empty());
        assert!(app.error_msg.is_none());

        // Surface not drawn yet: pending, no decoder
        assert_eq!(backend.live(), 0);
        assert!(app.decoders.has_pending());

        draw_grid(&mut app);
        app.handle_events();
        assert_eq!(backend.live(), 1);
        assert_eq!(backend.created_sources(), ["rtsp://10.0.0.5/live"]);
    }

    #[test]
    fn test_invalid_add_shows_error_and_keeps_form() {
        let (mut app, _) = app();
        app.form.name = "Bad".into();
        app.form.url = "not a url".into();
        add(&mut app, "Bad", "not a url", "");
        assert!(app.registry.is_empty());
        assert_eq!(
            app.error_msg.as_deref(),
            Some("Invalid URL or IP. Please enter a valid IP, HTTP, or RTSP URL.")
        );
        assert_eq!(app.form.url, "not a url");

        add(&mut app, "", "rtsp://x", "");
        assert_eq!(app.error_msg.as_deref(), Some("Name and URL/IP cannot be empty."));
    }

    #[test]
    fn test_remove_tears_down_decoder_and_fullscreen() {
        let (mut app, backend) = app();
        add(&mut app, "Cam", "rtsp://cam/1", "");
        let id = app.registry.entries()[0].id();
        draw_grid(&mut app);
        app.event_bus.emit(OpenFullscreenEvent(id));
        app.handle_events();
        app.surfaces.mount(SurfaceId::fullscreen(id));
        app.handle_events();
        assert_eq!(backend.live(), 2);

        app.event_bus.emit(RemoveCameraEvent(id));
        app.handle_events();
        assert_eq!(backend.live(), 0);
        assert_eq!(app.view.fullscreen(), None);
        assert!(app.surfaces.is_empty());
    }

    #[test]
    fn test_close_fullscreen_keeps_grid_decoder() {
        let (mut app, backend) = app();
        add(&mut app, "Cam", "rtsp://cam/1", "");
        let id = app.registry.entries()[0].id();
        draw_grid(&mut app);
        app.handle_events();

        app.event_bus.emit(OpenFullscreenEvent(id));
        app.handle_events();
        app.surfaces.mount(SurfaceId::fullscreen(id));
        app.handle_events();
        assert_eq!(backend.live(), 2);

        app.event_bus.emit(CloseFullscreenEvent);
        app.handle_events();
        assert_eq!(backend.live(), 1);
        assert!(app.decoders.is_tracked(&SurfaceId::grid(id)));
        assert!(app.surfaces.get(&SurfaceId::fullscreen(id)).is_none());
    }

    #[test]
    fn test_embeddable_gets_no_decoder() {
        let (mut app, backend) = app();
        add(&mut app, "Web", "http://10.0.0.9/snap.jpg", "");
        draw_grid(&mut app);
        app.handle_events();
        assert_eq!(backend.live(), 0);
        assert!(!app.decoders.has_pending());
    }

    #[test]
    fn test_drag_under_filter_uses_registry_indices() {
        let (mut app, _) = app();
        add(&mut app, "A", "rtsp://a", "x");
        add(&mut app, "B", "rtsp://b", "");
        add(&mut app, "C", "rtsp://c", "x");

        app.event_bus.emit(SetTagFilterEvent(TagFilter::from("x")));
        // Visible cards are A (index 0) and C (index 2)
        app.event_bus.emit(DragStartedEvent(2));
        app.event_bus.emit(HoverCardEvent(0));
        app.event_bus.emit(DragEndedEvent);
        app.handle_events();

        let names: Vec<&str> = app.registry.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(app.settings.selected_tag, TagFilter::Tag("x".into()));
        assert!(!app.view.drag().is_dragging());
    }

    #[test]
    fn test_failed_decoder_waits_for_retry() {
        let (mut app, backend) = app();
        backend.fail_on("rtsp://broken/");
        add(&mut app, "Broken", "rtsp://broken/", "");
        let id = app.registry.entries()[0].id();
        draw_grid(&mut app);
        app.handle_events();
        assert!(app.decoders.failure(id, SurfaceSlot::Grid).is_some());

        // Unrelated change does not retry
        add(&mut app, "Other", "http://10.0.0.1/", "");
        assert!(app.decoders.failure(id, SurfaceSlot::Grid).is_some());
        assert_eq!(backend.live(), 0);

        backend.heal("rtsp://broken/");
        app.event_bus.emit(RetryDecoderEvent(id));
        app.handle_events();
        assert_eq!(backend.live(), 1);
    }

    #[test]
    fn test_filter_resets_when_last_tagged_camera_goes() {
        let (mut app, _) = app();
        add(&mut app, "A", "rtsp://a", "x");
        add(&mut app, "B", "rtsp://b", "x");
        let (a, b) = (app.registry.entries()[0].id(), app.registry.entries()[1].id());
        app.event_bus.emit(SetTagFilterEvent(TagFilter::from("x")));
        app.handle_events();

        app.event_bus.emit(RemoveCameraEvent(a));
        app.handle_events();
        assert_eq!(app.view.filter(), &TagFilter::Tag("x".into()));

        app.event_bus.emit(RemoveCameraEvent(b));
        app.handle_events();
        assert_eq!(app.view.filter(), &TagFilter::All);
        assert_eq!(app.settings.selected_tag, TagFilter::All);
    }

    #[test]
    fn test_theme_toggle_updates_settings() {
        let (mut app, _) = app();
        assert!(!app.settings.dark_mode);
        app.event_bus.emit(ToggleThemeEvent);
        app.event_bus.emit(ToggleSettingsEvent);
        app.handle_events();
        assert!(app.settings.dark_mode);
        assert!(app.show_settings);
    }
}
