//! Application module - DashboardApp and related functionality.
//!
//! - `events` - event bus dispatch and decoder reconciliation
//! - `io` - camera list import/export
//! - `run` - eframe::App implementation

mod events;
mod io;
mod run;

use log::info;

use crate::core::camera::CameraId;
use crate::core::decoders::DecoderManager;
use crate::core::event_bus::EventBus;
use crate::core::registry::CameraRegistry;
use crate::core::surface::SurfaceMap;
use crate::core::view::ViewState;
use crate::decoder::DecoderBackend;
use crate::dialogs::prefs::AppSettings;
use crate::widgets::SurfaceTextures;
use crate::widgets::toolbar::AddForm;

/// Startup choices that come from the command line rather than saved settings.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Start the health endpoint (saved setting unless `--no-server`).
    pub health_enabled: bool,
    pub health_port: u16,
    pub fullscreen: bool,
}

/// Main application state.
pub struct DashboardApp {
    /// Persisted via eframe storage under `APP_KEY`.
    pub settings: AppSettings,
    pub registry: CameraRegistry,
    pub decoders: DecoderManager,
    pub surfaces: SurfaceMap,
    pub textures: SurfaceTextures,
    pub view: ViewState,
    pub event_bus: EventBus,
    pub form: AddForm,
    pub error_msg: Option<String>,
    pub show_settings: bool,
    pub launch: LaunchOptions,
    /// (registry revision, fullscreen target) at the last reconciliation.
    reconciled: Option<(u64, Option<CameraId>)>,
    health_started: bool,
    window_fullscreen_applied: bool,
    last_snapshot_refresh: f64,
}

impl DashboardApp {
    pub fn new(
        settings: AppSettings,
        mut registry: CameraRegistry,
        backend: Box<dyn DecoderBackend>,
        launch: LaunchOptions,
    ) -> Self {
        registry.set_bare_ip_transport(settings.bare_ip_transport);
        let view = ViewState::new(settings.dark_mode, settings.selected_tag.clone());
        info!(
            "Dashboard ready: {} camera(s), bare IP as {}",
            registry.len(),
            settings.bare_ip_transport
        );

        Self {
            settings,
            registry,
            decoders: DecoderManager::new(backend),
            surfaces: SurfaceMap::new(),
            textures: SurfaceTextures::new(),
            view,
            event_bus: EventBus::new(),
            form: AddForm::default(),
            error_msg: None,
            show_settings: false,
            launch,
            reconciled: None,
            health_started: false,
            window_fullscreen_applied: false,
            last_snapshot_refresh: 0.0,
        }
    }

    /// Keep the registry's bare-IP policy in line with settings.
    fn apply_settings(&mut self) {
        if self.registry.bare_ip_transport() != self.settings.bare_ip_transport {
            self.registry.set_bare_ip_transport(self.settings.bare_ip_transport);
        }
        self.view.dark_mode = self.settings.dark_mode;
    }

    /// Start the health endpoint once, if enabled.
    fn start_health_server(&mut self) {
        if self.health_started {
            return;
        }
        self.health_started = true;

        if !self.launch.health_enabled {
            info!("Health endpoint disabled");
            return;
        }
        if let Err(e) = crate::server::HealthServer::start(self.launch.health_port) {
            log::error!("Failed to start health endpoint thread: {}", e);
        }
    }
}
