use eframe::egui;

use crate::core::registry::TagFilter;
use crate::core::TransportKind;
use crate::server::DEFAULT_PORT;

/// Settings categories
#[derive(Debug, Clone, Copy, PartialEq)]
enum SettingsCategory {
    Cameras,
    UI,
    WebServer,
}

impl SettingsCategory {
    const ALL: [SettingsCategory; 3] = [
        SettingsCategory::Cameras,
        SettingsCategory::UI,
        SettingsCategory::WebServer,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::Cameras => "Cameras",
            SettingsCategory::UI => "UI",
            SettingsCategory::WebServer => "Web Server",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Application settings
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AppSettings {
    // UI
    pub dark_mode: bool,
    pub font_size: f32,
    pub card_width: f32, // Grid column width in px

    // Cameras
    pub bare_ip_transport: TransportKind,
    pub snapshot_refresh_secs: f32, // Re-fetch interval for embeddable previews (0 = never)
    pub selected_tag: TagFilter,

    // Internal
    pub selected_settings_category: Option<String>,

    // Health endpoint
    pub health_server_enabled: bool,
    pub health_server_port: Option<u16>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            font_size: 14.0,
            card_width: 320.0,
            bare_ip_transport: TransportKind::Stream,
            snapshot_refresh_secs: 2.0,
            selected_tag: TagFilter::All,
            selected_settings_category: Some("Cameras".to_string()),
            health_server_enabled: true,
            health_server_port: Some(DEFAULT_PORT),
        }
    }
}

impl AppSettings {
    pub fn health_port(&self) -> u16 {
        self.health_server_port.unwrap_or(DEFAULT_PORT)
    }
}

/// Render Cameras settings category
fn render_camera_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Sources");
    ui.add_space(8.0);

    ui.label("Bare IP addresses are shown as:");
    ui.horizontal(|ui| {
        ui.radio_value(&mut settings.bare_ip_transport, TransportKind::Stream, "RTSP stream");
        ui.radio_value(&mut settings.bare_ip_transport, TransportKind::Embeddable, "HTTP page");
    });
    ui.label("Applies to cameras added from now on. Existing cameras keep their transport.");
    ui.add_space(16.0);

    ui.label("Snapshot refresh (embeddable sources):");
    ui.add(
        egui::Slider::new(&mut settings.snapshot_refresh_secs, 0.0..=30.0)
            .suffix(" s")
            .step_by(0.5),
    );
    ui.label("0 = load once.");
}

/// Render UI settings category
fn render_ui_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Appearance");
    ui.add_space(8.0);

    ui.label("Font Size:");
    ui.add(
        egui::Slider::new(&mut settings.font_size, 10.0..=20.0)
            .suffix(" px")
            .step_by(0.5),
    );
    ui.add_space(8.0);

    ui.label("Card Width:");
    ui.add(
        egui::Slider::new(&mut settings.card_width, 200.0..=640.0)
            .suffix(" px")
            .step_by(10.0),
    );
    ui.add_space(16.0);

    ui.checkbox(&mut settings.dark_mode, "Dark Mode");
}

/// Render Web Server settings category
fn render_webserver_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Health Endpoint");
    ui.add_space(8.0);

    ui.checkbox(&mut settings.health_server_enabled, "Enable health endpoint");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("Port:");
        let mut port = settings.health_port() as i32;
        if ui.add(egui::DragValue::new(&mut port).range(1024..=65535)).changed() {
            settings.health_server_port = Some(port as u16);
        }
    });
    ui.add_space(12.0);

    if settings.health_server_enabled {
        ui.separator();
        ui.add_space(8.0);
        ui.label("Server URL:");
        ui.monospace(format!("http://0.0.0.0:{}/", settings.health_port()));
        ui.label("Port changes take effect on next launch.");
    } else {
        ui.add_space(8.0);
        ui.label("Enable to start the endpoint on next launch.");
    }
}

/// Render settings window
pub fn render_settings_window(ctx: &egui::Context, show_settings: &mut bool, settings: &mut AppSettings) {
    let mut selected = settings
        .selected_settings_category
        .as_deref()
        .and_then(SettingsCategory::from_str)
        .unwrap_or(SettingsCategory::Cameras);

    egui::Window::new("Settings")
        .id(egui::Id::new("settings_window"))
        .open(show_settings)
        .default_size([560.0, 360.0])
        .resizable(true)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(140.0);
                    for category in SettingsCategory::ALL {
                        if ui
                            .selectable_label(selected == category, category.as_str())
                            .clicked()
                        {
                            selected = category;
                        }
                    }
                });

                ui.separator();

                ui.vertical(|ui| match selected {
                    SettingsCategory::Cameras => render_camera_settings(ui, settings),
                    SettingsCategory::UI => render_ui_settings(ui, settings),
                    SettingsCategory::WebServer => render_webserver_settings(ui, settings),
                });
            });
        });

    settings.selected_settings_category = Some(selected.as_str().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.bare_ip_transport, TransportKind::Stream);
        assert_eq!(settings.health_port(), 5000);
        assert!(settings.health_server_enabled);
        assert_eq!(settings.selected_tag, TagFilter::All);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"dark_mode": true, "bare_ip_transport": "embeddable"}"#).unwrap();
        assert!(settings.dark_mode);
        assert_eq!(settings.bare_ip_transport, TransportKind::Embeddable);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.health_port(), 5000);
    }

    #[test]
    fn test_category_names_roundtrip() {
        for category in SettingsCategory::ALL {
            assert_eq!(SettingsCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(SettingsCategory::from_str("Gizmo"), None);
    }
}
