use ipwall::app::{DashboardApp, LaunchOptions};
use ipwall::cli::Args;
use ipwall::config;
use ipwall::core::{CameraRegistry, FileStore, TransportKind};
use ipwall::decoder;
use ipwall::dialogs::prefs::AppSettings;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::{debug, error, info, warn};

fn main() -> anyhow::Result<()> {
    // Initialize FFmpeg
    #[cfg(feature = "ffmpeg")]
    playa_ffmpeg::init().context("Failed to initialize FFmpeg")?;

    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file("ipwall.log", &path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("rouille", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .filter_module("rouille", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .init();
    }

    info!("Local IP TV starting ({} decoder)...", decoder::BACKEND_NAME);
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file("ipwall.json", &path_config);
    let data_dir = config::data_dir(&path_config);
    info!("Config path: {}", settings_path.display());
    info!("Data path: {}", data_dir.display());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Local IP TV v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 800.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(settings_path),
        ..Default::default()
    };

    let import = args.import.clone();
    let cli_bare_ip = args.bare_ip.map(TransportKind::from);

    eframe::run_native(
        "Local IP TV",
        native_options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            // Load persisted settings if available, otherwise defaults
            let mut settings: AppSettings = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted settings found, using defaults");
                    AppSettings::default()
                });
            if let Some(kind) = cli_bare_ip {
                settings.bare_ip_transport = kind;
            }

            let registry = CameraRegistry::open(
                Box::new(FileStore::new(data_dir)),
                settings.bare_ip_transport,
            );

            let launch = LaunchOptions {
                health_enabled: settings.health_server_enabled && !args.no_server,
                health_port: args.port.unwrap_or_else(|| settings.health_port()),
                fullscreen: args.fullscreen,
            };

            let mut app = DashboardApp::new(settings, registry, decoder::default_backend(), launch);

            if let Some(path) = import {
                match app.import_cameras(&path) {
                    Ok(count) => info!("Startup import: {} camera(s)", count),
                    Err(e) => {
                        error!("Startup import failed: {:#}", e);
                        app.error_msg = Some(format!("Import failed: {:#}", e));
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
    .map_err(|e| {
        warn!("eframe exited with error: {}", e);
        anyhow::anyhow!("{}", e)
    })
}
