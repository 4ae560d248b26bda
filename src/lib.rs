//! Local IP TV - camera wall library
//!
//! Re-exports all modules for use by the binary target.

// Core (registry, persistence, decoder lifecycle, view state)
pub mod core;
pub mod decoder;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod server;
pub mod widgets;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, downcast_event};
pub use core::{CameraEntry, CameraId, CameraRegistry, DecoderManager, TransportKind};
