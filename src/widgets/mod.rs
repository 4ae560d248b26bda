//! UI widgets for the camera wall.
//!
//! Widgets never touch the registry. They collect events in an
//! [`ActionQueue`] which the app forwards to the event bus.

pub mod actions;
pub mod card;
pub mod fullscreen;
pub mod grid;
pub mod surface_view;
pub mod toolbar;

pub use actions::ActionQueue;
pub use surface_view::SurfaceTextures;
