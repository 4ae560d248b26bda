//! Modal windows shown over the camera wall.

pub mod prefs;
