//! Liveness endpoint for the dashboard.
//!
//! # Endpoints
//!
//! | Method | Path | Description                                  |
//! |--------|------|----------------------------------------------|
//! | GET    | `/`  | Plain-text liveness string                   |
//! | *      | *    | 404 with a JSON error body                   |
//!
//! Every response carries `Access-Control-Allow-Origin: *`. The server runs
//! on its own thread and shares no state with the UI.

mod health;

pub use health::{DEFAULT_PORT, HealthServer, LIVENESS_TEXT};
