//! Dashboard core: camera registry, persistence, decoder lifecycle and view state.
//!
//! Nothing in here depends on egui; widgets talk to it through events.

pub mod camera;
pub mod camera_events;
pub mod decoders;
pub mod event_bus;
pub mod registry;
pub mod store;
pub mod surface;
pub mod validator;
pub mod view;

pub use camera::{CameraEntry, CameraId, CameraStatus, TransportKind};
pub use decoders::{DecoderManager, ReconcileReport};
pub use event_bus::EventBus;
pub use registry::{CameraRegistry, RegistryError, TagFilter, ValidationError};
pub use store::{CameraStore, FileStore, MemoryStore, PersistenceError};
pub use surface::{FrameSurface, SurfaceId, SurfaceMap, SurfaceSlot};
pub use view::ViewState;
