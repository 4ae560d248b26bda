//! Stream decoders.
//!
//! The decoder manager sees decoders only through two operations:
//! construct bound to a surface, and destroy. Decoding itself runs off the
//! UI thread and reports progress through [`DecoderStatus`].

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegBackend;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::core::surface::FrameSurface;

/// Stream could not be initialised or played (DecoderFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    #[error("cannot open stream: {0}")]
    Open(String),
    #[error("no video stream found")]
    NoVideoStream,
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("cannot start decoder thread: {0}")]
    Spawn(String),
    #[error("stream decoding is not available in this build")]
    Unavailable,
}

/// Lifecycle of one decoder instance as seen from the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecoderStatus {
    #[default]
    Connecting,
    Playing,
    /// Source ended.
    Ended,
    Failed(DecoderError),
}

impl DecoderStatus {
    /// Decoder is done (failed or source ended) and can only come back through a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DecoderStatus::Ended | DecoderStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&DecoderError> {
        match self {
            DecoderStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Status cell shared between a decoder thread and its handle.
#[derive(Debug, Clone, Default)]
pub struct SharedStatus(Arc<Mutex<DecoderStatus>>);

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> DecoderStatus {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, status: DecoderStatus) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }
}

/// Opaque live decoder bound to one surface.
pub trait DecoderInstance: Send {
    fn status(&self) -> DecoderStatus;

    /// Release the decoder. Must not block on in-flight initialisation;
    /// a decoder still opening its source shuts down as soon as it returns.
    fn destroy(self: Box<Self>);
}

/// Factory for decoder instances.
pub trait DecoderBackend {
    fn construct(
        &self,
        source: &str,
        surface: FrameSurface,
    ) -> Result<Box<dyn DecoderInstance>, DecoderError>;
}

/// Backend used when the build has no stream decoding support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl DecoderBackend for UnavailableBackend {
    fn construct(
        &self,
        _source: &str,
        _surface: FrameSurface,
    ) -> Result<Box<dyn DecoderInstance>, DecoderError> {
        Err(DecoderError::Unavailable)
    }
}

/// Backend selected at compile time.
pub fn default_backend() -> Box<dyn DecoderBackend> {
    #[cfg(feature = "ffmpeg")]
    {
        Box::new(FfmpegBackend::new())
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        Box::new(UnavailableBackend)
    }
}

/// Backend name for the version string and logs.
pub const BACKEND_NAME: &str = if cfg!(feature = "ffmpeg") {
    "playa-ffmpeg 8.0"
} else {
    "none"
};
