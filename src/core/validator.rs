//! Source classification (admission gate).
//!
//! Order of checks:
//! 1. blank input is invalid
//! 2. `rtsp://` prefix is a stream, nothing after the prefix is checked
//! 3. bare dotted-quad (`1-3 digits` x4, no range check) is valid, kind from policy
//! 4. anything else must parse as a URL and is embeddable

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::camera::TransportKind;

/// Scheme prefix of sources that are decoded client-side.
pub const STREAM_PREFIX: &str = "rtsp://";

static DOTTED_QUAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}(\.[0-9]{1,3}){3}$").expect("Invalid dotted-quad regex")
});

/// Result of classifying a candidate source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub valid: bool,
    /// `None` when invalid.
    pub kind: Option<TransportKind>,
}

impl Classification {
    fn valid(kind: TransportKind) -> Self {
        Self { valid: true, kind: Some(kind) }
    }

    fn invalid() -> Self {
        Self { valid: false, kind: None }
    }
}

/// True for four dot-separated groups of 1-3 ASCII digits.
pub fn is_dotted_quad(candidate: &str) -> bool {
    DOTTED_QUAD.is_match(candidate)
}

/// True when `candidate` starts with the stream prefix (scheme is case-insensitive).
pub fn has_stream_prefix(candidate: &str) -> bool {
    candidate
        .get(..STREAM_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(STREAM_PREFIX))
}

/// Classify a candidate source.
///
/// `bare_ip` decides the transport of a scheme-less dotted-quad.
pub fn classify(candidate: &str, bare_ip: TransportKind) -> Classification {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Classification::invalid();
    }

    if has_stream_prefix(candidate) {
        return Classification::valid(TransportKind::Stream);
    }

    if is_dotted_quad(candidate) {
        return Classification::valid(bare_ip);
    }

    match Url::parse(candidate) {
        Ok(_) => Classification::valid(TransportKind::Embeddable),
        Err(_) => Classification::invalid(),
    }
}
