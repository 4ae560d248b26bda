//! Camera entry: the unit of registration.
//!
//! An entry is created only through the validated add path of
//! [`CameraRegistry`](super::registry::CameraRegistry) and is never edited in
//! place. Changing a camera means remove-then-add.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque camera identifier.
///
/// Sole correlation key between the registry, the decoder manager and the
/// frame surfaces (`canvas-<id>` / `fullscreen-<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(Uuid);

impl CameraId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CameraId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CameraId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a source is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Raw video stream, decoded client-side into a frame surface.
    #[default]
    Stream,
    /// Anything the host can show directly (HTTP image / page).
    Embeddable,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Stream => "stream",
            TransportKind::Embeddable => "embeddable",
        }
    }

    pub fn needs_decoder(&self) -> bool {
        matches!(self, TransportKind::Stream)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational status. Not transitioned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraStatus::Active => f.write_str("active"),
            CameraStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// One registered camera source and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraEntry {
    id: CameraId,
    name: String,
    url: String,
    transport_kind: TransportKind,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    status: CameraStatus,
}

impl CameraEntry {
    /// Build an entry from already-validated parts.
    pub(crate) fn new(
        id: CameraId,
        name: impl Into<String>,
        url: impl Into<String>,
        transport_kind: TransportKind,
        tags: BTreeSet<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            transport_kind,
            tags,
            status: CameraStatus::Active,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport_kind
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    pub fn is_stream(&self) -> bool {
        self.transport_kind.needs_decoder()
    }

    /// Source handed to the decoder.
    ///
    /// A bare dotted-quad classified as a stream has no scheme, so it is
    /// addressed as `rtsp://<ip>/`. The stored url is left untouched.
    pub fn stream_source(&self) -> String {
        if super::validator::is_dotted_quad(&self.url) {
            format!("rtsp://{}/", self.url)
        } else {
            self.url.clone()
        }
    }

    /// Address used to display an embeddable source (`http://<ip>/` for a bare IP).
    pub fn embed_source(&self) -> String {
        if super::validator::is_dotted_quad(&self.url) {
            format!("http://{}/", self.url)
        } else {
            self.url.clone()
        }
    }

    /// Tags joined for display, e.g. `door, outside`.
    pub fn tags_label(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Split a comma-separated tag field into a tag set.
///
/// Tags are trimmed, blanks dropped and duplicates collapsed.
pub fn parse_tags(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_and_collapses() {
        let tags = parse_tags(" door, outside ,door,, ");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("door"));
        assert!(tags.contains("outside"));
    }

    #[test]
    fn test_parse_tags_empty() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_stream_source_for_bare_ip() {
        let entry = CameraEntry::new(
            CameraId::new(),
            "Lobby",
            "192.168.1.20",
            TransportKind::Stream,
            BTreeSet::new(),
        );
        assert_eq!(entry.stream_source(), "rtsp://192.168.1.20/");
        assert_eq!(entry.embed_source(), "http://192.168.1.20/");
        assert_eq!(entry.url(), "192.168.1.20");
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = CameraEntry::new(
            CameraId::new(),
            "Front Door",
            "rtsp://192.168.1.10/stream",
            TransportKind::Stream,
            parse_tags("door"),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["transportKind"], "stream");
        assert_eq!(json["status"], "active");
        assert_eq!(json["tags"][0], "door");
        assert!(json["id"].is_string());
    }
}
