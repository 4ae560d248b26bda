//! Camera registry: the ordered list of cameras and the only place it changes.
//!
//! Every mutation is write-through: the snapshot is persisted before the
//! mutating call returns. A failed write is logged and absorbed, the
//! in-memory list stays authoritative for the session.
//!
//! `revision()` increases on every change so observers (decoder
//! reconciliation, UI) can tell when to react.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};
use thiserror::Error;

use super::camera::{CameraEntry, CameraId, TransportKind};
use super::store::{self, CameraStore, PersistenceError};
use super::validator;

/// Sentinel filter value that selects every camera.
pub const ALL_TAGS: &str = "All";

/// Add-form rejection. Never mutates the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name and URL/IP cannot be empty.")]
    EmptyField,
    #[error("Invalid URL or IP. Please enter a valid IP, HTTP, or RTSP URL.")]
    InvalidSource(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("move {from} -> {to} out of range (len {len})")]
    IndexOutOfRange { from: usize, to: usize, len: usize },
}

/// Tag filter driving which cameras are shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    pub fn matches(&self, entry: &CameraEntry) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(tag) => entry.has_tag(tag),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TagFilter::All => ALL_TAGS,
            TagFilter::Tag(tag) => tag,
        }
    }
}

impl From<&str> for TagFilter {
    fn from(value: &str) -> Self {
        if value == ALL_TAGS {
            TagFilter::All
        } else {
            TagFilter::Tag(value.to_string())
        }
    }
}

/// Ordered camera list with write-through persistence.
pub struct CameraRegistry {
    entries: Vec<CameraEntry>,
    store: Box<dyn CameraStore>,
    bare_ip: TransportKind,
    revision: u64,
    last_persist_error: Option<String>,
}

impl std::fmt::Debug for CameraRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRegistry")
            .field("entries", &self.entries.len())
            .field("bare_ip", &self.bare_ip)
            .field("revision", &self.revision)
            .finish()
    }
}

impl CameraRegistry {
    /// Open the registry, loading the saved snapshot (startup load).
    pub fn open(store: Box<dyn CameraStore>, bare_ip: TransportKind) -> Self {
        let entries = dedup_ids(store::load_entries(store.as_ref()));
        info!("Camera registry loaded: {} camera(s)", entries.len());
        Self {
            entries,
            store,
            bare_ip,
            revision: 0,
            last_persist_error: None,
        }
    }

    // === Queries ===

    pub fn entries(&self) -> &[CameraEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: CameraId) -> Option<&CameraEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn index_of(&self, id: CameraId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn contains(&self, id: CameraId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bare_ip_transport(&self) -> TransportKind {
        self.bare_ip
    }

    /// Policy for new bare-IP entries. Existing entries keep their kind.
    pub fn set_bare_ip_transport(&mut self, kind: TransportKind) {
        self.bare_ip = kind;
    }

    /// Message of the last failed write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Entries matching `filter`, in registry order. Never reorders.
    pub fn filter<'a>(&'a self, filter: &'a TagFilter) -> impl Iterator<Item = &'a CameraEntry> + 'a {
        self.entries.iter().filter(move |e| filter.matches(e))
    }

    /// Same as [`filter`](Self::filter) but keeps each entry's registry index.
    pub fn filter_indexed<'a>(
        &'a self,
        filter: &'a TagFilter,
    ) -> impl Iterator<Item = (usize, &'a CameraEntry)> + 'a {
        self.entries.iter().enumerate().filter(move |(_, e)| filter.matches(e))
    }

    /// Every distinct tag, sorted.
    pub fn all_tags(&self) -> BTreeSet<String> {
        self.entries.iter().flat_map(|e| e.tags().iter().cloned()).collect()
    }

    // === Mutations ===

    /// Validate and append a camera.
    ///
    /// Name and url are trimmed before the checks. On success the entry gets
    /// a fresh id, is appended at the end and the registry is persisted.
    pub fn add(
        &mut self,
        name: &str,
        url: &str,
        tags: BTreeSet<String>,
    ) -> Result<CameraEntry, RegistryError> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(ValidationError::EmptyField.into());
        }

        let classification = validator::classify(url, self.bare_ip);
        let Some(kind) = classification.kind.filter(|_| classification.valid) else {
            return Err(ValidationError::InvalidSource(url.to_string()).into());
        };

        let id = self.fresh_id();
        let entry = CameraEntry::new(id, name, url, kind, tags);
        self.entries.push(entry.clone());
        info!("Added camera '{}' ({}, {}) as {}", entry.name(), entry.url(), kind, id);
        self.changed();
        Ok(entry)
    }

    /// Remove by id. A miss is a no-op and does not persist.
    pub fn remove(&mut self, id: CameraId) -> Option<CameraEntry> {
        let index = self.index_of(id)?;
        let entry = self.entries.remove(index);
        info!("Removed camera '{}' ({})", entry.name(), id);
        self.changed();
        Some(entry)
    }

    /// Relocate the entry at `from` to `to` (splice, not swap).
    ///
    /// Entries between the two positions shift by one. Out-of-range indices
    /// leave the registry untouched and return an error.
    pub fn move_camera(&mut self, from: usize, to: usize) -> Result<(), RegistryError> {
        let len = self.entries.len();
        if from >= len || to >= len {
            warn!("Ignoring camera move {} -> {} (len {})", from, to, len);
            return Err(RegistryError::IndexOutOfRange { from, to, len });
        }
        if from == to {
            return Ok(());
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        debug!("Moved camera {} -> {}", from, to);
        self.changed();
        Ok(())
    }

    /// Replace the whole list (import). Duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, entries: Vec<CameraEntry>) {
        self.entries = dedup_ids(entries);
        info!("Camera registry replaced: {} camera(s)", self.entries.len());
        self.changed();
    }

    /// Persist the current list. Errors are recorded, never propagated.
    pub fn save(&mut self) {
        match self.try_save() {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                warn!("Failed to persist cameras (continuing in memory): {}", e);
                self.last_persist_error = Some(e.to_string());
            }
        }
    }

    fn try_save(&mut self) -> Result<(), PersistenceError> {
        store::save_entries(self.store.as_mut(), &self.entries)
    }

    fn changed(&mut self) {
        self.revision += 1;
        self.save();
    }

    fn fresh_id(&self) -> CameraId {
        loop {
            let id = CameraId::new();
            if !self.contains(id) {
                return id;
            }
        }
    }
}

fn dedup_ids(entries: Vec<CameraEntry>) -> Vec<CameraEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let before = entries.len();
    let kept: Vec<CameraEntry> = entries.into_iter().filter(|e| seen.insert(e.id())).collect();
    if kept.len() != before {
        warn!("Dropped {} camera(s) with duplicate ids", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::parse_tags;
    use crate::core::store::{load_entries, MemoryStore, CAMERAS_KEY};
    use std::sync::{Arc, Mutex};

    /// Store sharing its contents with the test so persisted state can be inspected.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl CameraStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.0.lock().unwrap().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            self.0.lock().unwrap().set(key, value)
        }
    }

    fn registry() -> (CameraRegistry, SharedStore) {
        let store = SharedStore::default();
        let reg = CameraRegistry::open(Box::new(store.clone()), TransportKind::Stream);
        (reg, store)
    }

    fn persisted(store: &SharedStore) -> Vec<CameraEntry> {
        load_entries(&*store.0.lock().unwrap())
    }

    fn names(reg: &CameraRegistry) -> Vec<&str> {
        reg.entries().iter().map(|e| e.name()).collect()
    }

    fn filled(n: usize) -> (CameraRegistry, SharedStore) {
        let (mut reg, store) = registry();
        for i in 0..n {
            reg.add(&format!("cam{i}"), &format!("rtsp://10.0.0.{i}/live"), BTreeSet::new())
                .unwrap();
        }
        (reg, store)
    }

    #[test]
    fn test_add_valid_sources() {
        let (mut reg, store) = registry();
        for (i, url) in ["192.168.1.20", "rtsp://cam/1", "http://cam.local/snap.jpg"]
            .iter()
            .enumerate()
        {
            reg.add("cam", url, BTreeSet::new()).unwrap();
            assert_eq!(reg.len(), i + 1);
        }
        assert_eq!(persisted(&store), reg.entries());
    }

    #[test]
    fn test_add_stream_scenario() {
        let (mut reg, _) = registry();
        let entry = reg
            .add("Front Door", "rtsp://192.168.1.10/stream", parse_tags("door"))
            .unwrap();
        assert_eq!(entry.transport_kind(), TransportKind::Stream);
        assert_eq!(reg.entries(), &[entry]);
    }

    #[test]
    fn test_add_trims_name_and_url() {
        let (mut reg, store) = registry();
        let entry = reg.add("  Front Door ", "  rtsp://cam/1\t", BTreeSet::new()).unwrap();
        assert_eq!(entry.name(), "Front Door");
        assert_eq!(entry.url(), "rtsp://cam/1");
        assert_eq!(persisted(&store)[0].url(), "rtsp://cam/1");
    }

    #[test]
    fn test_add_bare_ip_uses_policy() {
        let (mut reg, _) = registry();
        let lobby = reg.add("Lobby", "192.168.1.20", BTreeSet::new()).unwrap();
        assert_eq!(lobby.transport_kind(), TransportKind::Stream);

        reg.set_bare_ip_transport(TransportKind::Embeddable);
        let hall = reg.add("Hall", "192.168.1.21", BTreeSet::new()).unwrap();
        assert_eq!(hall.transport_kind(), TransportKind::Embeddable);
        // Existing entry keeps its kind
        assert_eq!(reg.get(lobby.id()).unwrap().transport_kind(), TransportKind::Stream);
    }

    #[test]
    fn test_add_blank_fields_rejected() {
        let (mut reg, store) = filled(1);
        let before = persisted(&store);
        for (name, url) in [("", "rtsp://x"), ("cam", ""), ("  ", "rtsp://x"), ("cam", " \t ")] {
            let err = reg.add(name, url, BTreeSet::new()).unwrap_err();
            assert_eq!(err, RegistryError::Validation(ValidationError::EmptyField));
            assert_eq!(reg.len(), 1);
        }
        assert_eq!(persisted(&store), before);
    }

    #[test]
    fn test_add_invalid_source_rejected() {
        let (mut reg, _) = registry();
        let rev = reg.revision();
        let err = reg.add("Bad", "not a url", BTreeSet::new()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::InvalidSource(_))
        ));
        assert_eq!(
            err.to_string(),
            "Invalid URL or IP. Please enter a valid IP, HTTP, or RTSP URL."
        );
        assert!(reg.is_empty());
        assert_eq!(reg.revision(), rev);
    }

    #[test]
    fn test_ids_unique() {
        let (reg, _) = filled(50);
        let ids: HashSet<_> = reg.entries().iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut reg, store) = filled(3);
        let id = reg.entries()[1].id();
        assert!(reg.remove(id).is_some());
        assert_eq!(reg.len(), 2);
        let rev = reg.revision();
        assert!(reg.remove(id).is_none());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.revision(), rev);
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn test_move_camera_splices_forward() {
        let (mut reg, _) = filled(5);
        reg.move_camera(0, 3).unwrap();
        assert_eq!(names(&reg), ["cam1", "cam2", "cam3", "cam0", "cam4"]);
    }

    #[test]
    fn test_move_camera_splices_backward() {
        let (mut reg, _) = filled(5);
        reg.move_camera(4, 1).unwrap();
        assert_eq!(names(&reg), ["cam0", "cam4", "cam1", "cam2", "cam3"]);
    }

    #[test]
    fn test_move_camera_preserves_entries() {
        let (mut reg, store) = filled(6);
        let mut before = reg.entries().to_vec();
        for (from, to) in [(0, 5), (5, 0), (2, 3), (3, 1), (4, 2)] {
            reg.move_camera(from, to).unwrap();
        }
        let mut after = reg.entries().to_vec();
        before.sort_by_key(|e| e.id());
        after.sort_by_key(|e| e.id());
        assert_eq!(before, after);
        assert_eq!(persisted(&store), reg.entries());
    }

    #[test]
    fn test_move_camera_out_of_range_is_noop() {
        let (mut reg, _) = filled(3);
        let before = reg.entries().to_vec();
        let err = reg.move_camera(1, 3).unwrap_err();
        assert_eq!(err, RegistryError::IndexOutOfRange { from: 1, to: 3, len: 3 });
        assert!(reg.move_camera(7, 0).is_err());
        assert_eq!(reg.entries(), before.as_slice());
    }

    #[test]
    fn test_filter_all_and_tag() {
        let (mut reg, _) = registry();
        reg.add("a", "rtsp://a", parse_tags("outside")).unwrap();
        reg.add("b", "rtsp://b", parse_tags("inside")).unwrap();
        reg.add("c", "rtsp://c", parse_tags("outside, door")).unwrap();

        let all: Vec<_> = reg.filter(&TagFilter::All).map(|e| e.name()).collect();
        assert_eq!(all, ["a", "b", "c"]);

        let outside = TagFilter::from("outside");
        let only: Vec<_> = reg.filter(&outside).map(|e| e.name()).collect();
        assert_eq!(only, ["a", "c"]);

        let indexed: Vec<_> = reg.filter_indexed(&outside).map(|(i, _)| i).collect();
        assert_eq!(indexed, [0, 2]);

        assert_eq!(TagFilter::from("All"), TagFilter::All);
        assert_eq!(reg.filter(&TagFilter::from("missing")).count(), 0);
        assert_eq!(names(&reg), ["a", "b", "c"]);
    }

    #[test]
    fn test_all_tags_sorted() {
        let (mut reg, _) = registry();
        reg.add("a", "rtsp://a", parse_tags("zeta,alpha")).unwrap();
        reg.add("b", "rtsp://b", parse_tags("alpha,mid")).unwrap();
        let tags: Vec<_> = reg.all_tags().into_iter().collect();
        assert_eq!(tags, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_round_trip_through_store() {
        let (mut reg, store) = registry();
        reg.add("Front Door", "rtsp://192.168.1.10/stream", parse_tags("door")).unwrap();
        reg.add("Lobby", "192.168.1.20", BTreeSet::new()).unwrap();
        reg.add("Yard", "https://yard.example/cam.jpg", parse_tags("outside")).unwrap();
        reg.move_camera(2, 0).unwrap();

        let reopened = CameraRegistry::open(Box::new(store.clone()), TransportKind::Embeddable);
        assert_eq!(reopened.entries(), reg.entries());
    }

    #[test]
    fn test_persistence_failure_is_absorbed() {
        let mut reg = CameraRegistry::open(Box::new(MemoryStore::failing()), TransportKind::Stream);
        let entry = reg.add("cam", "rtsp://cam", BTreeSet::new()).unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.last_persist_error().is_some());
        assert!(reg.remove(entry.id()).is_some());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let (mut src, _) = filled(2);
        let dup = src.entries()[0].clone();
        let mut entries = src.entries().to_vec();
        entries.push(dup);
        let json = store::encode_entries(&entries).unwrap();

        let reg = CameraRegistry::open(
            Box::new(MemoryStore::with_value(CAMERAS_KEY, &json)),
            TransportKind::Stream,
        );
        assert_eq!(reg.len(), 2);

        src.replace_all(entries);
        assert_eq!(src.len(), 2);
    }
}
