//! Camera list import/export (JSON array, same shape as the saved store).

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::DashboardApp;
use crate::core::store;

impl DashboardApp {
    /// Replace the registry with the cameras in `path`.
    ///
    /// The file is fully parsed before anything changes; a bad file leaves
    /// the current list untouched. View state tied to dropped cameras or
    /// tags is reset.
    pub fn import_cameras(&mut self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let entries = store::decode_entries(&json)
            .with_context(|| format!("{} is not a camera list", path.display()))?;
        self.registry.replace_all(entries);
        self.forget_removed();
        info!("Imported {} camera(s) from {}", self.registry.len(), path.display());
        Ok(self.registry.len())
    }

    /// Write the current list to `path`.
    pub fn export_cameras(&self, path: &Path) -> Result<()> {
        let json = store::encode_entries(self.registry.entries())?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Exported {} camera(s) to {}", self.registry.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{DashboardApp, LaunchOptions};
    use crate::core::camera::{parse_tags, TransportKind};
    use crate::core::registry::{CameraRegistry, TagFilter};
    use crate::core::store::MemoryStore;
    use crate::decoder::UnavailableBackend;
    use crate::dialogs::prefs::AppSettings;

    fn app() -> DashboardApp {
        let registry = CameraRegistry::open(Box::new(MemoryStore::new()), TransportKind::Stream);
        DashboardApp::new(
            AppSettings::default(),
            registry,
            Box::new(UnavailableBackend),
            LaunchOptions::default(),
        )
    }

    #[test]
    fn test_export_then_import_replaces_list() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cams.json");

        let mut source = app();
        source.registry.add("Front Door", "rtsp://10.0.0.5/live", parse_tags("door")).unwrap();
        source.registry.add("Yard", "192.168.1.20", parse_tags("")).unwrap();
        source.export_cameras(&path).unwrap();

        let mut target = app();
        target.registry.add("Old", "rtsp://old", parse_tags("")).unwrap();
        assert_eq!(target.import_cameras(&path).unwrap(), 2);
        assert_eq!(target.registry.entries(), source.registry.entries());
    }

    #[test]
    fn test_bad_import_keeps_current_list() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut app = app();
        app.registry.add("Keep", "rtsp://keep", parse_tags("")).unwrap();
        assert!(app.import_cameras(&path).is_err());
        assert!(app.import_cameras(&tmp.path().join("missing.json")).is_err());
        assert_eq!(app.registry.len(), 1);
    }

    #[test]
    fn test_import_resets_vanished_tag_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cams.json");
        let mut source = app();
        source.registry.add("Lobby", "rtsp://10.0.0.6/live", parse_tags("lobby")).unwrap();
        source.export_cameras(&path).unwrap();

        let mut target = app();
        target.registry.add("Door", "rtsp://10.0.0.5/live", parse_tags("door")).unwrap();
        target.view.set_filter(TagFilter::from("door"));
        target.settings.selected_tag = TagFilter::from("door");
        target.import_cameras(&path).unwrap();
        assert_eq!(target.view.filter(), &TagFilter::All);
        assert_eq!(target.settings.selected_tag, TagFilter::All);
    }
}
