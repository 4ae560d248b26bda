//! Decoder lifecycle manager.
//!
//! Keeps exactly one live decoder per stream camera (bound to its grid
//! surface) plus, while a stream camera is shown fullscreen, a second
//! independent decoder bound to the fullscreen surface.
//!
//! [`DecoderManager::reconcile`] runs after registry changes:
//! - wanted but untracked surfaces get a decoder if the surface is mounted,
//!   otherwise they stay pending and are retried on the next pass
//! - tracked surfaces that are no longer wanted, or whose camera now points
//!   at a different source, are destroyed
//! - a construction failure is remembered per camera and not retried
//!   until [`DecoderManager::retry`] clears it

use std::collections::{HashMap, HashSet};

use log::{info, trace, warn};

use super::camera::{CameraEntry, CameraId};
use super::surface::{SurfaceId, SurfaceResolver, SurfaceSlot};
use crate::decoder::{DecoderBackend, DecoderError, DecoderInstance, DecoderStatus};

/// What one reconciliation pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<SurfaceId>,
    pub destroyed: Vec<SurfaceId>,
    /// Wanted surfaces that were not mounted yet.
    pub pending: Vec<SurfaceId>,
    pub failed: Vec<SurfaceId>,
}

impl ReconcileReport {
    pub fn is_idle(&self) -> bool {
        self.created.is_empty()
            && self.destroyed.is_empty()
            && self.pending.is_empty()
            && self.failed.is_empty()
    }
}

struct Tracked {
    source: String,
    instance: Box<dyn DecoderInstance>,
}

/// Owns every decoder instance, keyed by surface.
pub struct DecoderManager {
    backend: Box<dyn DecoderBackend>,
    tracked: HashMap<SurfaceId, Tracked>,
    failures: HashMap<SurfaceId, DecoderError>,
    pending: HashSet<SurfaceId>,
}

impl std::fmt::Debug for DecoderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderManager")
            .field("tracked", &self.tracked.len())
            .field("failures", &self.failures.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl DecoderManager {
    pub fn new(backend: Box<dyn DecoderBackend>) -> Self {
        Self {
            backend,
            tracked: HashMap::new(),
            failures: HashMap::new(),
            pending: HashSet::new(),
        }
    }

    /// Bring decoders in line with `entries` and the fullscreen target.
    pub fn reconcile(
        &mut self,
        entries: &[CameraEntry],
        fullscreen: Option<CameraId>,
        surfaces: &dyn SurfaceResolver,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // (surface, decoder source) for everything that should be live
        let mut wanted: Vec<(SurfaceId, String)> = entries
            .iter()
            .filter(|e| e.is_stream())
            .map(|e| (SurfaceId::grid(e.id()), e.stream_source()))
            .collect();
        if let Some(entry) = fullscreen.and_then(|id| entries.iter().find(|e| e.id() == id))
            && entry.is_stream()
        {
            wanted.push((SurfaceId::fullscreen(entry.id()), entry.stream_source()));
        }
        let wanted_sources: HashMap<SurfaceId, &str> =
            wanted.iter().map(|(id, source)| (*id, source.as_str())).collect();

        // Teardown first so a removed camera never overlaps with new instances.
        // A source change (import keeping the id) counts as removal + add.
        let stale: Vec<SurfaceId> = self
            .tracked
            .iter()
            .filter(|(id, t)| wanted_sources.get(id) != Some(&t.source.as_str()))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(tracked) = self.tracked.remove(&id) {
                info!("Destroying decoder {} ({})", id, tracked.source);
                tracked.instance.destroy();
                report.destroyed.push(id);
            }
        }
        self.failures.retain(|id, _| wanted_sources.contains_key(id));
        self.pending.clear();

        for (id, source) in wanted {
            if self.tracked.contains_key(&id) || self.failures.contains_key(&id) {
                continue;
            }
            let Some(surface) = surfaces.resolve(&id) else {
                trace!("Surface {} not mounted yet, retrying next pass", id);
                self.pending.insert(id);
                report.pending.push(id);
                continue;
            };
            match self.backend.construct(&source, surface) {
                Ok(instance) => {
                    info!("Created decoder {} for {}", id, source);
                    self.tracked.insert(id, Tracked { source, instance });
                    report.created.push(id);
                }
                Err(e) => {
                    warn!("Decoder {} for {} failed: {}", id, source, e);
                    self.failures.insert(id, e);
                    report.failed.push(id);
                }
            }
        }

        report
    }

    /// Forget a camera's failure (and its failed or ended instances) so the
    /// next pass recreates them.
    pub fn retry(&mut self, camera: CameraId) {
        self.failures.retain(|id, _| id.camera != camera);
        let dead: Vec<SurfaceId> = self
            .tracked
            .iter()
            .filter(|(id, t)| id.camera == camera && t.instance.status().is_retryable())
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            if let Some(tracked) = self.tracked.remove(&id) {
                tracked.instance.destroy();
            }
        }
        info!("Decoder retry armed for {}", camera);
    }

    /// Destroy every instance (shutdown).
    pub fn shutdown(&mut self) {
        let count = self.tracked.len();
        for (_, tracked) in self.tracked.drain() {
            tracked.instance.destroy();
        }
        self.failures.clear();
        self.pending.clear();
        if count > 0 {
            info!("Destroyed {} decoder(s) on shutdown", count);
        }
    }

    /// True while some wanted surface still waits to be mounted.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_tracked(&self, id: &SurfaceId) -> bool {
        self.tracked.contains_key(id)
    }

    /// Failure to show on a camera's card: construction error first, then runtime error.
    pub fn failure(&self, camera: CameraId, slot: SurfaceSlot) -> Option<DecoderError> {
        let id = SurfaceId { camera, slot };
        self.failures
            .get(&id)
            .cloned()
            .or_else(|| self.tracked.get(&id).and_then(|t| t.instance.status().error().cloned()))
    }

    pub fn status(&self, camera: CameraId, slot: SurfaceSlot) -> Option<DecoderStatus> {
        let id = SurfaceId { camera, slot };
        if let Some(e) = self.failures.get(&id) {
            return Some(DecoderStatus::Failed(e.clone()));
        }
        self.tracked.get(&id).map(|t| t.instance.status())
    }
}

impl Drop for DecoderManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
