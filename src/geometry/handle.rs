//! Injected slot holding boundary geometry once it becomes available.
//!
//! Geometry is loaded asynchronously after startup. Until then the
//! [`GeometryHandle`] is explicitly unavailable and containment resolves to
//! "not contained" rather than failing.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::boundary::{BoundaryGeometry, PolygonBoundary};

/// Shared, cloneable handle to the current boundary geometry.
#[derive(Debug, Clone, Default)]
pub struct GeometryHandle {
    slot: Arc<RwLock<Option<Arc<dyn BoundaryGeometry>>>>,
}

impl GeometryHandle {
    /// Creates a handle with no geometry loaded.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Creates a handle that already holds `geometry`.
    #[must_use]
    pub fn with_geometry(geometry: Arc<dyn BoundaryGeometry>) -> Self {
        let handle = Self::default();
        handle.install(geometry);
        handle
    }

    /// Makes `geometry` the current boundary, replacing any previous one.
    pub fn install(&self, geometry: Arc<dyn BoundaryGeometry>) {
        *self.slot.write() = Some(geometry);
    }

    /// Returns the current geometry, or `None` while it is unavailable.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn BoundaryGeometry>> {
        self.slot.read().clone()
    }

    /// Returns `true` once geometry has been installed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Loads a [`PolygonBoundary`] from `path` in the background and installs
    /// it on success. Failure is logged and leaves the handle unavailable.
    pub fn spawn_load(&self, path: PathBuf) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match PolygonBoundary::load(&path).await {
                Ok(boundary) => {
                    tracing::info!(
                        path = %path.display(),
                        shapes = boundary.shapes().len(),
                        "boundary geometry loaded"
                    );
                    handle.install(Arc::new(boundary));
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "boundary geometry unavailable; containment will report false"
                    );
                }
            }
        })
    }
}
