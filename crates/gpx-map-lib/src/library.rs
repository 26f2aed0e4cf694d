//! The mapping client injected into the initializer
//!
//! [`MapLibrary`] plays the part a global map namespace plays on a web page: it knows which
//! host containers exist, creates the views bound to them, and runs track loads on the async
//! runtime. Nothing here is process-wide; hosts create one library and pass it around.

use crate::{
    MapError, MapView, Result, SharedMapView, TileProvider, TrackOverlay, TrackSource, Viewport,
    runtime, source,
};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// What happens when a view is created in a container that already hosts one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReinitPolicy {
    /// Refuse with [`MapError::ContainerInUse`]
    #[default]
    Reject,
    /// Drop the existing view and create a new one
    Replace,
}

/// Library-wide settings
#[derive(Clone, Debug)]
pub struct LibraryConfig {
    /// Basemap attached by [`initialize_map`](crate::initialize_map)
    pub tile_provider: TileProvider,
    /// Center and zoom of a fresh view (the size comes from its container)
    pub default_view: Viewport,
    /// Zoom granularity used when fitting (0 disables snapping)
    pub zoom_snap: f64,
    pub min_zoom: f64,
    pub reinit_policy: ReinitPolicy,
    /// Base against which relative track URLs are resolved
    pub base_url: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            tile_provider: TileProvider::default(),
            default_view: Viewport::default(),
            zoom_snap: 1.0,
            min_zoom: 0.0,
            reinit_policy: ReinitPolicy::default(),
            base_url: None,
        }
    }
}

/// Callback invoked after a view is moved by a background load
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

struct Container {
    size: (f64, f64),
    view: Option<SharedMapView>,
}

pub struct MapLibrary {
    config: LibraryConfig,
    source: Arc<dyn TrackSource>,
    containers: RwLock<BTreeMap<String, Container>>,
    repaint: Option<RepaintHook>,
}

impl MapLibrary {
    pub fn new(config: LibraryConfig, source: Arc<dyn TrackSource>) -> Self {
        Self {
            config,
            source,
            containers: RwLock::new(BTreeMap::new()),
            repaint: None,
        }
    }

    /// Run `hook` whenever a finished load moves one of the views
    pub fn with_repaint_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.repaint = Some(Arc::new(hook));
        self
    }

    #[inline]
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub(crate) fn repaint_hook(&self) -> Option<RepaintHook> {
        self.repaint.clone()
    }

    /// Declare a host container of the given pixel size
    ///
    /// Registering an existing id only updates its size.
    pub fn register_container(&self, id: impl Into<String>, width: f64, height: f64) {
        let id = id.into();
        let mut containers = self.containers.write().unwrap_or_else(PoisonError::into_inner);
        match containers.get_mut(&id) {
            Some(container) => container.size = (width, height),
            None => {
                tracing::debug!("Registered container {id} ({width}x{height})");
                containers.insert(
                    id,
                    Container {
                        size: (width, height),
                        view: None,
                    },
                );
            }
        }
    }

    /// Ids of all registered containers, sorted
    pub fn container_ids(&self) -> Vec<String> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// The view currently hosted by a container
    pub fn view(&self, id: &str) -> Option<SharedMapView> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)?
            .view
            .clone()
    }

    /// Create a view bound to a registered container
    pub fn create_view(&self, id: &str) -> Result<SharedMapView> {
        let mut containers = self.containers.write().unwrap_or_else(PoisonError::into_inner);
        let container = containers
            .get_mut(id)
            .ok_or_else(|| MapError::ContainerNotFound(id.to_string()))?;

        if container.view.is_some() {
            match self.config.reinit_policy {
                ReinitPolicy::Reject => return Err(MapError::ContainerInUse(id.to_string())),
                ReinitPolicy::Replace => tracing::info!("Replacing map view in {id}"),
            }
        }

        let viewport = Viewport {
            size: container.size,
            ..self.config.default_view
        };
        let view = MapView::new(id, viewport).with_zoom_limits(self.config.zoom_snap, self.config.min_zoom);
        let view = Arc::new(RwLock::new(view));
        container.view = Some(view.clone());

        tracing::info!("Created map view in {id}");
        Ok(view)
    }

    /// Release the view hosted by a container; returns whether there was one
    pub fn destroy_view(&self, id: &str) -> bool {
        self.containers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(id)
            .and_then(|container| container.view.take())
            .is_some()
    }

    /// Normalize a track location
    ///
    /// Inline GPX, absolute `http(s)://` and `file://` locations pass through. Relative
    /// locations are joined onto the configured base URL, or kept as local paths without one.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(MapError::InvalidUrl {
                url: url.to_string(),
                reason: "empty location".to_string(),
            });
        }
        if source::is_inline(url) || source::is_remote(url) || url.starts_with("file://") {
            return Ok(url.to_string());
        }

        match &self.config.base_url {
            Some(base) => reqwest::Url::parse(base)
                .and_then(|base| base.join(url))
                .map(|joined| joined.to_string())
                .map_err(|err| MapError::InvalidUrl {
                    url: url.to_string(),
                    reason: err.to_string(),
                }),
            None => Ok(url.to_string()),
        }
    }

    /// Start loading an overlay in the background
    pub fn load_overlay(&self, overlay: Arc<TrackOverlay>) -> Result<()> {
        let source = self.source.clone();
        let url = overlay.url().to_string();

        let spawned = runtime::spawn(async move {
            // Failures are recorded in the overlay status
            let _ = overlay.load(source.as_ref()).await;
        });

        if spawned {
            Ok(())
        } else {
            Err(MapError::NoRuntime(url))
        }
    }
}
