//! Map view state and viewport fitting
//!
//! A [`MapView`] is the headless counterpart of an on-screen map widget: it knows the pixel
//! size of its container, the current center and zoom, and which layers are attached.
//! Renderers read the viewport and mirror it into their own camera whenever
//! [`MapView::revision`] changes.

use crate::{Bounds, TileLayer, TrackOverlay, utils};
use geo::Coord;
use std::sync::{Arc, RwLock};

/// Shared handle to a view, as held by the library and by renderers
pub type SharedMapView = Arc<RwLock<MapView>>;

/// Center, zoom and pixel size of a map view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Center as (lat, lon)
    pub center: (f64, f64),
    /// Fractional zoom level
    pub zoom: f64,
    /// Container size in pixels as (width, height)
    pub size: (f64, f64),
}

impl Viewport {
    /// Center in absolute pixel coordinates at the current zoom
    fn center_pixel(&self) -> Coord<f64> {
        utils::project(self.center.0, self.center.1, self.zoom)
    }

    /// Geographic region currently visible in the container
    pub fn visible_bounds(&self) -> Bounds {
        let center = self.center_pixel();
        let half = Coord {
            x: self.size.0 / 2.0,
            y: self.size.1 / 2.0,
        };
        let south_west = utils::unproject(
            Coord {
                x: center.x - half.x,
                y: center.y + half.y,
            },
            self.zoom,
        );
        let north_east = utils::unproject(
            Coord {
                x: center.x + half.x,
                y: center.y - half.y,
            },
            self.zoom,
        );
        Bounds::new(south_west, north_east)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            zoom: 2.0,
            size: (800.0, 600.0),
        }
    }
}

/// A map view bound to one host container
pub struct MapView {
    container_id: String,
    viewport: Viewport,
    /// Zoom granularity for fitting (0 disables snapping)
    zoom_snap: f64,
    min_zoom: f64,
    tile_layers: Vec<TileLayer>,
    overlays: Vec<Arc<TrackOverlay>>,
    /// Bumped whenever the viewport is moved programmatically
    revision: u64,
}

impl MapView {
    pub fn new(container_id: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            container_id: container_id.into(),
            viewport,
            zoom_snap: 1.0,
            min_zoom: 0.0,
            tile_layers: Vec::new(),
            overlays: Vec::new(),
            revision: 0,
        }
    }

    /// Set zoom snapping and the minimum zoom used by [`fit_bounds`](Self::fit_bounds)
    pub fn with_zoom_limits(mut self, zoom_snap: f64, min_zoom: f64) -> Self {
        self.zoom_snap = zoom_snap.max(0.0);
        self.min_zoom = min_zoom;
        self
    }

    #[inline]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Geographic region currently visible
    pub fn visible_bounds(&self) -> Bounds {
        self.viewport.visible_bounds()
    }

    pub fn tile_layers(&self) -> &[TileLayer] {
        &self.tile_layers
    }

    pub fn overlays(&self) -> &[Arc<TrackOverlay>] {
        &self.overlays
    }

    pub fn add_tile_layer(&mut self, layer: TileLayer) {
        tracing::debug!(
            "Attaching tile layer {} to {}",
            layer.provider().name(),
            self.container_id
        );
        self.tile_layers.push(layer);
    }

    pub fn add_track_overlay(&mut self, overlay: Arc<TrackOverlay>) {
        tracing::debug!(
            "Attaching track overlay {} to {}",
            overlay.url(),
            self.container_id
        );
        self.overlays.push(overlay);
    }

    /// Highest zoom any attached tile layer can serve
    pub fn max_zoom(&self) -> f64 {
        self.tile_layers
            .iter()
            .map(|layer| layer.max_zoom())
            .max()
            .map_or(18.0, f64::from)
    }

    /// Move the view programmatically
    pub fn set_view(&mut self, center: (f64, f64), zoom: f64) {
        self.viewport.center = center;
        self.viewport.zoom = zoom.clamp(self.min_zoom, self.max_zoom());
        self.revision += 1;
    }

    /// Change the container size, keeping center and zoom
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.size = (width, height);
    }

    /// Zoom at which `bounds` fits entirely inside the container
    ///
    /// Computed from the pixel extent of the bounds at the current zoom, then snapped down to
    /// the zoom granularity and clamped to the zoom range.
    pub fn bounds_zoom(&self, bounds: &Bounds) -> f64 {
        let zoom = self.viewport.zoom;
        let max_zoom = self.max_zoom();

        let south_west = utils::project(bounds.south(), bounds.west(), zoom);
        let north_east = utils::project(bounds.north(), bounds.east(), zoom);
        let extent_x = (north_east.x - south_west.x).abs();
        let extent_y = (south_west.y - north_east.y).abs();

        let scale = (self.viewport.size.0 / extent_x).min(self.viewport.size.1 / extent_y);
        let mut fitted = zoom + scale.log2();
        if fitted.is_nan() {
            return max_zoom;
        }

        if self.zoom_snap > 0.0 {
            // Round first so float noise right below a step does not drop a whole level
            fitted = (fitted / (self.zoom_snap / 100.0)).round() * (self.zoom_snap / 100.0);
            fitted = (fitted / self.zoom_snap).floor() * self.zoom_snap;
        }

        fitted.clamp(self.min_zoom, max_zoom)
    }

    /// Pan and zoom so that `bounds` is fully visible
    pub fn fit_bounds(&mut self, bounds: &Bounds) {
        let zoom = self.bounds_zoom(bounds);

        let south_west = utils::project(bounds.south(), bounds.west(), zoom);
        let north_east = utils::project(bounds.north(), bounds.east(), zoom);
        let center = utils::unproject(
            Coord {
                x: (south_west.x + north_east.x) / 2.0,
                y: (south_west.y + north_east.y) / 2.0,
            },
            zoom,
        );

        tracing::trace!(
            "Fitting {} to ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.2}",
            self.container_id,
            bounds.south(),
            bounds.west(),
            bounds.north(),
            bounds.east(),
            zoom
        );

        self.set_view(center, zoom);
    }
}
