//! GPX Map Library - Headless Core for Track Map Widgets
//!
//! This library models a map widget bound to a host container: a raster tile basemap, a GPX
//! track overlay loaded asynchronously, and a viewport that fits itself to the track once the
//! overlay reports it has loaded. Everything here is renderer-agnostic; the viewer crate draws
//! the same state with `walkers`.
//!
//! # Architecture
//!
//! - **[`MapLibrary`]**: Injected mapping client owning containers, views and the track source
//! - **[`initialize_map`]**: Creates a view, attaches the basemap and the track overlay
//! - **[`MapView`]**: Viewport state, attached layers and fit-bounds math
//! - **[`TrackOverlay`]**: Async-loaded GPX overlay with a once-only loaded event
//! - **[`TileLayer`]**: Static `{s}/{z}/{x}/{y}` tile configuration
//! - **[`MapData`]**: Conversion of polyline map JSON into GPX documents

mod bounds;
mod initializer;
mod library;
mod map_data;
mod overlay;
mod runtime;
mod source;
mod tiles;
mod track;
pub mod utils;
mod view;

// Public API exports
pub use bounds::Bounds;
pub use initializer::{MapHandle, initialize_map};
pub use library::{LibraryConfig, MapLibrary, ReinitPolicy};
pub use map_data::{MapData, MapLine, Polyline};
pub use overlay::{LoadedEvent, MarkerOptions, OverlayStatus, TrackOverlay};
pub use source::{DefaultTrackSource, FetchError, HttpTrackSource, TrackSource};
#[cfg(not(target_arch = "wasm32"))]
pub use source::FileTrackSource;
pub use tiles::{Attribution, TileId, TileLayer, TileProvider};
pub use track::Track;
pub use view::{MapView, SharedMapView, Viewport};

/// Error types for the map library
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Container already hosts a map view: {0}")]
    ContainerInUse(String),

    #[error("A loaded listener is already registered for {0}")]
    ListenerAlreadyRegistered(String),

    #[error("Track load already started for {0}")]
    LoadStarted(String),

    #[error("Invalid track URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No async runtime available to load {0}")]
    NoRuntime(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Map data error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty track")]
    EmptyTrack,
}

pub type Result<T> = std::result::Result<T, MapError>;
