//! Map widget initialization
//!
//! [`initialize_map`] wires one widget together: a view bound to the container, the basemap
//! tile layer, and a track overlay whose loaded event fits the view to the track.

use crate::{
    MapError, MapLibrary, MarkerOptions, Result, SharedMapView, TileLayer, TrackOverlay, runtime,
};
use std::sync::{Arc, PoisonError};

/// What the host keeps from an initialization
///
/// Dropping the handle does not tear the widget down; the library still hosts the view.
#[derive(Clone)]
pub struct MapHandle {
    pub container_id: String,
    pub view: SharedMapView,
    pub overlay: Arc<TrackOverlay>,
}

/// Create a map view in `container_id` showing the track at `track_url`
///
/// Returns as soon as the track fetch is started. When the track loads, the view is fitted to
/// its bounds exactly once. Fetch and parse failures are not reported here: the overlay is
/// marked failed and the view keeps its initial viewport.
pub fn initialize_map(library: &MapLibrary, container_id: &str, track_url: &str) -> Result<MapHandle> {
    let url = library.resolve_url(track_url)?;
    // Checked before the container is claimed, so a replaced view survives the failure
    if !runtime::available() {
        return Err(MapError::NoRuntime(url));
    }
    let view = library.create_view(container_id)?;

    view.write()
        .unwrap_or_else(PoisonError::into_inner)
        .add_tile_layer(TileLayer::new(library.config().tile_provider));

    let overlay = Arc::new(TrackOverlay::new(url, MarkerOptions::none()));

    let target = Arc::downgrade(&view);
    let repaint = library.repaint_hook();
    overlay.on_loaded(move |event| {
        let Some(view) = target.upgrade() else {
            tracing::debug!("View for {} is gone, skipping fit", event.url);
            return;
        };
        view.write()
            .unwrap_or_else(PoisonError::into_inner)
            .fit_bounds(&event.bounds);
        if let Some(repaint) = &repaint {
            repaint();
        }
    })?;

    view.write()
        .unwrap_or_else(PoisonError::into_inner)
        .add_track_overlay(overlay.clone());

    if let Err(err) = library.load_overlay(overlay.clone()) {
        library.destroy_view(container_id);
        return Err(err);
    }

    Ok(MapHandle {
        container_id: container_id.to_string(),
        view,
        overlay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use crate::track::tests::LONDON_GPX;
    use crate::{Bounds, LibraryConfig, MapError, OverlayStatus, ReinitPolicy, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PARIS_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="48.8584" lon="2.2945"></trkpt>
    <trkpt lat="48.8606" lon="2.3376"></trkpt>
    <trkpt lat="48.8530" lon="2.3499"></trkpt>
  </trkseg></trk>
</gpx>"#;

    fn config() -> LibraryConfig {
        LibraryConfig {
            zoom_snap: 0.0,
            ..Default::default()
        }
    }

    fn library_with(source: MemorySource, config: LibraryConfig) -> MapLibrary {
        let library = MapLibrary::new(config, Arc::new(source));
        library.register_container("map1", 800.0, 600.0);
        library.register_container("map2", 400.0, 400.0);
        library
    }

    fn default_bounds(size: (f64, f64)) -> Bounds {
        Viewport {
            size,
            ..Viewport::default()
        }
        .visible_bounds()
    }

    #[tokio::test]
    async fn test_attaches_one_tile_layer_and_one_overlay() {
        let source = MemorySource::new().with_document("london.gpx", LONDON_GPX);
        let library = library_with(source, config());

        let handle = initialize_map(&library, "map1", "london.gpx").unwrap();
        let view = handle.view.read().unwrap();

        assert_eq!(view.container_id(), "map1");
        assert_eq!(view.tile_layers().len(), 1);
        assert_eq!(view.overlays().len(), 1);
        assert!(Arc::ptr_eq(&view.overlays()[0], &handle.overlay));
        assert_eq!(
            view.tile_layers()[0].url_template(),
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
        );
    }

    #[tokio::test]
    async fn test_overlay_has_no_marker_icons() {
        let source = MemorySource::new().with_document("london.gpx", LONDON_GPX);
        let library = library_with(source, config());

        let handle = initialize_map(&library, "map1", "london.gpx").unwrap();

        assert_eq!(handle.overlay.markers(), &MarkerOptions::none());
        assert!(!handle.overlay.markers().shows_markers());
    }

    #[tokio::test]
    async fn test_default_view_until_loaded_then_fitted() {
        let (source, gate) = MemorySource::new()
            .with_document("london.gpx", LONDON_GPX)
            .gated();
        let library = library_with(source, config());

        let handle = initialize_map(&library, "map1", "london.gpx").unwrap();

        // Still fetching: nothing moved
        tokio::task::yield_now().await;
        {
            let view = handle.view.read().unwrap();
            assert_eq!(view.revision(), 0);
            assert_eq!(view.visible_bounds(), default_bounds((800.0, 600.0)));
        }

        gate.add_permits(1);
        assert_eq!(handle.overlay.settled().await, OverlayStatus::Loaded);

        let track_bounds = handle.overlay.bounds().unwrap();
        let view = handle.view.read().unwrap();
        let visible = view.visible_bounds();

        assert_eq!(view.revision(), 1);
        assert!(visible.contains_bounds(&Bounds::new(
            (track_bounds.south() + 1e-9, track_bounds.west() + 1e-9),
            (track_bounds.north() - 1e-9, track_bounds.east() - 1e-9),
        )));
        // Fractional zoom: the tight axis matches the track exactly
        let lat_exact = (visible.south() - track_bounds.south()).abs() < 1e-9
            && (visible.north() - track_bounds.north()).abs() < 1e-9;
        let lon_exact = (visible.west() - track_bounds.west()).abs() < 1e-9
            && (visible.east() - track_bounds.east()).abs() < 1e-9;
        assert!(lat_exact || lon_exact);
    }

    #[tokio::test]
    async fn test_two_containers_are_independent() {
        let source = MemorySource::new()
            .with_document("london.gpx", LONDON_GPX)
            .with_document("paris.gpx", PARIS_GPX);
        let library = library_with(source, config());

        let london = initialize_map(&library, "map1", "london.gpx").unwrap();
        let paris = initialize_map(&library, "map2", "paris.gpx").unwrap();
        london.overlay.settled().await;
        paris.overlay.settled().await;

        let london_view = london.view.read().unwrap().visible_bounds();
        let paris_view = paris.view.read().unwrap().visible_bounds();
        let london_track = london.overlay.bounds().unwrap();
        let paris_track = paris.overlay.bounds().unwrap();

        assert!(!Arc::ptr_eq(&london.view, &paris.view));
        assert!(london_view.contains(london_track.center().0, london_track.center().1));
        assert!(!london_view.contains(paris_track.center().0, paris_track.center().1));
        assert!(paris_view.contains(paris_track.center().0, paris_track.center().1));
        assert!(!paris_view.contains(london_track.center().0, london_track.center().1));
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_default_view() {
        let source = MemorySource::new().with_status("broken.gpx", 500);
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let library = library_with(source, config()).with_repaint_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handle = initialize_map(&library, "map1", "broken.gpx").unwrap();

        assert!(matches!(
            handle.overlay.settled().await,
            OverlayStatus::Failed(_)
        ));
        let view = handle.view.read().unwrap();
        assert_eq!(view.revision(), 0);
        assert_eq!(view.visible_bounds(), default_bounds((800.0, 600.0)));
        assert_eq!(repaints.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repaint_hook_runs_after_fit() {
        let source = MemorySource::new().with_document("london.gpx", LONDON_GPX);
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let library = library_with(source, config()).with_repaint_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handle = initialize_map(&library, "map1", "london.gpx").unwrap();
        handle.overlay.settled().await;

        assert_eq!(repaints.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_container_is_reported() {
        let library = library_with(MemorySource::new(), config());
        assert!(matches!(
            initialize_map(&library, "map9", "london.gpx"),
            Err(MapError::ContainerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reinitialization_is_rejected_by_default() {
        let source = MemorySource::new().with_document("london.gpx", LONDON_GPX);
        let library = library_with(source, config());

        initialize_map(&library, "map1", "london.gpx").unwrap();
        assert!(matches!(
            initialize_map(&library, "map1", "london.gpx"),
            Err(MapError::ContainerInUse(_))
        ));
    }

    #[tokio::test]
    async fn test_replaced_view_is_not_fitted() {
        let (source, gate) = MemorySource::new()
            .with_document("london.gpx", LONDON_GPX)
            .with_document("paris.gpx", PARIS_GPX)
            .gated();
        let library = library_with(
            source,
            LibraryConfig {
                reinit_policy: ReinitPolicy::Replace,
                ..config()
            },
        );

        let first = initialize_map(&library, "map1", "london.gpx").unwrap();
        let first_overlay = first.overlay.clone();
        let first_view = Arc::downgrade(&first.view);
        drop(first);

        let second = initialize_map(&library, "map1", "paris.gpx").unwrap();
        assert!(first_view.upgrade().is_none());

        gate.add_permits(2);
        assert_eq!(first_overlay.settled().await, OverlayStatus::Loaded);
        assert_eq!(second.overlay.settled().await, OverlayStatus::Loaded);

        let visible = library.view("map1").unwrap().read().unwrap().visible_bounds();
        let paris = second.overlay.bounds().unwrap();
        assert!(visible.contains(paris.center().0, paris.center().1));
    }

    #[test]
    fn test_without_runtime_previous_view_is_kept() {
        let library = library_with(
            MemorySource::new(),
            LibraryConfig {
                reinit_policy: ReinitPolicy::Replace,
                ..config()
            },
        );
        let existing = library.create_view("map1").unwrap();

        assert!(matches!(
            initialize_map(&library, "map1", "london.gpx"),
            Err(MapError::NoRuntime(_))
        ));
        assert!(Arc::ptr_eq(&library.view("map1").unwrap(), &existing));
    }

    #[tokio::test]
    async fn test_waypoint_only_track_is_fitted() {
        let waypoints = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="45.7640" lon="4.8357"></wpt>
  <wpt lat="45.7578" lon="4.8320"></wpt>
</gpx>"#;
        let source = MemorySource::new().with_document("pois.gpx", waypoints);
        let library = library_with(source, config());

        let handle = initialize_map(&library, "map1", "pois.gpx").unwrap();
        assert_eq!(handle.overlay.settled().await, OverlayStatus::Loaded);

        let view = handle.view.read().unwrap();
        assert_eq!(view.revision(), 1);
        assert!(view.visible_bounds().contains(45.7640, 4.8357));
        assert!(view.visible_bounds().contains(45.7578, 4.8320));
    }

    #[tokio::test]
    async fn test_invalid_url_does_not_claim_container() {
        let library = library_with(MemorySource::new(), config());

        assert!(initialize_map(&library, "map1", "").is_err());
        assert!(library.view("map1").is_none());
    }
}
