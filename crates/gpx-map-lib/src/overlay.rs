//! GPX track overlays and their loaded event
//!
//! An overlay starts `Idle`, moves to `Loading` the first time [`TrackOverlay::load`] runs and
//! ends up either `Loaded` or `Failed`. The registered listener runs at most once, and only
//! on success.

use crate::{Bounds, MapError, Result, Track, TrackSource};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::watch;

/// Icon overrides for the start, end and shadow markers
///
/// `None` means no icon, so the marker is not drawn at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerOptions {
    pub start_icon_url: Option<String>,
    pub end_icon_url: Option<String>,
    pub shadow_url: Option<String>,
}

impl MarkerOptions {
    /// No start, end or shadow icon
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shows_markers(&self) -> bool {
        self.start_icon_url.is_some() || self.end_icon_url.is_some()
    }
}

/// Load state of an overlay
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl OverlayStatus {
    /// Whether the overlay reached a final state
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded | Self::Failed(_))
    }
}

/// Payload handed to the loaded listener
#[derive(Clone, Debug)]
pub struct LoadedEvent {
    pub url: String,
    pub bounds: Bounds,
    pub track: Arc<Track>,
}

type LoadedListener = Box<dyn FnOnce(&LoadedEvent) + Send>;

enum ListenerSlot {
    Vacant,
    Registered(LoadedListener),
    Fired,
}

/// A track document drawn on top of a map view
pub struct TrackOverlay {
    url: String,
    markers: MarkerOptions,
    track: OnceLock<Arc<Track>>,
    listener: Mutex<ListenerSlot>,
    status: watch::Sender<OverlayStatus>,
}

impl TrackOverlay {
    pub fn new(url: impl Into<String>, markers: MarkerOptions) -> Self {
        Self {
            url: url.into(),
            markers,
            track: OnceLock::new(),
            listener: Mutex::new(ListenerSlot::Vacant),
            status: watch::Sender::new(OverlayStatus::Idle),
        }
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn markers(&self) -> &MarkerOptions {
        &self.markers
    }

    pub fn status(&self) -> OverlayStatus {
        self.status.borrow().clone()
    }

    /// The parsed track, once loaded
    pub fn track(&self) -> Option<Arc<Track>> {
        self.track.get().cloned()
    }

    /// Bounding region of the track, once loaded
    pub fn bounds(&self) -> Option<Bounds> {
        self.track.get().map(|track| track.bounds())
    }

    /// Register the listener fired when the track finishes loading
    ///
    /// Only one listener can be registered. A listener registered after the load completed
    /// never runs.
    pub fn on_loaded<F>(&self, listener: F) -> Result<()>
    where
        F: FnOnce(&LoadedEvent) + Send + 'static,
    {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match *slot {
            ListenerSlot::Vacant => {
                *slot = ListenerSlot::Registered(Box::new(listener));
                Ok(())
            }
            _ => Err(MapError::ListenerAlreadyRegistered(self.url.clone())),
        }
    }

    /// Fetch and parse the track, then fire the loaded listener
    ///
    /// Runs at most once per overlay. Failures are logged and recorded in the status; the
    /// listener is not fired for them.
    pub async fn load(&self, source: &dyn TrackSource) -> Result<Bounds> {
        let started = self.status.send_if_modified(|status| {
            if *status == OverlayStatus::Idle {
                *status = OverlayStatus::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(MapError::LoadStarted(self.url.clone()));
        }

        let result = match source.fetch(&self.url).await {
            Ok(bytes) => Track::from_bytes(&bytes),
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(track) => {
                let track = Arc::new(track);
                let bounds = track.bounds();
                let _ = self.track.set(track.clone());
                tracing::info!(
                    "Loaded track {} ({} points, {:.0} m)",
                    self.url,
                    track.total_points(),
                    track.total_distance()
                );

                self.fire_loaded(&LoadedEvent {
                    url: self.url.clone(),
                    bounds,
                    track,
                });
                self.status.send_replace(OverlayStatus::Loaded);
                Ok(bounds)
            }
            Err(err) => {
                tracing::warn!("Failed to load track {}: {err}", self.url);
                self.status.send_replace(OverlayStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    fn fire_loaded(&self, event: &LoadedEvent) {
        let listener = {
            let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *slot, ListenerSlot::Fired) {
                ListenerSlot::Registered(listener) => Some(listener),
                _ => None,
            }
        };
        if let Some(listener) = listener {
            listener(event);
        }
    }

    /// Wait until the overlay is loaded or failed
    pub async fn settled(&self) -> OverlayStatus {
        let mut receiver = self.status.subscribe();
        match receiver.wait_for(OverlayStatus::is_settled).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }
}

impl std::fmt::Debug for TrackOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackOverlay")
            .field("url", &self.url)
            .field("markers", &self.markers)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use crate::track::tests::LONDON_GPX;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_load_fires_listener_once() {
        let source = MemorySource::new().with_document("walk.gpx", LONDON_GPX);
        let overlay = TrackOverlay::new("walk.gpx", MarkerOptions::none());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        overlay
            .on_loaded(move |event| {
                assert_eq!(event.url, "walk.gpx");
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let bounds = overlay.load(&source).await.unwrap();
        assert_eq!(overlay.bounds(), Some(bounds));
        assert_eq!(overlay.status(), OverlayStatus::Loaded);

        // A second load is refused and does not re-fire
        assert!(matches!(
            overlay.load(&source).await,
            Err(MapError::LoadStarted(_))
        ));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn test_second_listener_is_rejected() {
        let overlay = TrackOverlay::new("walk.gpx", MarkerOptions::none());
        overlay.on_loaded(|_| {}).unwrap();
        assert!(matches!(
            overlay.on_loaded(|_| {}),
            Err(MapError::ListenerAlreadyRegistered(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_fetch_never_fires() {
        let source = MemorySource::new().with_status("missing.gpx", 404);
        let overlay = TrackOverlay::new("missing.gpx", MarkerOptions::none());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        overlay
            .on_loaded(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(overlay.load(&source).await.is_err());
        assert!(matches!(overlay.settled().await, OverlayStatus::Failed(_)));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(overlay.bounds().is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_fails() {
        let source = MemorySource::new().with_document("bad.gpx", "<gpx><trk>");
        let overlay = TrackOverlay::new("bad.gpx", MarkerOptions::none());

        assert!(overlay.load(&source).await.is_err());
        assert!(matches!(overlay.status(), OverlayStatus::Failed(_)));
    }

    #[test]
    fn test_marker_options_none() {
        let markers = MarkerOptions::none();
        assert!(markers.start_icon_url.is_none());
        assert!(markers.end_icon_url.is_none());
        assert!(markers.shadow_url.is_none());
        assert!(!markers.shows_markers());
    }
}
