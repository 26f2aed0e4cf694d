//! Track storage and parsing module
//!
//! This module provides the `Track` struct holding a parsed GPX document together with
//! metadata computed once at load time: bounds, point count and length.

use crate::{Bounds, MapError, Result, utils};
use std::io::Read;

/// A parsed GPX document ready to be drawn as a track overlay
#[derive(Clone, Debug)]
pub struct Track {
    /// The original GPX data
    gpx_data: gpx::Gpx,
    /// Bounding region of every drawable point, waypoints included
    bounds: Bounds,
    /// Number of drawable points across tracks, routes and waypoints
    total_points: usize,
    /// Length in meters across tracks and routes
    total_distance: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Parse a GPX document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let gpx_data = gpx::read(reader)?;
        Self::new(gpx_data)
    }

    /// Parse a GPX document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes)
    }

    /// Build a track from already-parsed GPX data
    ///
    /// `<trk>` segments, `<rte>` routes and standalone `<wpt>` waypoints are all drawn, so all
    /// of them contribute to the bounds. Waypoints add no distance. Fails with
    /// [`MapError::EmptyTrack`] when the document has no points at all.
    pub fn new(gpx_data: gpx::Gpx) -> Result<Self> {
        let mut bounds: Option<Bounds> = None;
        let mut total_points: usize = 0;
        let mut total_distance: f64 = 0.0;
        let mut skipped: usize = 0;

        for line in Self::lines_of(&gpx_data) {
            let mut previous: Option<(f64, f64)> = None;

            for waypoint in line {
                let (lat, lon) = (waypoint.point().y(), waypoint.point().x());
                total_points += 1;

                if !utils::is_valid_lat_lon(lat, lon) {
                    skipped += 1;
                    previous = None; // Break distance chain
                    continue;
                }

                bounds = Some(match bounds {
                    Some(b) => b.extended(lat, lon),
                    None => Bounds::from_point(lat, lon),
                });

                if let Some((prev_lat, prev_lon)) = previous {
                    total_distance += utils::haversine_distance(prev_lat, prev_lon, lat, lon);
                }
                previous = Some((lat, lon));
            }
        }

        for waypoint in &gpx_data.waypoints {
            let (lat, lon) = (waypoint.point().y(), waypoint.point().x());
            total_points += 1;

            if !utils::is_valid_lat_lon(lat, lon) {
                skipped += 1;
                continue;
            }
            bounds = Some(match bounds {
                Some(b) => b.extended(lat, lon),
                None => Bounds::from_point(lat, lon),
            });
        }

        if total_points == 0 {
            return Err(MapError::EmptyTrack);
        }
        if skipped > 0 {
            tracing::warn!("Skipped {skipped} points outside Web Mercator bounds");
        }

        let bounds = bounds.ok_or_else(|| {
            MapError::InvalidGeometry("No valid points in track".to_string())
        })?;

        Ok(Self {
            gpx_data,
            bounds,
            total_points: total_points - skipped,
            total_distance,
        })
    }

    /// Every drawable polyline: track segments first, then routes
    fn lines_of(gpx_data: &gpx::Gpx) -> impl Iterator<Item = &[gpx::Waypoint]> {
        let segments = gpx_data
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .map(|segment| segment.points.as_slice());
        let routes = gpx_data.routes.iter().map(|route| route.points.as_slice());
        segments.chain(routes)
    }

    /// Drawable polylines of this track
    pub fn lines(&self) -> impl Iterator<Item = &[gpx::Waypoint]> {
        Self::lines_of(&self.gpx_data)
    }

    /// Standalone `<wpt>` points, drawn as dots rather than lines
    pub fn waypoints(&self) -> &[gpx::Waypoint] {
        &self.gpx_data.waypoints
    }

    /// First drawable point, where a start marker would go
    pub fn start(&self) -> Option<&gpx::Waypoint> {
        self.lines().flat_map(|line| line.iter()).next()
    }

    /// Last drawable point, where an end marker would go
    pub fn end(&self) -> Option<&gpx::Waypoint> {
        self.lines().flat_map(|line| line.iter()).last()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn gpx_data(&self) -> &gpx::Gpx {
        &self.gpx_data
    }

    /// Track name from the first `<trk>` or the document metadata
    pub fn name(&self) -> Option<&str> {
        self.gpx_data
            .tracks
            .iter()
            .find_map(|track| track.name.as_deref())
            .or_else(|| self.gpx_data.metadata.as_ref()?.name.as_deref())
    }

    #[inline]
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Length in meters (haversine)
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A short walk around central London with one route appended
    pub(crate) const LONDON_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Thames walk</name>
    <trkseg>
      <trkpt lat="51.5074" lon="-0.1278"></trkpt>
      <trkpt lat="51.5081" lon="-0.1195"></trkpt>
      <trkpt lat="51.5055" lon="-0.0754"></trkpt>
    </trkseg>
  </trk>
  <rte>
    <rtept lat="51.5010" lon="-0.1416"></rtept>
    <rtept lat="51.5033" lon="-0.1196"></rtept>
  </rte>
</gpx>"#;

    #[test]
    fn test_track_from_bytes() {
        let track = Track::from_bytes(LONDON_GPX.as_bytes()).unwrap();

        assert_eq!(track.total_points(), 5);
        assert_eq!(track.lines().count(), 2);
        assert_eq!(track.name(), Some("Thames walk"));
    }

    #[test]
    fn test_bounds_cover_tracks_and_routes() {
        let track = Track::from_bytes(LONDON_GPX.as_bytes()).unwrap();
        let bounds = track.bounds();

        assert_eq!(bounds.south_west(), (51.5010, -0.1416));
        assert_eq!(bounds.north_east(), (51.5081, -0.0754));
    }

    #[test]
    fn test_start_and_end() {
        let track = Track::from_bytes(LONDON_GPX.as_bytes()).unwrap();

        assert_eq!(track.start().unwrap().point().y(), 51.5074);
        assert_eq!(track.end().unwrap().point().x(), -0.1196);
    }

    #[test]
    fn test_total_distance() {
        let track = Track::from_bytes(LONDON_GPX.as_bytes()).unwrap();

        // About 3.7 km of track plus 1.5 km of route
        assert!(track.total_distance() > 4000.0);
        assert!(track.total_distance() < 7000.0);
    }

    #[test]
    fn test_empty_document_fails() {
        let result = Track::new(gpx::Gpx::default());
        assert!(matches!(result, Err(MapError::EmptyTrack)));
    }

    #[test]
    fn test_only_invalid_points_fails() {
        let mut gpx = gpx::Gpx::default();
        let mut segment = gpx::TrackSegment::default();
        segment
            .points
            .push(gpx::Waypoint::new(geo::Point::new(0.0, 89.9)));
        let mut track = gpx::Track::default();
        track.segments.push(segment);
        gpx.tracks.push(track);

        assert!(matches!(Track::new(gpx), Err(MapError::InvalidGeometry(_))));
    }

    #[test]
    fn test_waypoints_extend_bounds_without_distance() {
        let with_waypoint = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="48.8584" lon="2.2945"><name>Eiffel Tower</name></wpt>
  <trk><trkseg>
    <trkpt lat="51.5074" lon="-0.1278"></trkpt>
    <trkpt lat="51.5081" lon="-0.1195"></trkpt>
  </trkseg></trk>
</gpx>"#;
        let track = Track::from_bytes(with_waypoint.as_bytes()).unwrap();
        let line_only = Bounds::new((51.5074, -0.1278), (51.5081, -0.1195));

        assert!(track.bounds().contains(48.8584, 2.2945));
        assert!(track.bounds().contains_bounds(&line_only));
        assert_eq!(track.total_points(), 3);
        assert_eq!(track.waypoints().len(), 1);
        // Only the two track points form a line
        assert!(track.total_distance() < 1000.0);
    }

    #[test]
    fn test_waypoint_only_document_loads() {
        let waypoints_only = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="45.7640" lon="4.8357"></wpt>
  <wpt lat="45.7578" lon="4.8320"></wpt>
</gpx>"#;
        let track = Track::from_bytes(waypoints_only.as_bytes()).unwrap();

        assert_eq!(track.bounds().south_west(), (45.7578, 4.8320));
        assert_eq!(track.bounds().north_east(), (45.7640, 4.8357));
        assert_eq!(track.total_distance(), 0.0);
        assert_eq!(track.lines().count(), 0);
    }

    #[test]
    fn test_malformed_document_fails() {
        let result = Track::from_bytes(b"<gpx><trk><trkseg><trkpt lat=");
        assert!(matches!(result, Err(MapError::GpxParse(_))));
    }
}
