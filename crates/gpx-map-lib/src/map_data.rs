//! Conversion of journal polyline map data into GPX
//!
//! Travel journals export their maps as JSON: a list of lines, each made of polylines whose
//! coordinates are stored as parallel `lats` / `lngs` arrays. Only the first line is used;
//! each of its polylines becomes one segment of a single GPX track.

use crate::Result;
use serde::Deserialize;
use std::io::Write;

/// Name given to the generated track
const TRACK_NAME: &str = "Track";

/// Parallel coordinate arrays of one polyline
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Polyline {
    #[serde(default)]
    pub lats: Option<Vec<f64>>,
    #[serde(default)]
    pub lngs: Option<Vec<f64>>,
}

impl Polyline {
    /// Coordinates as (lat, lon) pairs, or `None` when the arrays are missing or disagree
    pub fn points(&self) -> Option<Vec<(f64, f64)>> {
        let (lats, lngs) = (self.lats.as_ref()?, self.lngs.as_ref()?);
        if lats.len() != lngs.len() {
            return None;
        }
        Some(lats.iter().copied().zip(lngs.iter().copied()).collect())
    }
}

/// One line of the map
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapLine {
    #[serde(default)]
    pub line_id: Option<serde_json::Value>,
    #[serde(default)]
    pub polylines: Vec<Polyline>,
}

/// A map as exported alongside a journal page
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub lines: Vec<MapLine>,
}

impl MapData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The line that gets converted
    pub fn line(&self) -> Option<&MapLine> {
        self.lines.first()
    }

    /// Identifier of the map, taken from the first line
    pub fn map_id(&self) -> Option<String> {
        match self.line()?.line_id.as_ref()? {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Build a GPX document with one track and one segment per usable polyline
    pub fn to_gpx(&self) -> gpx::Gpx {
        let mut track = gpx::Track {
            name: Some(TRACK_NAME.to_string()),
            ..Default::default()
        };

        let polylines = self.line().map(|line| line.polylines.as_slice()).unwrap_or_default();
        for (index, polyline) in polylines.iter().enumerate() {
            let Some(points) = polyline.points() else {
                tracing::warn!("Skipping polyline {index}: coordinate arrays missing or mismatched");
                continue;
            };

            let mut segment = gpx::TrackSegment::default();
            segment.points = points
                .into_iter()
                .map(|(lat, lon)| gpx::Waypoint::new(geo::Point::new(lon, lat)))
                .collect();
            track.segments.push(segment);
        }

        gpx::Gpx {
            version: gpx::GpxVersion::Gpx11,
            creator: Some(env!("CARGO_PKG_NAME").to_string()),
            tracks: vec![track],
            ..Default::default()
        }
    }

    /// Serialize the converted GPX document
    pub fn write_gpx<W: Write>(&self, writer: W) -> Result<()> {
        gpx::write(&self.to_gpx(), writer)?;
        Ok(())
    }
}
