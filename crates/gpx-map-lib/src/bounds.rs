//! Geographic bounding regions in WGS84 degrees

use geo::{Coord, Rect};

/// Minimal rectangle containing a set of positions
///
/// Stored as a `geo::Rect` with `x` = longitude and `y` = latitude, so `min()` is the
/// south-west corner and `max()` the north-east corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds(Rect<f64>);

impl Bounds {
    /// Create bounds from two opposite corners given as (lat, lon)
    pub fn new(corner_a: (f64, f64), corner_b: (f64, f64)) -> Self {
        Self(Rect::new(
            Coord {
                x: corner_a.1,
                y: corner_a.0,
            },
            Coord {
                x: corner_b.1,
                y: corner_b.0,
            },
        ))
    }

    /// Degenerate bounds around a single position
    pub fn from_point(lat: f64, lon: f64) -> Self {
        Self::new((lat, lon), (lat, lon))
    }

    /// Smallest bounds containing all given (lat, lon) positions
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (lat, lon)| match acc {
            None => Some(Self::from_point(lat, lon)),
            Some(bounds) => Some(bounds.extended(lat, lon)),
        })
    }

    /// Return a copy grown to include the given position
    pub fn extended(&self, lat: f64, lon: f64) -> Self {
        Self::new(
            (self.south().min(lat), self.west().min(lon)),
            (self.north().max(lat), self.east().max(lon)),
        )
    }

    /// Return the union of two bounds
    pub fn union(&self, other: &Bounds) -> Self {
        self.extended(other.south(), other.west())
            .extended(other.north(), other.east())
    }

    #[inline]
    pub fn south(&self) -> f64 {
        self.0.min().y
    }

    #[inline]
    pub fn west(&self) -> f64 {
        self.0.min().x
    }

    #[inline]
    pub fn north(&self) -> f64 {
        self.0.max().y
    }

    #[inline]
    pub fn east(&self) -> f64 {
        self.0.max().x
    }

    /// South-west corner as (lat, lon)
    pub fn south_west(&self) -> (f64, f64) {
        (self.south(), self.west())
    }

    /// North-east corner as (lat, lon)
    pub fn north_east(&self) -> (f64, f64) {
        (self.north(), self.east())
    }

    /// Arithmetic center as (lat, lon)
    pub fn center(&self) -> (f64, f64) {
        let center = self.0.center();
        (center.y, center.x)
    }

    /// Extent in degrees as (lat span, lon span)
    pub fn span(&self) -> (f64, f64) {
        (self.0.height(), self.0.width())
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south()..=self.north()).contains(&lat) && (self.west()..=self.east()).contains(&lon)
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(other.south(), other.west()) && self.contains(other.north(), other.east())
    }
}
