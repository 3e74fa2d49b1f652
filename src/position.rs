/*!
 * All the data related to a single vessel position report.
 *
 * A PositionRecord is one row of the cleaned AIS data handed over by the preprocessing stage. It
 * has already been filtered down to stationary or slow moving vessels inside the region of
 * interest, so nothing here re-validates it.
 */
use crate::geo::{BoundingBox, Coord, Geo};
use chrono::{DateTime, Utc};

/// One position report from a vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecord {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// The time the report was received.
    pub timestamp: DateTime<Utc>,
    /// The Maritime Mobile Service Identity of the vessel, if known.
    pub mmsi: Option<u32>,
    /// Speed over ground in knots, if reported.
    pub sog: Option<f64>,
}

impl PositionRecord {
    /// Create a record from just a location and time.
    pub fn new(lat: f64, lon: f64, timestamp: DateTime<Utc>) -> Self {
        PositionRecord {
            lat,
            lon,
            timestamp,
            mmsi: None,
            sog: None,
        }
    }

    /// Attach a vessel identifier.
    pub fn with_mmsi(self, mmsi: u32) -> Self {
        PositionRecord {
            mmsi: Some(mmsi),
            ..self
        }
    }

    /// Attach a speed over ground.
    pub fn with_sog(self, sog: f64) -> Self {
        PositionRecord {
            sog: Some(sog),
            ..self
        }
    }

    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl Geo for PositionRecord {
    fn centroid(&self) -> Coord {
        self.coord()
    }

    fn bounding_box(&self) -> BoundingBox {
        let c = self.coord();
        BoundingBox { ll: c, ur: c }
    }
}

/// Identifies a single position record across all the chunks of a run.
///
/// Records are told apart by where they came from, not by their coordinates, so two vessels
/// reporting the exact same position are still two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId {
    /// Position of the chunk in the input.
    pub chunk: usize,
    /// Position of the record in its chunk.
    pub index: usize,
}

impl PointId {
    pub fn new(chunk: usize, index: usize) -> Self {
        PointId { chunk, index }
    }
}
