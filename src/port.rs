/*!
 * Turn merged clusters into port descriptions.
 *
 * The shape of a port is the convex hull of its members, and its area is the area of that hull
 * in a flat projection centered on the port. Clusters that come out too small (including ones
 * with no area at all because every member lies on a line) or too large to be a port are
 * rejected.
 */
use crate::{
    chunk::Chunk,
    config::PortFinderConfig,
    error::ConfigError,
    geo::{convex_hull, projected_polygon_area_km2, BoundingBox, Coord},
    merge::MergedCluster,
    position::PositionRecord,
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet as HashSet;
use std::fmt::{self, Display};
use strum::{Display as StrumDisplay, EnumIter, IntoStaticStr};

/// Where a port is.
#[derive(Debug, Clone, PartialEq)]
pub struct PortExtent {
    pub bbox: BoundingBox,
    /// Convex hull of the member positions, counter-clockwise.
    pub hull: Vec<Coord>,
}

/// Everything known about a detected port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDescriptor {
    /// Mean position of the member reports.
    pub centroid: Coord,
    pub extent: PortExtent,
    /// Area of the hull in km².
    pub area_km2: f64,
    /// Reports per km².
    pub density: f64,
    /// Name of the size category.
    pub category: String,
    /// Number of distinct position reports in the port.
    pub member_count: usize,
    /// Name of the scale the port is reported as detected at.
    pub primary_scale: String,
    /// Number of raw clusters merged into this port.
    pub raw_cluster_count: usize,
    /// Largest distance across the hull in km.
    pub max_span_km: f64,
    /// Number of distinct vessels seen, only reports with an MMSI count.
    pub vessel_count: usize,
    pub first_report: DateTime<Utc>,
    pub last_report: DateTime<Utc>,
}

impl Display for PortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{:>9.5} {:>10.5} {:>9.4} km² {:>9.1}/km² {:>7} reports {:>5} vessels {:<16} {}",
            self.centroid.lat,
            self.centroid.lon,
            self.area_km2,
            self.density,
            self.member_count,
            self.vessel_count,
            self.category,
            self.primary_scale
        )
    }
}

/// Why a merged cluster is not a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, StrumDisplay)]
pub enum Rejection {
    /// Smaller than the minimum port area, or no area at all.
    BelowMinimumArea,
    /// Larger than the maximum port area.
    AboveMaximumArea,
}

/// The outcome of resolving one merged cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Port(PortDescriptor),
    Rejected { reason: Rejection, area_km2: f64 },
}

/// Derives the geometry of ports and decides which clusters are ports.
#[derive(Debug, Clone)]
pub struct PortGeometryResolver<'a> {
    config: &'a PortFinderConfig,
}

impl<'a> PortGeometryResolver<'a> {
    pub fn new(config: &'a PortFinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(PortGeometryResolver { config })
    }

    /// The size category for a port with this area.
    ///
    /// The first category whose boundary is strictly greater than the area wins, so an area on
    /// a boundary belongs to the next larger category.
    pub fn categorize(&self, area_km2: f64) -> &str {
        self.config
            .size_categories
            .iter()
            .find(|category| area_km2 < category.max_area_km2)
            .map(|category| category.name.as_str())
            .unwrap_or(self.config.fallback_category.as_str())
    }

    /**
     * Build the description of the port formed by a merged cluster, or decide it isn't one.
     *
     * #Arguments
     * cluster - a cluster produced by the merger.
     * chunks - the input the cluster was found in, member ids are looked up here.
     */
    pub fn resolve(&self, cluster: &MergedCluster, chunks: &[Chunk]) -> Resolution {
        let records: Vec<&PositionRecord> = cluster
            .members()
            .iter()
            .map(|id| &chunks[id.chunk].positions[id.index])
            .collect();
        let coords: Vec<Coord> = records.iter().map(|r| r.coord()).collect();

        let centroid = Coord::mean(coords.iter().copied()).unwrap_or_default();
        let hull = convex_hull(&coords);
        let area_km2 = projected_polygon_area_km2(&hull, centroid.lat);

        let reason = if area_km2 <= 0.0 || area_km2 < self.config.min_port_area_km2 {
            Some(Rejection::BelowMinimumArea)
        } else if area_km2 > self.config.max_port_area_km2 {
            Some(Rejection::AboveMaximumArea)
        } else {
            None
        };

        if let Some(reason) = reason {
            log::debug!(
                "rejected cluster at ({:.4}, {:.4}): {} with {:.5} km² and {} reports",
                centroid.lat,
                centroid.lon,
                reason,
                area_km2,
                records.len()
            );
            return Resolution::Rejected { reason, area_km2 };
        }

        let max_span_km = hull
            .iter()
            .enumerate()
            .flat_map(|(i, a)| hull[(i + 1)..].iter().map(move |b| a.distance_km(*b)))
            .fold(0.0, f64::max);

        let vessel_count = records
            .iter()
            .filter_map(|r| r.mmsi)
            .collect::<HashSet<u32>>()
            .len();

        let first_report = records.iter().map(|r| r.timestamp).min();
        let last_report = records.iter().map(|r| r.timestamp).max();
        let (first_report, last_report) = match (first_report, last_report) {
            (Some(first), Some(last)) => (first, last),
            // Can't get here, a cluster with no members has no area.
            _ => return Resolution::Rejected {
                reason: Rejection::BelowMinimumArea,
                area_km2,
            },
        };

        let member_count = cluster.len();

        Resolution::Port(PortDescriptor {
            centroid,
            extent: PortExtent {
                bbox: BoundingBox::from_coords(coords.iter().copied()),
                hull,
            },
            area_km2,
            density: member_count as f64 / area_km2,
            category: self.categorize(area_km2).to_owned(),
            member_count,
            primary_scale: self.config.scales[cluster.primary_scale()].name.clone(),
            raw_cluster_count: cluster.raw_clusters(),
            max_span_km,
            vessel_count,
            first_report,
            last_report,
        })
    }
}
