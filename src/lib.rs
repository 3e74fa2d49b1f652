/*!
 * Find ports in a day of AIS vessel position reports.
 *
 * Ports show up as dense patches of reports from stationary or slow moving vessels. The reports
 * are clustered at several spatial scales, the clusters describing the same place are merged,
 * and the shape, size and category of each port is worked out from its members.
 */
pub use chunk::Chunk;
pub use cluster::{ClusterList, Label, Labeling, RawCluster, ScaleClusterer};
pub use config::{
    MergeConfig, PortFinderConfig, RadiusPolicy, ScaleConfig, SizeCategory, FALLBACK_CATEGORY,
    MAX_PORT_AREA_KM2, MERGE_OVERLAP_FRACTION, MERGE_PROXIMITY_FACTOR, MIN_PORT_AREA_KM2,
};
pub use error::{ChunkError, ConfigError, PortFindResult};
pub use geo::{
    convex_hull, great_circle_distance, projected_polygon_area_km2, BoundingBox, Coord, Geo,
    HilbertRTree, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
pub use merge::{overlap_fraction, ClusterMerger, MergeOutcome, MergedCluster};
pub use multiscale::{MultiScaleClusterer, MultiScaleOutput, ScaleStats};
pub use pipeline::{PortFinder, PortReport, RunSummary};
pub use port::{PortDescriptor, PortExtent, PortGeometryResolver, Rejection, Resolution};
pub use position::{PointId, PositionRecord};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod chunk;
mod cluster;
mod config;
mod error;
mod geo;
mod merge;
mod multiscale;
mod pipeline;
mod port;
mod position;
