/*!
 * Types and functions for clustering position records at a single scale.
 *
 * A [ScaleClusterer] labels the records of a chunk, and the labels are gathered into
 * [RawCluster]s, one [ClusterList] per chunk and scale.
 */

pub use cluster_list::ClusterList;
pub use dbscan::{Label, Labeling, ScaleClusterer};
pub use raw_cluster::RawCluster;

mod cluster_list;
mod dbscan;
mod raw_cluster;
