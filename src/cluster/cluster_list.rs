use crate::{
    chunk::Chunk,
    cluster::{dbscan::ScaleClusterer, raw_cluster::RawCluster},
};

/**
 * The clusters found in one chunk at one scale, with some metadata about where they came from.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterList {
    /// Position of the chunk in the input.
    pub chunk: usize,
    /// The id the preprocessing stage gave the chunk.
    pub chunk_id: usize,
    /// Position of the scale in the configuration.
    pub scale: usize,
    /// Number of records in the chunk.
    pub points: usize,
    /// Number of records that didn't end up in any cluster.
    pub noise: usize,
    pub clusters: Vec<RawCluster>,
}

impl ClusterList {
    /**
     * Cluster a chunk and return a ClusterList including the chunk metadata.
     *
     * #Arguments
     * chunk_pos - the position of the chunk in the input.
     * chunk - the position records.
     * scale_pos - the position of the clusterer's scale in the configuration.
     * clusterer - configured for the scale at `scale_pos`.
     */
    pub fn from_chunk(
        chunk_pos: usize,
        chunk: &Chunk,
        scale_pos: usize,
        clusterer: &ScaleClusterer,
    ) -> Self {
        let labeling = clusterer.cluster(&chunk.positions);
        let clusters = RawCluster::from_labeling(chunk_pos, chunk, scale_pos, &labeling);

        log::debug!(
            "chunk {} at scale {}: {} points, {} clusters, {} noise",
            chunk.id,
            clusterer.scale().name,
            chunk.len(),
            clusters.len(),
            labeling.noise_count()
        );

        ClusterList {
            chunk: chunk_pos,
            chunk_id: chunk.id,
            scale: scale_pos,
            points: chunk.len(),
            noise: labeling.noise_count(),
            clusters,
        }
    }

    /// Number of records that are a member of some cluster.
    pub fn clustered(&self) -> usize {
        self.points - self.noise
    }
}
