use crate::{
    chunk::Chunk,
    cluster::dbscan::Labeling,
    geo::{BoundingBox, Coord, Geo},
    position::PointId,
};

/**
 * The points given the same label by one clustering run.
 *
 * A RawCluster only lives until the merger has reconciled it with the clusters found in the other
 * chunks and at the other scales.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct RawCluster {
    /// Position of the chunk these points came from in the input.
    pub chunk: usize,
    /// Position of the scale in the configuration.
    pub scale: usize,
    /// The points in this cluster, in ascending order.
    pub members: Vec<PointId>,
    /// Average latitude and longitude of the members.
    pub centroid: Coord,
    /// Smallest box containing every member.
    pub bbox: BoundingBox,
}

impl RawCluster {
    /// Build the clusters described by a labeling of the records in `chunk`.
    ///
    /// Clusters come back in label order; noise is left out.
    pub fn from_labeling(
        chunk_pos: usize,
        chunk: &Chunk,
        scale_pos: usize,
        labeling: &Labeling,
    ) -> Vec<Self> {
        debug_assert_eq!(chunk.len(), labeling.len());

        labeling
            .members()
            .into_iter()
            .filter(|indexes| !indexes.is_empty())
            .map(|indexes| {
                let coords = indexes.iter().map(|&i| chunk.coord(i));
                let bbox = BoundingBox::from_coords(coords.clone());
                let centroid = Coord::mean(coords).unwrap_or_default();

                let members = indexes
                    .into_iter()
                    .map(|i| PointId::new(chunk_pos, i))
                    .collect();

                RawCluster {
                    chunk: chunk_pos,
                    scale: scale_pos,
                    members,
                    centroid,
                    bbox,
                }
            })
            .collect()
    }

    /// The number of points in this cluster.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Geo for RawCluster {
    fn centroid(&self) -> Coord {
        self.centroid
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }
}
