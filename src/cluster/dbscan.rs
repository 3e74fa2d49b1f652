use crate::{
    config::ScaleConfig,
    error::ConfigError,
    geo::{Geo, HilbertRTree},
};
use std::collections::VecDeque;

/// The outcome of clustering for a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Not density reachable from any core point.
    Noise,
    /// Member of the cluster with this id. Ids are dense, starting at 0.
    Cluster(u32),
}

/// A label for every point of one clustering run, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Labeling {
    labels: Vec<Label>,
    num_clusters: u32,
}

impl Labeling {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters as usize
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| **l == Label::Noise).count()
    }

    /// Input indexes of the members of each cluster, indexed by cluster id. The indexes of each
    /// cluster are in ascending order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![vec![]; self.num_clusters()];
        for (index, label) in self.labels.iter().enumerate() {
            if let Label::Cluster(id) = label {
                members[*id as usize].push(index);
            }
        }
        members
    }
}

/**
 * Density based clustering (DBSCAN) at a single resolution.
 *
 * A point is a core point if at least `min_samples` points, counting itself, are within
 * `radius_km` of it. Clusters grow outward from core points; points that are within the radius of
 * a core point but are not core points themselves join the cluster and stop the growth there.
 *
 * The scan order is fixed so the labeling is reproducible. Seeds are tried in ascending input
 * index and clusters are numbered in the order they are seeded. Neighbors are visited in
 * ascending index and a point is never moved once it is labeled, so a border point that two
 * clusters can reach belongs to the cluster with the lowest seed index.
 */
#[derive(Debug, Clone)]
pub struct ScaleClusterer {
    scale: ScaleConfig,
}

impl ScaleClusterer {
    pub fn new(scale: &ScaleConfig) -> Result<Self, ConfigError> {
        scale.validate()?;
        Ok(ScaleClusterer {
            scale: scale.clone(),
        })
    }

    pub fn scale(&self) -> &ScaleConfig {
        &self.scale
    }

    /// Label every point as a member of a cluster or as noise.
    pub fn cluster<T: Geo>(&self, points: &[T]) -> Labeling {
        let n = points.len();
        let min_samples = self.scale.min_samples;
        let radius_km = self.scale.radius_km;

        // Nobody can have enough neighbors, don't bother building an index.
        if n < min_samples {
            return Labeling {
                labels: vec![Label::Noise; n],
                num_clusters: 0,
            };
        }

        let tree = HilbertRTree::build_for(points);
        let mut buffer: Vec<usize> = Vec::with_capacity(min_samples.max(16));

        let core: Vec<bool> = (0..n)
            .map(|i| {
                region_query(points, &tree, radius_km, i, &mut buffer);
                buffer.len() >= min_samples
            })
            .collect();

        let mut labels = vec![Label::Noise; n];
        let mut num_clusters = 0u32;
        let mut queue = VecDeque::new();

        for seed in 0..n {
            if labels[seed] != Label::Noise || !core[seed] {
                continue;
            }

            let label = Label::Cluster(num_clusters);
            num_clusters += 1;

            labels[seed] = label;
            queue.push_back(seed);

            // Only core points are ever queued, border points don't extend the cluster.
            while let Some(p) = queue.pop_front() {
                region_query(points, &tree, radius_km, p, &mut buffer);

                for &q in &buffer {
                    if labels[q] != Label::Noise {
                        continue;
                    }

                    labels[q] = label;
                    if core[q] {
                        queue.push_back(q);
                    }
                }
            }
        }

        log::trace!(
            "{} points at scale {} -> {} clusters",
            n,
            self.scale.name,
            num_clusters
        );

        Labeling {
            labels,
            num_clusters,
        }
    }
}

/// Fill `buffer` with the indexes, ascending, of all points within `radius_km` of point `i`,
/// including `i` itself.
fn region_query<T: Geo>(
    points: &[T],
    tree: &HilbertRTree,
    radius_km: f64,
    i: usize,
    buffer: &mut Vec<usize>,
) {
    let center = points[i].centroid();
    let region = center.bounding_box().expanded_by_km(radius_km);

    tree.query(&region, buffer);
    buffer.retain(|&j| j == i || center.distance_km(points[j].centroid()) <= radius_km);
}
