/*!
 * Reconcile the raw clusters from every chunk and scale into one set of ports.
 *
 * The same physical port usually shows up several times: once per scale, and split in pieces
 * when it straddles a chunk boundary. Two clusters describe the same port if any of these hold:
 *
 *  * they share a member point,
 *  * their bounding boxes overlap by at least the configured fraction of the smaller box,
 *  * their centroids are within the configured multiple of the characteristic radius (the
 *    radius of a circle with the same area as the bounding box) of the pair, where the
 *    [RadiusPolicy](crate::RadiusPolicy) picks which radius of the pair to use.
 *
 * The relation is closed transitively with a union-find over the clusters. A union covers more
 * ground than its parts, so the relation is evaluated again over the unions until nothing more
 * merges. Once that settles no two clusters in the output are related, and feeding the output
 * back in changes nothing.
 */
use crate::{
    chunk::Chunk,
    cluster::RawCluster,
    config::{MergeConfig, ScaleConfig},
    error::ConfigError,
    geo::{BoundingBox, Coord, Geo, HilbertRTree},
    position::PointId,
};
use rustc_hash::FxHashMap as HashMap;
use std::cmp::Reverse;

/**
 * A group of raw clusters judged to be one physical port.
 *
 * Members are unique record ids in ascending order, so a record detected at several scales is
 * only counted once.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCluster {
    members: Vec<PointId>,
    centroid: Coord,
    bbox: BoundingBox,
    /// Positions in the configuration of every scale that contributed, ascending.
    scales: Vec<usize>,
    raw_clusters: usize,
    primary_scale: usize,
    primary_size: usize,
    finest_scale: usize,
}

impl MergedCluster {
    /// Start a merged cluster from a single raw cluster.
    fn from_raw(raw: RawCluster) -> Self {
        let RawCluster {
            scale,
            mut members,
            centroid,
            bbox,
            ..
        } = raw;

        members.sort_unstable();
        members.dedup();
        let primary_size = members.len();

        MergedCluster {
            members,
            centroid,
            bbox,
            scales: vec![scale],
            raw_clusters: 1,
            primary_scale: scale,
            primary_size,
            finest_scale: scale,
        }
    }

    /// The records in this cluster, ascending.
    pub fn members(&self) -> &[PointId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Positions in the configuration of the scales this cluster was detected at.
    pub fn scales(&self) -> &[usize] {
        &self.scales
    }

    /// How many raw clusters went into this one.
    pub fn raw_clusters(&self) -> usize {
        self.raw_clusters
    }

    /// The scale this port is reported as detected at.
    ///
    /// This is the earliest scale in the configuration among the contributing raw clusters,
    /// with the largest raw cluster winning ties.
    pub fn primary_scale(&self) -> usize {
        self.primary_scale
    }

    /// The contributing scale with the smallest radius.
    pub fn finest_scale(&self) -> usize {
        self.finest_scale
    }

    /// Take in all the members of `other`.
    fn absorb(&mut self, other: MergedCluster, scales: &[ScaleConfig], chunks: &[Chunk]) {
        self.members = merge_sorted(&self.members, &other.members);
        self.bbox = self.bbox.union(&other.bbox);
        self.centroid =
            Coord::mean(self.members.iter().map(|&id| coord_of(chunks, id))).unwrap_or_default();

        self.scales = merge_sorted(&self.scales, &other.scales);
        self.raw_clusters += other.raw_clusters;

        if (other.primary_scale, Reverse(other.primary_size))
            < (self.primary_scale, Reverse(self.primary_size))
        {
            self.primary_scale = other.primary_scale;
            self.primary_size = other.primary_size;
        }

        let radius = |s: usize| scales[s].radius_km;
        if (radius(other.finest_scale), other.finest_scale)
            < (radius(self.finest_scale), self.finest_scale)
        {
            self.finest_scale = other.finest_scale;
        }
    }

    fn shares_member_with(&self, other: &MergedCluster) -> bool {
        if !self.bbox.overlap(&other.bbox, 0.0) {
            return false;
        }

        let (mut i, mut j) = (0, 0);
        while i < self.members.len() && j < other.members.len() {
            match self.members[i].cmp(&other.members[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

impl Geo for MergedCluster {
    fn centroid(&self) -> Coord {
        self.centroid
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }
}

/// The result of merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// The merged clusters, ordered by their first member.
    pub clusters: Vec<MergedCluster>,
    /// Merged clusters with fewer members than the `min_samples` of their finest scale.
    pub discarded: Vec<MergedCluster>,
    /// How many input clusters were absorbed into another one.
    pub merges: usize,
    /// How many times the relation was evaluated before it settled.
    pub passes: usize,
}

/// Merges clusters that describe the same port.
#[derive(Debug, Clone)]
pub struct ClusterMerger<'a> {
    scales: &'a [ScaleConfig],
    config: MergeConfig,
}

impl<'a> ClusterMerger<'a> {
    /// `scales` is the configuration the raw clusters were produced with, the `scale` of each raw
    /// cluster is a position in it.
    pub fn new(scales: &'a [ScaleConfig], config: MergeConfig) -> Result<Self, ConfigError> {
        for scale in scales {
            scale.validate()?;
        }
        config.validate()?;

        Ok(ClusterMerger { scales, config })
    }

    /// Merge raw clusters into ports.
    ///
    /// `chunks` is the input the raw clusters were found in; member ids are looked up in it.
    pub fn merge(&self, chunks: &[Chunk], raw: Vec<RawCluster>) -> MergeOutcome {
        debug_assert!(raw.iter().all(|r| r.scale < self.scales.len()));

        let clusters = raw.into_iter().map(MergedCluster::from_raw).collect();
        self.reconcile(chunks, clusters)
    }

    /// Run already merged clusters through the merger again.
    pub fn remerge(&self, chunks: &[Chunk], merged: Vec<MergedCluster>) -> MergeOutcome {
        self.reconcile(chunks, merged)
    }

    /// Decide if two clusters describe the same port.
    pub fn same_port(&self, left: &MergedCluster, right: &MergedCluster) -> bool {
        self.same_port_by_extent(left, right) || left.shares_member_with(right)
    }

    /// The overlap and centroid proximity rules.
    fn same_port_by_extent<G: Geo>(&self, left: &G, right: &G) -> bool {
        let left_box = left.bounding_box();
        let right_box = right.bounding_box();

        if overlap_fraction(&left_box, &right_box) >= self.config.overlap_fraction {
            return true;
        }

        let radius = self.config.radius_policy.select(
            left_box.characteristic_radius_km(),
            right_box.characteristic_radius_km(),
        );

        let distance = left.centroid().distance_km(right.centroid());

        distance <= self.config.proximity_factor * radius
    }

    fn reconcile(&self, chunks: &[Chunk], clusters: Vec<MergedCluster>) -> MergeOutcome {
        let inputs = clusters.len();
        let mut current = clusters;
        let mut passes = 0;

        loop {
            passes += 1;

            let components = self.connected_components(&current);
            if components.len() == current.len() {
                break;
            }

            log::debug!(
                "merge pass {}: {} clusters -> {}",
                passes,
                current.len(),
                components.len()
            );

            let mut slots: Vec<Option<MergedCluster>> = current.into_iter().map(Some).collect();
            current = components
                .into_iter()
                .filter_map(|component| {
                    let mut indexes = component.into_iter();
                    let mut merged = indexes.next().and_then(|i| slots[i].take())?;
                    for i in indexes {
                        if let Some(other) = slots[i].take() {
                            merged.absorb(other, self.scales, chunks);
                        }
                    }
                    Some(merged)
                })
                .collect();
        }

        let merges = inputs - current.len();

        current.sort_by_key(|c| c.members.first().copied());

        let (clusters, discarded): (Vec<_>, Vec<_>) = current
            .into_iter()
            .partition(|c| c.len() >= self.scales[c.finest_scale].min_samples);

        for small in &discarded {
            log::debug!(
                "discarding merged cluster at ({:.4}, {:.4}) with {} members, {} needs {}",
                small.centroid.lat,
                small.centroid.lon,
                small.len(),
                self.scales[small.finest_scale].name,
                self.scales[small.finest_scale].min_samples
            );
        }

        log::info!(
            "Merged {} clusters → {} ports ({} too small)",
            inputs,
            clusters.len(),
            discarded.len()
        );

        MergeOutcome {
            clusters,
            discarded,
            merges,
            passes,
        }
    }

    /// Group the clusters into connected components of the same port relation.
    ///
    /// Components are lists of indexes into `clusters`, each ascending, ordered by their first
    /// index.
    fn connected_components(&self, clusters: &[MergedCluster]) -> Vec<Vec<usize>> {
        let mut uf = UnionFind::new(clusters.len());

        // Shared members.
        let mut owner: HashMap<PointId, usize> = HashMap::default();
        for (i, cluster) in clusters.iter().enumerate() {
            for &id in &cluster.members {
                if let Some(&j) = owner.get(&id) {
                    uf.union(i, j);
                } else {
                    owner.insert(id, i);
                }
            }
        }

        // Overlap and proximity. The search region around each cluster must reach any cluster
        // that could pass either test, so it covers the cluster's own box plus the largest
        // proximity distance possible in this set.
        let max_radius = clusters
            .iter()
            .map(|c| c.bbox.characteristic_radius_km())
            .fold(0.0, f64::max);
        let reach_km = self.config.proximity_factor * max_radius;

        let tree = HilbertRTree::build_for(clusters);
        let mut candidates = Vec::new();
        for (i, cluster) in clusters.iter().enumerate() {
            let region = cluster
                .bbox
                .union(&cluster.centroid.bounding_box().expanded_by_km(reach_km));
            tree.query(&region, &mut candidates);

            for &j in candidates.iter().filter(|&&j| j > i) {
                if uf.find(i) != uf.find(j) && self.same_port_by_extent(cluster, &clusters[j]) {
                    uf.union(i, j);
                }
            }
        }

        uf.groups()
    }
}

/// Fraction of the smaller box covered by the intersection of the two boxes.
///
/// A box with no area (a single point or a line) counts as fully covered if it touches the other
/// box at all.
pub fn overlap_fraction(left: &BoundingBox, right: &BoundingBox) -> f64 {
    let intersection = match left.intersection(right) {
        Some(bbox) => bbox,
        None => return 0.0,
    };

    let smaller = left.area_km2().min(right.area_km2());
    if smaller <= 0.0 {
        return 1.0;
    }

    (intersection.area_km2() / smaller).min(1.0)
}

fn coord_of(chunks: &[Chunk], id: PointId) -> Coord {
    chunks[id.chunk].coord(id.index)
}

/// Union of two ascending, duplicate free slices.
fn merge_sorted<T: Ord + Copy>(left: &[T], right: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => {
                merged.push(left[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                merged.push(right[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                merged.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }

    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}

/// Disjoint sets over `0..n` with path halving and union by size.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }

        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }

        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }

    /// The sets, each ascending, ordered by their smallest element.
    fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut group_of_root: HashMap<usize, usize> = HashMap::default();
        let mut groups: Vec<Vec<usize>> = vec![];

        for x in 0..self.parent.len() {
            let root = self.find(x);
            let next = groups.len();
            let g = *group_of_root.entry(root).or_insert(next);
            if g == next {
                groups.push(vec![]);
            }
            groups[g].push(x);
        }

        groups
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::RadiusPolicy, geo::KM_PER_DEGREE, PositionRecord};
    use chrono::{DateTime, NaiveDate, Utc};

    const LAT0: f64 = 56.0;
    const LON0: f64 = 10.0;

    /// A record `north` km north and `east` km east of the reference point.
    fn record(north: f64, east: f64) -> PositionRecord {
        let ts = DateTime::from_utc(NaiveDate::from_ymd(2024, 5, 4).and_hms(0, 0, 0), Utc);
        let km_per_deg_lon = KM_PER_DEGREE * (LAT0 * std::f64::consts::PI / 180.0).cos();
        PositionRecord::new(LAT0 + north / KM_PER_DEGREE, LON0 + east / km_per_deg_lon, ts)
    }

    /// Square grid of `side` x `side` records with `spacing` km starting at (north, east).
    fn grid(north: f64, east: f64, side: usize, spacing: f64) -> Vec<PositionRecord> {
        let mut recs = vec![];
        for i in 0..side {
            for j in 0..side {
                recs.push(record(
                    north + spacing * i as f64,
                    east + spacing * j as f64,
                ));
            }
        }
        recs
    }

    fn raw(chunks: &[Chunk], chunk: usize, scale: usize, indexes: &[usize]) -> RawCluster {
        let coords = indexes.iter().map(|&i| chunks[chunk].coord(i));
        RawCluster {
            chunk,
            scale,
            members: indexes.iter().map(|&i| PointId::new(chunk, i)).collect(),
            centroid: Coord::mean(coords.clone()).unwrap(),
            bbox: BoundingBox::from_coords(coords),
        }
    }

    fn scales() -> Vec<ScaleConfig> {
        vec![
            ScaleConfig::new("coarse", "Coarse", 1.0, 4),
            ScaleConfig::new("fine", "Fine", 0.1, 4),
        ]
    }

    fn merge_config(policy: RadiusPolicy) -> MergeConfig {
        MergeConfig {
            overlap_fraction: 0.5,
            proximity_factor: 1.5,
            radius_policy: policy,
        }
    }

    #[test]
    fn test_nothing_to_merge() {
        let scales = scales();
        let merger = ClusterMerger::new(&scales, MergeConfig::default()).unwrap();
        let outcome = merger.merge(&[], vec![]);

        assert!(outcome.clusters.is_empty());
        assert!(outcome.discarded.is_empty());
        assert_eq!(outcome.merges, 0);
    }

    #[test]
    fn test_close_overlapping_clusters_merge() {
        // Two 4x4 grids offset by 0.05 km so they overlap, in different chunks.
        let chunks = vec![
            Chunk::new(0, grid(0.0, 0.0, 4, 0.1)),
            Chunk::new(1, grid(0.05, 0.0, 4, 0.1)),
        ];

        let a = raw(&chunks, 0, 0, &(0..16).collect::<Vec<_>>());
        let b = raw(&chunks, 1, 1, &(0..16).collect::<Vec<_>>());
        assert!((a.centroid.distance_km(b.centroid) - 0.05).abs() < 1.0e-6);

        let scales = scales();
        let merger = ClusterMerger::new(&scales, merge_config(RadiusPolicy::Larger)).unwrap();
        let outcome = merger.merge(&chunks, vec![a, b]);

        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.merges, 1);

        let port = &outcome.clusters[0];
        assert_eq!(port.len(), 32);
        assert_eq!(port.raw_clusters(), 2);
        assert_eq!(port.scales(), &[0, 1]);
        assert_eq!(port.primary_scale(), 0);
        assert_eq!(port.finest_scale(), 1);
    }

    #[test]
    fn test_shared_points_are_counted_once() {
        let chunks = vec![Chunk::new(0, grid(0.0, 0.0, 5, 0.05))];

        // The same records seen at two scales, partly overlapping.
        let coarse = raw(&chunks, 0, 0, &(0..25).collect::<Vec<_>>());
        let fine = raw(&chunks, 0, 1, &(10..20).collect::<Vec<_>>());

        let scales = scales();
        let merger = ClusterMerger::new(&scales, MergeConfig::default()).unwrap();
        let outcome = merger.merge(&chunks, vec![fine, coarse]);

        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.clusters[0].len(), 25);
        assert_eq!(outcome.clusters[0].members()[0], PointId::new(0, 0));
    }

    #[test]
    fn test_shared_point_forces_merge() {
        // Two square clusters whose boxes only touch at one corner, and that corner record is in
        // both of them.
        let mut recs = grid(0.0, 0.0, 3, 0.5);
        recs.extend(grid(1.0, 1.0, 3, 0.5).into_iter().skip(1));
        let chunks = vec![Chunk::new(0, recs)];

        let south_west = raw(&chunks, 0, 0, &(0..9).collect::<Vec<_>>());
        let mut north_east_idx = vec![8];
        north_east_idx.extend(9..17);
        let north_east = raw(&chunks, 0, 1, &north_east_idx);

        let scales = scales();
        let config = MergeConfig {
            overlap_fraction: 1.0,
            proximity_factor: 0.01,
            radius_policy: RadiusPolicy::Smaller,
        };
        let merger = ClusterMerger::new(&scales, config).unwrap();

        let a = MergedCluster::from_raw(south_west.clone());
        let b = MergedCluster::from_raw(north_east.clone());
        assert!(!merger.same_port_by_extent(&a, &b));
        assert!(merger.same_port(&a, &b));

        let outcome = merger.merge(&chunks, vec![south_west, north_east]);
        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.clusters[0].len(), 17);
    }

    #[test]
    fn test_distinct_ports_stay_apart() {
        let mut recs = grid(0.0, 0.0, 5, 0.1);
        recs.extend(grid(0.0, 3.0, 5, 0.1));
        let chunks = vec![Chunk::new(0, recs)];

        let west = raw(&chunks, 0, 0, &(0..25).collect::<Vec<_>>());
        let east = raw(&chunks, 0, 0, &(25..50).collect::<Vec<_>>());

        let scales = scales();
        let merger = ClusterMerger::new(&scales, MergeConfig::default()).unwrap();
        let outcome = merger.merge(&chunks, vec![east, west]);

        assert_eq!(outcome.clusters.len(), 2);
        assert_eq!(outcome.merges, 0);
        assert_eq!(outcome.clusters[0].members()[0], PointId::new(0, 0));
        assert_eq!(outcome.clusters[1].members()[0], PointId::new(0, 25));
    }

    #[test]
    fn test_radius_policy_decides_close_calls() {
        // A big port and a small cluster just outside it. The big port's radius covers the gap,
        // the small one's doesn't.
        let mut recs = grid(0.0, 0.0, 10, 0.1); // 0.9 x 0.9 km
        recs.extend(grid(0.4, 1.1, 2, 0.05)); // 0.05 x 0.05 km
        let chunks = vec![Chunk::new(0, recs)];

        let big = raw(&chunks, 0, 0, &(0..100).collect::<Vec<_>>());
        let small = raw(&chunks, 0, 1, &(100..104).collect::<Vec<_>>());
        let gap = big.centroid.distance_km(small.centroid);
        let big_r = big.bbox.characteristic_radius_km();
        assert!(gap < 1.5 * big_r);

        let scales = scales();

        let larger = ClusterMerger::new(&scales, merge_config(RadiusPolicy::Larger)).unwrap();
        let outcome = larger.merge(&chunks, vec![big.clone(), small.clone()]);
        assert_eq!(outcome.clusters.len(), 1);

        let smaller = ClusterMerger::new(&scales, merge_config(RadiusPolicy::Smaller)).unwrap();
        let outcome = smaller.merge(&chunks, vec![big, small]);
        assert_eq!(outcome.clusters.len(), 2);
    }

    #[test]
    fn test_merging_is_transitive() {
        // A chain of clusters, each only close enough to its neighbors.
        let mut recs = vec![];
        for k in 0..5 {
            recs.extend(grid(0.0, 0.15 * k as f64, 3, 0.1));
        }
        let chunks = vec![Chunk::new(0, recs)];

        let raws: Vec<RawCluster> = (0..5)
            .map(|k| raw(&chunks, 0, 1, &((9 * k)..(9 * k + 9)).collect::<Vec<_>>()))
            .collect();

        let scales = scales();
        let merger = ClusterMerger::new(&scales, merge_config(RadiusPolicy::Larger)).unwrap();

        // First and last are not directly related.
        let first = MergedCluster::from_raw(raws[0].clone());
        let last = MergedCluster::from_raw(raws[4].clone());
        assert!(!merger.same_port(&first, &last));

        let outcome = merger.merge(&chunks, raws);
        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.clusters[0].len(), 45);
        assert_eq!(outcome.merges, 4);
    }

    #[test]
    fn test_small_merged_clusters_are_discarded() {
        let mut recs = grid(0.0, 0.0, 2, 0.05); // 4 records
        recs.extend(grid(0.0, 5.0, 1, 0.05)); // 1 record
        let chunks = vec![Chunk::new(0, recs)];

        let ok = raw(&chunks, 0, 1, &[0, 1, 2, 3]);
        let tiny = raw(&chunks, 0, 1, &[4]);

        let scales = scales();
        let merger = ClusterMerger::new(&scales, MergeConfig::default()).unwrap();
        let outcome = merger.merge(&chunks, vec![ok, tiny]);

        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.discarded.len(), 1);
        assert_eq!(outcome.discarded[0].len(), 1);
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let mut recs = vec![];
        for k in 0..4 {
            recs.extend(grid(0.0, 0.15 * k as f64, 3, 0.1));
        }
        recs.extend(grid(4.0, 4.0, 4, 0.1));
        let chunks = vec![Chunk::new(0, recs)];

        let mut raws: Vec<RawCluster> = (0..4)
            .map(|k| raw(&chunks, 0, k % 2, &((9 * k)..(9 * k + 9)).collect::<Vec<_>>()))
            .collect();
        raws.push(raw(&chunks, 0, 0, &(36..52).collect::<Vec<_>>()));

        let scales = scales();
        let merger = ClusterMerger::new(&scales, MergeConfig::default()).unwrap();

        let once = merger.merge(&chunks, raws);
        let twice = merger.remerge(&chunks, once.clusters.clone());

        assert_eq!(twice.clusters, once.clusters);
        assert!(twice.discarded.is_empty());
        assert_eq!(twice.merges, 0);
        assert_eq!(twice.passes, 1);
    }

    #[test]
    fn test_overlap_fraction() {
        let a = BoundingBox {
            ll: Coord { lat: 0.0, lon: 0.0 },
            ur: Coord { lat: 0.02, lon: 0.02 },
        };
        let b = BoundingBox {
            ll: Coord { lat: 0.01, lon: 0.0 },
            ur: Coord { lat: 0.03, lon: 0.02 },
        };
        let far = BoundingBox {
            ll: Coord { lat: 1.0, lon: 1.0 },
            ur: Coord { lat: 1.01, lon: 1.01 },
        };

        assert!((overlap_fraction(&a, &b) - 0.5).abs() < 1.0e-6);
        assert!((overlap_fraction(&a, &a) - 1.0).abs() < 1.0e-12);
        assert_eq!(overlap_fraction(&a, &far), 0.0);

        let inside = Coord { lat: 0.01, lon: 0.01 }.bounding_box();
        assert_eq!(overlap_fraction(&a, &inside), 1.0);
        assert_eq!(overlap_fraction(&far, &inside), 0.0);
    }

    #[test]
    fn test_union_find_groups() {
        let mut uf = UnionFind::new(6);
        uf.union(4, 1);
        uf.union(5, 2);
        uf.union(2, 4);

        assert_eq!(uf.groups(), vec![vec![0], vec![1, 2, 4, 5], vec![3]]);
        assert_eq!(merge_sorted(&[1, 3, 5], &[2, 3, 6]), vec![1, 2, 3, 5, 6]);
    }
}
