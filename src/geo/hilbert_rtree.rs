use super::*;

const RTREE_CHILDREN_PER_NODE: usize = 8;
const HILBERT_ITERATIONS: u32 = 16;

#[derive(Debug)]
enum RTreeNode {
    Node {
        bbox: BoundingBox,
        children: Vec<RTreeNode>,
    },
    Leaf {
        bbox: BoundingBox,
        hilbert_num: u64,
        index: usize,
    },
}

impl RTreeNode {
    fn bounding_box(&self) -> BoundingBox {
        match self {
            Self::Node { bbox, .. } => *bbox,
            Self::Leaf { bbox, .. } => *bbox,
        }
    }

    fn new_nodes(children: Vec<Self>) -> Self {
        let bbox = children
            .iter()
            .map(|c| c.bounding_box())
            .fold(BoundingBox::EMPTY, |acc, child_box| acc.union(&child_box));

        Self::Node { bbox, children }
    }

    /// Recursively collect the indexes of all the leaves with bounding boxes that overlap
    /// `region`.
    fn query(&self, region: &BoundingBox, buffer: &mut Vec<usize>) {
        if !self.bounding_box().overlap(region, 0.0) {
            return;
        }

        match self {
            Self::Leaf { index, .. } => buffer.push(*index),
            Self::Node { children, .. } => {
                for child in children {
                    child.query(region, buffer);
                }
            }
        }
    }
}

/// A static, packed R-tree over a slice of [Geo] items.
///
/// The leaves are sorted by the distance along a Hilbert curve of the item centroids and then
/// packed [RTREE_CHILDREN_PER_NODE] to a node, level by level, so nearby items end up in the
/// same branches. The tree only stores indexes into the slice it was built for.
#[derive(Debug)]
pub struct HilbertRTree {
    root: Option<RTreeNode>,
    len: usize,
}

impl HilbertRTree {
    /// Build a tree for the provided items.
    pub fn build_for<T: Geo>(data: &[T]) -> Self {
        if data.is_empty() {
            return HilbertRTree { root: None, len: 0 };
        }

        let data_domain = Self::build_domain(data);
        let hc = HilbertCurve::new(HILBERT_ITERATIONS, data_domain);

        // Build the leaf nodes - level 0
        let mut leaves = Vec::with_capacity(data.len());
        for (index, item) in data.iter().enumerate() {
            let bbox = item.bounding_box();
            let hilbert_num = hc.translate_to_curve_distance(item.centroid());
            leaves.push(RTreeNode::Leaf {
                bbox,
                hilbert_num,
                index,
            });
        }

        // Sort the leaf nodes by Hilbert number. This is how we get locality for the parent nodes.
        leaves.sort_by_key(|leaf| match leaf {
            RTreeNode::Leaf {
                hilbert_num, index, ..
            } => (*hilbert_num, *index),
            RTreeNode::Node { .. } => (u64::MAX, usize::MAX),
        });

        let mut level_nodes = leaves;
        while level_nodes.len() > 1 {
            let child_nodes = level_nodes;
            level_nodes = Vec::with_capacity(child_nodes.len() / RTREE_CHILDREN_PER_NODE + 1);

            let mut children = Vec::with_capacity(RTREE_CHILDREN_PER_NODE);
            for child_node in child_nodes.into_iter() {
                children.push(child_node);

                if children.len() == RTREE_CHILDREN_PER_NODE {
                    level_nodes.push(RTreeNode::new_nodes(children));
                    children = Vec::with_capacity(RTREE_CHILDREN_PER_NODE);
                }
            }

            if !children.is_empty() {
                level_nodes.push(RTreeNode::new_nodes(children));
            }
        }

        debug_assert_eq!(level_nodes.len(), 1);
        let root = level_nodes.into_iter().next();

        HilbertRTree {
            root,
            len: data.len(),
        }
    }

    /// Get the indexes of all items with bounding boxes that overlap `region`.
    ///
    /// The buffer is cleared first, and on return holds the indexes in ascending order.
    pub fn query(&self, region: &BoundingBox, buffer: &mut Vec<usize>) {
        buffer.clear();

        if let Some(ref root) = self.root {
            root.query(region, buffer);
        }

        buffer.sort_unstable();
    }

    /// The number of items indexed by this tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn build_domain<T: Geo>(data: &[T]) -> BoundingBox {
        data.iter()
            .map(|item| item.bounding_box())
            .fold(BoundingBox::EMPTY, |acc, item_rect| acc.union(&item_rect))
    }
}

#[derive(Debug)]
struct HilbertCurve {
    // The number of iterations to use for this curve.
    //
    // This number can be a maximum of 31. If it is larger than 31, we won't have enough bits to do
    // the binary transformation correctly.
    iterations: u32,

    // This is the domain that the curve will cover.
    domain: BoundingBox,

    // These are needed for fast transformations from the "domain" space into the "Hilbert" space.
    max_dim: u32,
    width: f64,
    height: f64,
}

impl HilbertCurve {
    fn calc_max_dim_for_iterations(iterations: u32) -> u32 {
        (1u32 << iterations) - 1u32
    }

    fn new(iterations: u32, domain: BoundingBox) -> Self {
        // iterations must be in the range 1 to 31 inclusive
        debug_assert!((1..=31).contains(&iterations));

        let max_dim = Self::calc_max_dim_for_iterations(iterations);

        // All points on a line (or one point) leave a zero width or height. Any positive value
        // works then since every coordinate maps to the first cell along that axis.
        let width = domain.ur.lon - domain.ll.lon;
        let width = if width > 0.0 { width } else { 1.0 };
        let height = domain.ur.lat - domain.ll.lat;
        let height = if height > 0.0 { height } else { 1.0 };

        Self {
            iterations,
            domain,
            max_dim,
            width,
            height,
        }
    }

    fn coords_to_integer(&self, HilbertCoord { x, y }: HilbertCoord) -> u64 {
        debug_assert!(x <= self.max_dim);
        debug_assert!(y <= self.max_dim);

        // Side length of the curve's grid.
        let n = 1u64 << self.iterations;
        debug_assert_eq!(n, u64::from(self.max_dim) + 1);
        let mut x = u64::from(x);
        let mut y = u64::from(y);

        let mut hilbert_int = 0u64;
        let mut s = n / 2;
        while s > 0 {
            let rx = u64::from((x & s) > 0);
            let ry = u64::from((y & s) > 0);
            hilbert_int += s * s * ((3 * rx) ^ ry);

            // Rotate the quadrant so the next level has the curve in standard orientation.
            if ry == 0 {
                if rx == 1 {
                    x = n - 1 - x;
                    y = n - 1 - y;
                }
                std::mem::swap(&mut x, &mut y);
            }

            s /= 2;
        }

        hilbert_int
    }

    fn translate_to_hilbert_coords(&self, coord: Coord) -> HilbertCoord {
        let hilbert_edge_len = (self.max_dim + 1) as f64;

        let x = ((coord.lon - self.domain.ll.lon) / self.width * hilbert_edge_len).max(0.0) as u32;
        let y = ((coord.lat - self.domain.ll.lat) / self.height * hilbert_edge_len).max(0.0) as u32;

        HilbertCoord {
            x: x.min(self.max_dim),
            y: y.min(self.max_dim),
        }
    }

    fn translate_to_curve_distance(&self, coord: Coord) -> u64 {
        let hilbert_coords = self.translate_to_hilbert_coords(coord);
        self.coords_to_integer(hilbert_coords)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HilbertCoord {
    x: u32,
    y: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coordinate_to_integer_conversions() {
        let domain = BoundingBox {
            ll: Coord { lat: 0.0, lon: 0.0 },
            ur: Coord { lat: 1.0, lon: 1.0 },
        };

        let test_coords_i1 = [
            HilbertCoord { x: 0, y: 0 },
            HilbertCoord { x: 0, y: 1 },
            HilbertCoord { x: 1, y: 1 },
            HilbertCoord { x: 1, y: 0 },
        ];

        let test_coords_i2 = [
            HilbertCoord { x: 0, y: 0 },
            HilbertCoord { x: 1, y: 0 },
            HilbertCoord { x: 1, y: 1 },
            HilbertCoord { x: 0, y: 1 },
            HilbertCoord { x: 0, y: 2 },
            HilbertCoord { x: 0, y: 3 },
            HilbertCoord { x: 1, y: 3 },
            HilbertCoord { x: 1, y: 2 },
            HilbertCoord { x: 2, y: 2 },
            HilbertCoord { x: 2, y: 3 },
            HilbertCoord { x: 3, y: 3 },
            HilbertCoord { x: 3, y: 2 },
            HilbertCoord { x: 3, y: 1 },
            HilbertCoord { x: 2, y: 1 },
            HilbertCoord { x: 2, y: 0 },
            HilbertCoord { x: 3, y: 0 },
        ];

        let hc = HilbertCurve::new(1, domain);
        for (h, coords) in test_coords_i1.iter().enumerate() {
            assert_eq!(hc.coords_to_integer(*coords), h as u64);
        }

        let hc = HilbertCurve::new(2, domain);
        for (h, coords) in test_coords_i2.iter().enumerate() {
            assert_eq!(hc.coords_to_integer(*coords), h as u64);
        }
    }

    #[test]
    fn test_curve_ends_at_last_cell() {
        let domain = BoundingBox {
            ll: Coord { lat: 0.0, lon: 0.0 },
            ur: Coord { lat: 1.0, lon: 1.0 },
        };

        for iterations in [1, 3, 8, 16, 31] {
            let hc = HilbertCurve::new(iterations, domain);
            let n = 1u64 << iterations;
            let last = HilbertCoord { x: hc.max_dim, y: 0 };

            assert_eq!(hc.coords_to_integer(HilbertCoord { x: 0, y: 0 }), 0);
            assert_eq!(hc.coords_to_integer(last), n * n - 1);
        }
    }

    #[test]
    #[rustfmt::skip]
    fn test_domain_mapping(){
        let domain = BoundingBox{ll : Coord{lon: 0.0, lat: 0.0}, ur : Coord{lon: 1.0, lat: 1.0}};

        // Test values for the N=1 Hilbert curve on the unit square.
        let n1_pairs = [
            (Coord{lon: 0.25, lat: 0.25},  0u64),
            (Coord{lon: 0.25, lat: 0.75},  1),
            (Coord{lon: 0.75, lat: 0.75},  2),
            (Coord{lon: 0.75, lat: 0.25},  3),
            // The upper edge of the domain is clamped into the last cell.
            (Coord{lon: 1.00, lat: 0.00},  3),
        ];

        let hc = HilbertCurve::new(1, domain);
        for (coord, h) in n1_pairs {
            assert_eq!(hc.translate_to_curve_distance(coord), h);
        }
    }

    #[test]
    fn test_degenerate_domain() {
        let domain = Coord { lat: 55.0, lon: 10.0 }.bounding_box();
        let hc = HilbertCurve::new(HILBERT_ITERATIONS, domain);
        assert_eq!(hc.translate_to_curve_distance(domain.ll), 0);
    }

    #[test]
    fn test_query_matches_brute_force() {
        let mut points = Vec::new();
        for i in 0..40 {
            for j in 0..25 {
                points.push(Coord {
                    lat: 55.0 + 0.01 * i as f64,
                    lon: 10.0 + 0.013 * j as f64,
                });
            }
        }

        let tree = HilbertRTree::build_for(&points);
        assert_eq!(tree.len(), points.len());

        let regions = [
            BoundingBox {
                ll: Coord { lat: 55.05, lon: 10.02 },
                ur: Coord { lat: 55.11, lon: 10.1 },
            },
            Coord { lat: 55.2, lon: 10.13 }.bounding_box().expanded_by_km(1.5),
            BoundingBox {
                ll: Coord { lat: 60.0, lon: 10.0 },
                ur: Coord { lat: 61.0, lon: 11.0 },
            },
        ];

        let mut buffer = Vec::new();
        for region in regions {
            tree.query(&region, &mut buffer);

            let expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| region.contains(**p))
                .map(|(i, _)| i)
                .collect();

            assert_eq!(buffer, expected);
        }
    }

    #[test]
    fn test_empty_tree() {
        let points: Vec<Coord> = vec![];
        let tree = HilbertRTree::build_for(&points);
        assert!(tree.is_empty());

        let mut buffer = vec![1, 2, 3];
        tree.query(&BoundingBox::EMPTY, &mut buffer);
        assert!(buffer.is_empty());
    }
}
