use super::{Coord, DEG2RAD, KM_PER_DEGREE};

/// Compute the convex hull of a set of coordinates.
///
/// Uses the monotone chain algorithm in the longitude/latitude plane, which is fine for the small
/// regions this crate deals with since the local projection used for areas is affine. Vertices
/// come back in counter-clockwise order with no duplicated or collinear points. If there are
/// fewer than three distinct points, or they all lie on a line, the result has fewer than three
/// vertices.
pub fn convex_hull(points: &[Coord]) -> Vec<Coord> {
    let mut pts: Vec<Coord> = points.iter().copied().filter(Coord::is_finite).collect();
    pts.sort_by(|a, b| a.lon.total_cmp(&b.lon).then(a.lat.total_cmp(&b.lat)));
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Coord> = Vec::with_capacity(pts.len() + 1);

    // Lower hull
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    // The last point is the same as the first.
    hull.pop();

    hull
}

/// Area of a simple polygon in square kilometers.
///
/// The vertices are projected onto a plane with an equirectangular projection around
/// `ref_lat` and the area is found with the shoelace formula. Fewer than three vertices have no
/// area.
pub fn projected_polygon_area_km2(vertices: &[Coord], ref_lat: f64) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let x_scale = KM_PER_DEGREE * f64::cos(ref_lat * DEG2RAD);
    let origin = vertices[0];
    let project = |c: &Coord| {
        (
            (c.lon - origin.lon) * x_scale,
            (c.lat - origin.lat) * KM_PER_DEGREE,
        )
    };

    let mut twice_area = 0.0;
    for (i, vertex) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];
        let (x0, y0) = project(vertex);
        let (x1, y1) = project(next);
        twice_area += x0 * y1 - x1 * y0;
    }

    twice_area.abs() / 2.0
}

fn cross(o: Coord, a: Coord, b: Coord) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}
