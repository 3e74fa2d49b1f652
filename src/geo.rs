/*!
 * Geographic calculations.
 *
 * The data sets this crate works with are regional extracts, so simple (approximate)
 * calculations are good enough. Distances use the haversine formula on a spherical Earth and
 * areas use a local equirectangular projection. Wrapping around the antimeridian is not handled.
 */
pub use hilbert_rtree::HilbertRTree;
pub use hull::{convex_hull, projected_polygon_area_km2};

mod hilbert_rtree;
mod hull;

/// Mean radius of the Earth used for every distance calculation in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of arc along a great circle.
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * DEG2RAD;

const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/**
 * The simple great circle distance calculation.
 *
 * #Arguments
 * * lat1 - the latitude of the first point in degrees.
 * * lon1 - the longitude of the first point in degrees.
 * * lat2 - the latitude of the second point in degrees.
 * * lon2 - the longitude of the second point in degrees.
 *
 * #Returns
 * The distance between the points in kilometers.
 */
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1 * DEG2RAD;
    let lon1_r = lon1 * DEG2RAD;
    let lat2_r = lat2 * DEG2RAD;
    let lon2_r = lon2 * DEG2RAD;

    let dlat2 = (lat2_r - lat1_r) / 2.0;
    let dlon2 = (lon2_r - lon1_r) / 2.0;

    let sin2_dlat = f64::powi(f64::sin(dlat2), 2);
    let sin2_dlon = f64::powi(f64::sin(dlon2), 2);

    // Rounding can push the argument a hair past 1.0 for antipodal points.
    let h = (sin2_dlat + sin2_dlon * f64::cos(lat1_r) * f64::cos(lat2_r)).min(1.0);

    let arc = 2.0 * f64::asin(f64::sqrt(h));

    arc * EARTH_RADIUS_KM
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Great circle distance to another coordinate in kilometers.
    pub fn distance_km(&self, other: Coord) -> f64 {
        great_circle_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Arithmetic mean of a set of coordinates, `None` if there are none.
    pub fn mean<I: IntoIterator<Item = Coord>>(coords: I) -> Option<Coord> {
        let mut count = 0usize;
        let mut lat = 0.0;
        let mut lon = 0.0;
        for coord in coords {
            lat += coord.lat;
            lon += coord.lon;
            count += 1;
        }

        if count == 0 {
            None
        } else {
            Some(Coord {
                lat: lat / count as f64,
                lon: lon / count as f64,
            })
        }
    }
}

/// An axis aligned (in latitude and longitude) box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The lower left (southwest) corner.
    pub ll: Coord,
    /// The upper right (northeast) corner.
    pub ur: Coord,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// A box that contains nothing. Expanding it by any coordinate yields a box around that
    /// coordinate alone.
    pub const EMPTY: BoundingBox = BoundingBox {
        ll: Coord {
            lat: f64::INFINITY,
            lon: f64::INFINITY,
        },
        ur: Coord {
            lat: f64::NEG_INFINITY,
            lon: f64::NEG_INFINITY,
        },
    };

    /// The smallest box containing all the coordinates.
    pub fn from_coords<I: IntoIterator<Item = Coord>>(coords: I) -> Self {
        let mut bbox = Self::EMPTY;
        for coord in coords {
            bbox.expand_to(coord);
        }
        bbox
    }

    /// Grow the box, if needed, so it contains `coord`.
    pub fn expand_to(&mut self, coord: Coord) {
        self.ll.lat = self.ll.lat.min(coord.lat);
        self.ll.lon = self.ll.lon.min(coord.lon);
        self.ur.lat = self.ur.lat.max(coord.lat);
        self.ur.lon = self.ur.lon.max(coord.lon);
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        BoundingBox {
            ll: Coord {
                lat: self.ll.lat.min(other.ll.lat),
                lon: self.ll.lon.min(other.ll.lon),
            },
            ur: Coord {
                lat: self.ur.lat.max(other.ur.lat),
                lon: self.ur.lon.max(other.ur.lon),
            },
        }
    }

    /// True if nothing has ever been added to this box.
    pub fn is_empty(&self) -> bool {
        !(self.ll.lat <= self.ur.lat && self.ll.lon <= self.ur.lon)
    }

    /// Check if these boxes overlap, `eps` is a tolerance in degrees. Touching boxes overlap.
    pub fn overlap(&self, other: &Self, eps: f64) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        !(self.ll.lat > other.ur.lat + eps
            || self.ur.lat < other.ll.lat - eps
            || self.ll.lon > other.ur.lon + eps
            || self.ur.lon < other.ll.lon - eps)
    }

    /// The region common to both boxes, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let bbox = BoundingBox {
            ll: Coord {
                lat: self.ll.lat.max(other.ll.lat),
                lon: self.ll.lon.max(other.ll.lon),
            },
            ur: Coord {
                lat: self.ur.lat.min(other.ur.lat),
                lon: self.ur.lon.min(other.ur.lon),
            },
        };

        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    /// Is the coordinate inside or on the edge of this box.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lat >= self.ll.lat
            && coord.lat <= self.ur.lat
            && coord.lon >= self.ll.lon
            && coord.lon <= self.ur.lon
    }

    /// Approximate area in square kilometers.
    ///
    /// Uses an equirectangular projection with the longitude scaled by the cosine of the middle
    /// latitude of the box.
    pub fn area_km2(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let mid_lat = (self.ll.lat + self.ur.lat) / 2.0;
        let height = (self.ur.lat - self.ll.lat) * KM_PER_DEGREE;
        let width = (self.ur.lon - self.ll.lon) * KM_PER_DEGREE * f64::cos(mid_lat * DEG2RAD);

        height * width
    }

    /// Radius of a circle with the same area as this box.
    pub fn characteristic_radius_km(&self) -> f64 {
        (self.area_km2() / std::f64::consts::PI).sqrt()
    }

    /// Grow the box in every direction far enough to hold every point within `km` of it.
    ///
    /// The longitude margin is computed at the most poleward latitude the grown box reaches, so
    /// it is never too small. Near the poles it covers every longitude.
    pub fn expanded_by_km(&self, km: f64) -> Self {
        if self.is_empty() {
            return *self;
        }

        let dlat = km / KM_PER_DEGREE;
        let max_abs_lat = self.ll.lat.abs().max(self.ur.lat.abs()) + dlat;

        let dlon = if max_abs_lat >= 89.999 {
            360.0
        } else {
            (dlat / f64::cos(max_abs_lat * DEG2RAD)).min(360.0)
        };

        BoundingBox {
            ll: Coord {
                lat: self.ll.lat - dlat,
                lon: self.ll.lon - dlon,
            },
            ur: Coord {
                lat: self.ur.lat + dlat,
                lon: self.ur.lon + dlon,
            },
        }
    }
}

/// Things with a location and an extent.
pub trait Geo {
    fn centroid(&self) -> Coord;
    fn bounding_box(&self) -> BoundingBox;
}

impl Geo for Coord {
    fn centroid(&self) -> Coord {
        *self
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox { ll: *self, ur: *self }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_great_circle_distance() {
        // One degree of latitude along a meridian.
        let d = great_circle_distance(55.0, 10.0, 56.0, 10.0);
        assert!((d - KM_PER_DEGREE).abs() < 1.0e-9);

        // Symmetric
        let d1 = great_circle_distance(55.68, 12.57, 57.05, 9.92);
        let d2 = great_circle_distance(57.05, 9.92, 55.68, 12.57);
        assert_eq!(d1, d2);

        // Copenhagen to Aalborg is roughly 225 km.
        assert!((d1 - 225.0).abs() < 5.0);

        assert_eq!(great_circle_distance(55.0, 10.0, 55.0, 10.0), 0.0);
    }

    #[test]
    fn test_bounding_box_overlap() {
        let a = BoundingBox {
            ll: Coord { lat: 55.0, lon: 10.0 },
            ur: Coord { lat: 56.0, lon: 11.0 },
        };
        let b = BoundingBox {
            ll: Coord { lat: 55.5, lon: 10.5 },
            ur: Coord { lat: 56.5, lon: 11.5 },
        };
        let c = BoundingBox {
            ll: Coord { lat: 56.0, lon: 11.0 },
            ur: Coord { lat: 57.0, lon: 12.0 },
        };
        let d = BoundingBox {
            ll: Coord { lat: 58.0, lon: 10.0 },
            ur: Coord { lat: 59.0, lon: 11.0 },
        };

        assert!(a.overlap(&b, 0.0));
        assert!(b.overlap(&a, 0.0));

        // Touching at a corner counts.
        assert!(a.overlap(&c, 0.0));
        assert!(!a.overlap(&d, 0.0));
        assert!(!a.overlap(&BoundingBox::EMPTY, 1.0));

        let i = a.intersection(&b).unwrap();
        assert_eq!(i.ll, Coord { lat: 55.5, lon: 10.5 });
        assert_eq!(i.ur, Coord { lat: 56.0, lon: 11.0 });
        assert!(a.intersection(&d).is_none());
    }

    #[test]
    fn test_bounding_box_area() {
        assert_eq!(BoundingBox::EMPTY.area_km2(), 0.0);

        let equator = BoundingBox {
            ll: Coord { lat: -0.5, lon: 0.0 },
            ur: Coord { lat: 0.5, lon: 1.0 },
        };
        assert!((equator.area_km2() - KM_PER_DEGREE * KM_PER_DEGREE).abs() < 1.0e-6);

        // Same box in degrees at 60N is about half the area.
        let north = BoundingBox {
            ll: Coord { lat: 59.5, lon: 0.0 },
            ur: Coord { lat: 60.5, lon: 1.0 },
        };
        let ratio = north.area_km2() / equator.area_km2();
        assert!((ratio - 0.5).abs() < 1.0e-3);

        let pt = Coord { lat: 55.0, lon: 10.0 }.bounding_box();
        assert_eq!(pt.area_km2(), 0.0);
        assert_eq!(pt.characteristic_radius_km(), 0.0);
    }

    #[test]
    fn test_expanded_by_km_holds_circle() {
        let center = Coord { lat: 57.0, lon: 10.0 };
        let region = center.bounding_box().expanded_by_km(2.0);

        for step in 0..360 {
            let bearing = (step as f64) * DEG2RAD;
            // Walk a little less than 2 km in every direction with the flat approximation
            // and confirm the box holds every point that is truly within 2 km.
            let dlat = 1.99 * bearing.cos() / KM_PER_DEGREE;
            let dlon = 1.99 * bearing.sin() / (KM_PER_DEGREE * (center.lat * DEG2RAD).cos());
            let pt = Coord {
                lat: center.lat + dlat,
                lon: center.lon + dlon,
            };

            if center.distance_km(pt) <= 2.0 {
                assert!(region.contains(pt), "{:?} not in {:?}", pt, region);
            }
        }
    }

    #[test]
    fn test_coord_mean() {
        assert!(Coord::mean(std::iter::empty()).is_none());

        let m = Coord::mean([
            Coord { lat: 1.0, lon: 2.0 },
            Coord { lat: 3.0, lon: 4.0 },
        ])
        .unwrap();
        assert_eq!(m, Coord { lat: 2.0, lon: 3.0 });
    }
}
