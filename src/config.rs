/*!
 * Configuration for a port detection run.
 *
 * Everything the pipeline needs to know is gathered into one [PortFinderConfig] value that is
 * checked once, up front, and then handed to each stage. Nothing is read from global state.
 */
use crate::error::ConfigError;
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

/// Minimum area of a port, smaller clusters are rejected. (5 000 m² is about one small marina.)
pub const MIN_PORT_AREA_KM2: f64 = 0.01;
/// Maximum area of a port, larger clusters are rejected.
pub const MAX_PORT_AREA_KM2: f64 = 20.0;
/// Default fraction of the smaller extent that must be covered for two clusters to be one port.
pub const MERGE_OVERLAP_FRACTION: f64 = 0.5;
/// Default multiple of the characteristic radius within which centroids are one port.
pub const MERGE_PROXIMITY_FACTOR: f64 = 1.5;
/// Name of the category for ports larger than every configured boundary.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// One clustering resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    /// Short identifier, e.g. "major_ports".
    pub name: String,
    /// Human readable description, e.g. "Major Commercial".
    pub label: String,
    /// Neighborhood radius in kilometers.
    pub radius_km: f64,
    /// Points (including the point itself) needed within `radius_km` to be a core point.
    pub min_samples: usize,
}

impl ScaleConfig {
    pub fn new<S: Into<String>, L: Into<String>>(
        name: S,
        label: L,
        radius_km: f64,
        min_samples: usize,
    ) -> Self {
        ScaleConfig {
            name: name.into(),
            label: label.into(),
            radius_km,
            min_samples,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(ConfigError::new(format!(
                "scale {} has radius_km={}, it must be a positive number",
                self.name, self.radius_km
            )));
        }

        if self.min_samples < 1 {
            return Err(ConfigError::new(format!(
                "scale {} has min_samples=0, it must be at least 1",
                self.name
            )));
        }

        Ok(())
    }

    /// The resolutions used to find Danish ports, coarsest first.
    pub fn defaults() -> Vec<ScaleConfig> {
        vec![
            ScaleConfig::new("major_ports", "Major Commercial", 1.0, 150),
            ScaleConfig::new("regional_ports", "Regional", 0.6, 80),
            ScaleConfig::new("local_ports", "Local/Industrial", 0.3, 30),
            ScaleConfig::new("small_harbors", "Small Harbor", 0.1, 20),
        ]
    }
}

/// Parse a scale from `name:radius_km:min_samples`. The label is the name.
impl FromStr for ScaleConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split(':').map(str::trim).collect();

        if parts.len() != 3 || parts[0].is_empty() {
            return Err(ConfigError::new(format!(
                "scale '{}' is not in the form name:radius_km:min_samples",
                s
            )));
        }

        let radius_km: f64 = parts[1]
            .parse()
            .map_err(|_| ConfigError::new(format!("invalid radius_km in scale '{}'", s)))?;
        let min_samples: usize = parts[2]
            .parse()
            .map_err(|_| ConfigError::new(format!("invalid min_samples in scale '{}'", s)))?;

        let scale = ScaleConfig::new(parts[0], parts[0], radius_km, min_samples);
        scale.validate()?;

        Ok(scale)
    }
}

/// One row of the size classification table.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeCategory {
    pub name: String,
    /// Ports with an area strictly less than this belong in this category (if they didn't fit
    /// in a smaller one).
    pub max_area_km2: f64,
}

impl SizeCategory {
    pub fn new<S: Into<String>>(name: S, max_area_km2: f64) -> Self {
        SizeCategory {
            name: name.into(),
            max_area_km2,
        }
    }

    /// The default categories, smallest first.
    pub fn defaults() -> Vec<SizeCategory> {
        vec![
            SizeCategory::new("Small Harbor", 0.1),
            SizeCategory::new("Local/Industrial", 0.5),
            SizeCategory::new("Regional", 2.0),
            SizeCategory::new("Major Commercial", 15.0),
        ]
    }
}

/// Which characteristic radius to scale the centroid proximity test by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum RadiusPolicy {
    /// Use the larger radius of the pair. Favors merging one port that was detected in pieces.
    Larger,
    /// Use the smaller radius of the pair. Favors keeping close neighbors apart.
    Smaller,
}

impl RadiusPolicy {
    pub fn select(&self, left: f64, right: f64) -> f64 {
        match self {
            RadiusPolicy::Larger => left.max(right),
            RadiusPolicy::Smaller => left.min(right),
        }
    }
}

/// Rules for deciding that two clusters describe the same port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Minimum fraction of the smaller bounding box that must overlap the larger one.
    pub overlap_fraction: f64,
    /// Centroids closer than this multiple of the characteristic radius are the same port.
    pub proximity_factor: f64,
    pub radius_policy: RadiusPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            overlap_fraction: MERGE_OVERLAP_FRACTION,
            proximity_factor: MERGE_PROXIMITY_FACTOR,
            radius_policy: RadiusPolicy::Larger,
        }
    }
}

impl MergeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.overlap_fraction > 0.0 && self.overlap_fraction <= 1.0) {
            return Err(ConfigError::new(format!(
                "overlap_fraction={} must be in (0, 1]",
                self.overlap_fraction
            )));
        }

        if !(self.proximity_factor.is_finite() && self.proximity_factor > 0.0) {
            return Err(ConfigError::new(format!(
                "proximity_factor={} must be a positive number",
                self.proximity_factor
            )));
        }

        Ok(())
    }
}

/// Everything needed for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PortFinderConfig {
    /// Clustering resolutions, in priority order. The first one is reported as the detection
    /// scale when a port is found at several.
    pub scales: Vec<ScaleConfig>,
    pub merge: MergeConfig,
    /// Size classification table, ascending by `max_area_km2`.
    pub size_categories: Vec<SizeCategory>,
    /// Category for ports at least as large as the last boundary.
    pub fallback_category: String,
    pub min_port_area_km2: f64,
    pub max_port_area_km2: f64,
    /// Number of worker threads used for clustering.
    pub threads: usize,
}

impl Default for PortFinderConfig {
    fn default() -> Self {
        PortFinderConfig {
            scales: ScaleConfig::defaults(),
            merge: MergeConfig::default(),
            size_categories: SizeCategory::defaults(),
            fallback_category: FALLBACK_CATEGORY.to_owned(),
            min_port_area_km2: MIN_PORT_AREA_KM2,
            max_port_area_km2: MAX_PORT_AREA_KM2,
            threads: num_cpus::get(),
        }
    }
}

impl PortFinderConfig {
    /// Check the whole configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scales.is_empty() {
            return Err(ConfigError::new("at least one scale is required"));
        }

        for (i, scale) in self.scales.iter().enumerate() {
            scale.validate()?;

            if self.scales[..i].iter().any(|other| other.name == scale.name) {
                return Err(ConfigError::new(format!(
                    "scale name {} is used more than once",
                    scale.name
                )));
            }
        }

        self.merge.validate()?;

        let mut previous: Option<&SizeCategory> = None;
        for category in &self.size_categories {
            if !(category.max_area_km2.is_finite() && category.max_area_km2 > 0.0) {
                return Err(ConfigError::new(format!(
                    "size category {} has max_area_km2={}, it must be a positive number",
                    category.name, category.max_area_km2
                )));
            }

            if let Some(prev) = previous {
                if category.max_area_km2 <= prev.max_area_km2 {
                    return Err(ConfigError::new(format!(
                        "size categories must be in ascending order: {} ({}) follows {} ({})",
                        category.name, category.max_area_km2, prev.name, prev.max_area_km2
                    )));
                }
            }

            previous = Some(category);
        }

        if !(self.min_port_area_km2.is_finite() && self.min_port_area_km2 >= 0.0) {
            return Err(ConfigError::new(format!(
                "min_port_area_km2={} must not be negative",
                self.min_port_area_km2
            )));
        }

        if !(self.max_port_area_km2 > self.min_port_area_km2) {
            return Err(ConfigError::new(format!(
                "max_port_area_km2={} must be larger than min_port_area_km2={}",
                self.max_port_area_km2, self.min_port_area_km2
            )));
        }

        if self.threads == 0 {
            return Err(ConfigError::new("at least one worker thread is required"));
        }

        Ok(())
    }
}

impl Display for PortFinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        for scale in &self.scales {
            writeln!(
                f,
                "         Scale: {:<16} radius {:>6.3} km, min_samples {:>5} ({})",
                scale.name, scale.radius_km, scale.min_samples, scale.label
            )?;
        }
        writeln!(f, "   Merge overlap: {:.2}", self.merge.overlap_fraction)?;
        writeln!(
            f,
            " Merge proximity: {:.2} x {} radius",
            self.merge.proximity_factor, self.merge.radius_policy
        )?;
        for category in &self.size_categories {
            writeln!(
                f,
                "        Category: {:<16} < {:.3} km²",
                category.name, category.max_area_km2
            )?;
        }
        writeln!(f, "        Fallback: {}", self.fallback_category)?;
        writeln!(
            f,
            "       Port area: {:.3} - {:.3} km²",
            self.min_port_area_km2, self.max_port_area_km2
        )?;
        writeln!(f, "         Threads: {}", self.threads)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}
