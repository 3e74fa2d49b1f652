/*!
 * The whole run, from chunks of position reports to a list of ports.
 *
 * Chunks are clustered at every scale, the raw clusters are merged into candidate ports, and
 * every candidate is either accepted as a port or rejected. Each stage hands its complete output
 * to the next, and the counts from every stage are gathered into a [RunSummary].
 */
use crate::{
    chunk::Chunk,
    cluster::RawCluster,
    config::PortFinderConfig,
    error::{ConfigError, PortFindResult},
    merge::ClusterMerger,
    multiscale::{MultiScaleClusterer, ScaleStats},
    port::{PortDescriptor, PortGeometryResolver, Rejection, Resolution},
};
use rustc_hash::FxHashMap as HashMap;
use std::{
    fmt::{self, Display},
    time::{Duration, Instant},
};
use strum::IntoEnumIterator;

static_assertions::assert_impl_all!(PortFinder: Send, Sync);
static_assertions::assert_impl_all!(Chunk: Send, Sync);
static_assertions::assert_impl_all!(PortReport: Send, Sync);

/// Counts from every stage of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Number of chunks handed to the run, including skipped ones.
    pub chunks: usize,
    /// Positions in the input of chunks that could not be used.
    pub skipped_chunks: Vec<usize>,
    /// Number of position reports in the usable chunks.
    pub points: usize,
    /// Clusters and noise for each scale, in configuration order.
    pub scales: Vec<ScaleStats>,
    /// Raw clusters over all chunks and scales.
    pub raw_clusters: usize,
    /// Raw clusters absorbed into another cluster by the merger.
    pub merges: usize,
    /// Merged clusters dropped for having too few members.
    pub discarded: usize,
    /// Ports accepted.
    pub accepted: usize,
    rejected: HashMap<Rejection, usize>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of candidate ports rejected for `reason`.
    pub fn rejected(&self, reason: Rejection) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// Number of candidate ports rejected for any reason.
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    fn add_rejection(&mut self, reason: Rejection) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(
            f,
            "          Chunks: {:>9} ({} skipped)",
            self.chunks,
            self.skipped_chunks.len()
        )?;
        writeln!(f, "          Points: {:>9}", self.points)?;
        for scale in &self.scales {
            writeln!(
                f,
                "{:>16}: {:>9} clusters {:>9} noise {:>7.1}s",
                scale.name,
                scale.clusters,
                scale.noise,
                scale.elapsed.as_secs_f64()
            )?;
        }
        writeln!(f, "    Raw clusters: {:>9}", self.raw_clusters)?;
        writeln!(f, "          Merges: {:>9}", self.merges)?;
        writeln!(f, "       Discarded: {:>9}", self.discarded)?;
        for reason in Rejection::iter() {
            writeln!(f, "{:>16}: {:>9}", reason, self.rejected(reason))?;
        }
        writeln!(f, "           Ports: {:>9}", self.accepted)?;
        writeln!(f, "         Elapsed: {:>9.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// The ports found in a run and how they were found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortReport {
    /// Accepted ports, largest first.
    pub ports: Vec<PortDescriptor>,
    pub summary: RunSummary,
}

/// Finds ports in chunks of position reports.
#[derive(Debug, Clone)]
pub struct PortFinder {
    config: PortFinderConfig,
}

impl PortFinder {
    /// Check the configuration and get ready for a run.
    pub fn new(config: PortFinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(PortFinder { config })
    }

    pub fn config(&self) -> &PortFinderConfig {
        &self.config
    }

    /**
     * Find the ports in a set of chunks.
     *
     * Chunks that can't be used are skipped and listed in the summary. The only errors are
     * failures to start the worker threads.
     *
     * #Arguments
     * chunks - the position reports, in the order the chunks were written.
     */
    pub fn find_ports(&self, chunks: &[Chunk]) -> PortFindResult<PortReport> {
        let start = Instant::now();
        let config = &self.config;

        log::info!(
            "Finding ports in {} chunks at {} scales",
            chunks.len(),
            config.scales.len()
        );

        let clusterer = MultiScaleClusterer::new(&config.scales, config.threads)?;
        let merger = ClusterMerger::new(&config.scales, config.merge)?;
        let resolver = PortGeometryResolver::new(config)?;

        let output = clusterer.run(chunks)?;

        let mut summary = RunSummary {
            chunks: chunks.len(),
            points: chunks
                .iter()
                .enumerate()
                .filter(|(chunk_pos, _)| !output.skipped_chunks.contains(chunk_pos))
                .map(|(_, chunk)| chunk.len())
                .sum(),
            raw_clusters: output.num_clusters(),
            ..RunSummary::default()
        };

        let raw: Vec<RawCluster> = output
            .lists
            .into_iter()
            .flat_map(|list| list.clusters)
            .collect();
        summary.scales = output.scale_stats;
        summary.skipped_chunks = output.skipped_chunks;

        log::info!("Merging {} raw clusters", raw.len());
        let outcome = merger.merge(chunks, raw);
        summary.merges = outcome.merges;
        summary.discarded = outcome.discarded.len();

        let mut ports = Vec::with_capacity(outcome.clusters.len());
        for cluster in &outcome.clusters {
            match resolver.resolve(cluster, chunks) {
                Resolution::Port(port) => ports.push(port),
                Resolution::Rejected { reason, .. } => summary.add_rejection(reason),
            }
        }

        ports.sort_by(|a, b| b.area_km2.total_cmp(&a.area_km2));
        summary.accepted = ports.len();
        summary.elapsed = start.elapsed();

        log::info!(
            "Found {} ports, rejected {} candidates (took {:.1}s)",
            summary.accepted,
            summary.total_rejected(),
            summary.elapsed.as_secs_f64()
        );

        Ok(PortReport { ports, summary })
    }
}
