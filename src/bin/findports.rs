use clap::Parser;
use log::LevelFilter;
use portfind::{
    Chunk, MergeConfig, PortFindResult, PortFinder, PortFinderConfig, RadiusPolicy, ScaleConfig,
    MAX_PORT_AREA_KM2, MERGE_OVERLAP_FRACTION, MERGE_PROXIMITY_FACTOR, MIN_PORT_AREA_KM2,
};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Find ports in chunks of cleaned AIS position reports.
///
/// Every CSV file under the chunk directory is loaded as one chunk. The reports are clustered at
/// several scales, the clusters are merged into ports, and the ports are listed largest first.
///
#[derive(Debug, Parser)]
#[clap(name = "findports")]
#[clap(author, version, about)]
struct FindPortsOptionsInit {
    /// The directory holding the chunk files.
    ///
    /// If this is not specified, then the program will check for it in the "PORTFIND_CHUNKS"
    /// environment variable.
    #[clap(env = "PORTFIND_CHUNKS")]
    chunk_dir: PathBuf,

    /// A clustering scale as name:radius_km:min_samples.
    ///
    /// Repeat for several scales, the first one given has priority. If no scales are given the
    /// defaults for Danish waters are used.
    #[clap(short, long = "scale", parse(try_from_str))]
    scales: Vec<ScaleConfig>,

    /// Fraction of the smaller cluster's extent that must overlap for clusters to merge.
    #[clap(long, default_value_t = MERGE_OVERLAP_FRACTION)]
    overlap_fraction: f64,

    /// Clusters closer than this multiple of their characteristic radius are merged.
    #[clap(long, default_value_t = MERGE_PROXIMITY_FACTOR)]
    proximity_factor: f64,

    /// Which radius of a pair of clusters the proximity test uses, larger or smaller.
    #[clap(long, default_value_t = RadiusPolicy::Larger)]
    radius_policy: RadiusPolicy,

    /// Smallest area of a port in km².
    #[clap(long, default_value_t = MIN_PORT_AREA_KM2)]
    min_area: f64,

    /// Largest area of a port in km².
    #[clap(long, default_value_t = MAX_PORT_AREA_KM2)]
    max_area: f64,

    /// Number of worker threads, defaults to the number of CPUs.
    #[clap(short, long)]
    threads: Option<usize>,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct FindPortsOptionsChecked {
    /// The directory holding the chunk files.
    chunk_dir: PathBuf,

    /// The chunk files, in the order they are loaded.
    chunk_files: Vec<PathBuf>,

    /// Everything about the run.
    config: PortFinderConfig,

    /// Verbose output
    verbose: bool,
}

impl Display for FindPortsOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "       Chunk dir: {}", self.chunk_dir.display())?;
        writeln!(f, "     Chunk files: {}", self.chunk_files.len())?;
        write!(f, "{}", self.config)?;

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> PortFindResult<FindPortsOptionsChecked> {
    let FindPortsOptionsInit {
        chunk_dir,
        scales,
        overlap_fraction,
        proximity_factor,
        radius_policy,
        min_area,
        max_area,
        threads,
        verbose,
    } = FindPortsOptionsInit::parse();

    let defaults = PortFinderConfig::default();

    let config = PortFinderConfig {
        scales: if scales.is_empty() {
            defaults.scales
        } else {
            scales
        },
        merge: MergeConfig {
            overlap_fraction,
            proximity_factor,
            radius_policy,
        },
        min_port_area_km2: min_area,
        max_port_area_km2: max_area,
        threads: threads.unwrap_or(defaults.threads),
        ..defaults
    };

    config.validate()?;

    let chunk_files = find_chunk_files(&chunk_dir);
    if chunk_files.is_empty() {
        return Err(format!("No chunk files found in {}", chunk_dir.display()).into());
    }

    let checked = FindPortsOptionsChecked {
        chunk_dir,
        chunk_files,
        config,
        verbose,
    };

    if verbose {
        println!("{}", checked);
    }

    Ok(checked)
}

/// All the CSV files under `dir`, sorted by path.
fn find_chunk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|res| res.ok())
        // Ignore directories, WalkDir will take care of recursing into them.
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map(|ext| ext == "csv").unwrap_or(false))
        .collect();

    files.sort();
    files
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> PortFindResult<()> {
    let opts = parse_args()?;

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("portfind", level)
        .with_module_level("findports", level)
        .init()?;

    let mut chunks = Vec::with_capacity(opts.chunk_files.len());
    for (id, path) in opts.chunk_files.iter().enumerate() {
        match Chunk::from_csv(id, path) {
            Ok(chunk) => chunks.push(chunk),
            Err(err) => log::warn!("Skipping chunk file {}: {}", path.display(), err),
        }
    }

    log::info!(
        "Loaded {} of {} chunk files with {} positions",
        chunks.len(),
        opts.chunk_files.len(),
        chunks.iter().map(Chunk::len).sum::<usize>()
    );

    let finder = PortFinder::new(opts.config)?;
    let report = finder.find_ports(&chunks)?;

    log::info!("{}", report.summary);

    if report.ports.is_empty() {
        log::warn!("");
        log::warn!("No ports found!");
        log::warn!("");
    }

    for (rank, port) in report.ports.iter().enumerate() {
        println!("{:>4} {}", rank + 1, port);
    }

    Ok(())
}
