/*!
 * Run the scale clusterer over every chunk at every configured scale.
 *
 * Each (chunk, scale) pair is clustered on its own; no information crosses chunk boundaries here.
 * Scales are processed one after another in configuration order, and for each scale the chunks
 * are spread over a pool of worker threads. The results are put back in chunk order, so the
 * output does not depend on how many threads were used or how the work was scheduled.
 */
use crate::{
    chunk::Chunk,
    cluster::{ClusterList, ScaleClusterer},
    config::ScaleConfig,
    error::ConfigError,
};
use crossbeam_channel::bounded;
use std::{
    thread,
    time::{Duration, Instant},
};

const CHANNEL_SIZE: usize = 100;

/// Counts for one scale of a multi-scale run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleStats {
    /// Position of the scale in the configuration.
    pub scale: usize,
    pub name: String,
    /// Number of raw clusters found over all chunks.
    pub clusters: usize,
    /// Number of records that ended up in some cluster.
    pub clustered: usize,
    /// Number of records labeled as noise.
    pub noise: usize,
    pub elapsed: Duration,
}

/// Everything produced by a multi-scale run.
#[derive(Debug, Clone, Default)]
pub struct MultiScaleOutput {
    /// One list per (scale, chunk), ordered by scale then chunk position.
    pub lists: Vec<ClusterList>,
    /// One entry per configured scale, in configuration order.
    pub scale_stats: Vec<ScaleStats>,
    /// Positions in the input of chunks that were skipped because they could not be used.
    pub skipped_chunks: Vec<usize>,
}

impl MultiScaleOutput {
    /// Number of raw clusters over all scales and chunks.
    pub fn num_clusters(&self) -> usize {
        self.lists.iter().map(|l| l.clusters.len()).sum()
    }
}

/// Clusters chunks of position records at several scales.
#[derive(Debug, Clone)]
pub struct MultiScaleClusterer {
    clusterers: Vec<ScaleClusterer>,
    threads: usize,
}

impl MultiScaleClusterer {
    pub fn new(scales: &[ScaleConfig], threads: usize) -> Result<Self, ConfigError> {
        if threads == 0 {
            return Err(ConfigError::new("at least one worker thread is required"));
        }

        let clusterers = scales
            .iter()
            .map(ScaleClusterer::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MultiScaleClusterer {
            clusterers,
            threads,
        })
    }

    /// Cluster every usable chunk at every scale.
    ///
    /// Chunks containing coordinates that aren't finite numbers are skipped with a warning.
    pub fn run(&self, chunks: &[Chunk]) -> std::io::Result<MultiScaleOutput> {
        let mut skipped_chunks = vec![];
        let usable: Vec<(usize, &Chunk)> = chunks
            .iter()
            .enumerate()
            .filter(|&(chunk_pos, chunk)| match chunk.check() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Skipping chunk {}: {}", chunk.id, err);
                    skipped_chunks.push(chunk_pos);
                    false
                }
            })
            .collect();

        let mut output = MultiScaleOutput {
            skipped_chunks,
            ..MultiScaleOutput::default()
        };

        for (scale_pos, clusterer) in self.clusterers.iter().enumerate() {
            let scale = clusterer.scale();
            log::info!(
                " → Scale: {} (radius_km={:.2} km, min_samples={})",
                scale.label,
                scale.radius_km,
                scale.min_samples
            );

            let start = Instant::now();
            let lists = self.run_scale(scale_pos, clusterer, &usable)?;
            let elapsed = start.elapsed();

            let stats = ScaleStats {
                scale: scale_pos,
                name: scale.name.clone(),
                clusters: lists.iter().map(|l| l.clusters.len()).sum(),
                clustered: lists.iter().map(ClusterList::clustered).sum(),
                noise: lists.iter().map(|l| l.noise).sum(),
                elapsed,
            };

            log::info!(
                "   → {} clusters found at this scale (took {:.1}s)",
                stats.clusters,
                elapsed.as_secs_f64()
            );

            output.lists.extend(lists);
            output.scale_stats.push(stats);
        }

        Ok(output)
    }

    /// Cluster all the chunks at one scale on the worker pool.
    fn run_scale(
        &self,
        scale_pos: usize,
        clusterer: &ScaleClusterer,
        chunks: &[(usize, &Chunk)],
    ) -> std::io::Result<Vec<ClusterList>> {
        if chunks.is_empty() {
            return Ok(vec![]);
        }

        let num_workers = self.threads.min(chunks.len());

        let (to_workers, from_dispatch) = bounded::<(usize, &Chunk)>(CHANNEL_SIZE);
        let (to_collector, from_workers) = bounded::<ClusterList>(CHANNEL_SIZE);

        let mut lists = thread::scope(|s| -> std::io::Result<Vec<ClusterList>> {
            for worker in 0..num_workers {
                let from_dispatch = from_dispatch.clone();
                let to_collector = to_collector.clone();

                thread::Builder::new()
                    .name(format!("portfind-cluster-{}", worker))
                    .spawn_scoped(s, move || {
                        for (chunk_pos, chunk) in from_dispatch {
                            let list =
                                ClusterList::from_chunk(chunk_pos, chunk, scale_pos, clusterer);
                            if to_collector.send(list).is_err() {
                                break;
                            }
                        }
                    })?;
            }

            // Only the workers hold these now, so the channels close when the work is done.
            drop(from_dispatch);
            drop(to_collector);

            thread::Builder::new()
                .name("portfind-dispatch".to_owned())
                .spawn_scoped(s, move || {
                    for job in chunks.iter().copied() {
                        if to_workers.send(job).is_err() {
                            break;
                        }
                    }
                })?;

            Ok(from_workers.iter().collect())
        })?;

        lists.sort_by_key(|list| list.chunk);

        Ok(lists)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geo::KM_PER_DEGREE, PositionRecord};
    use chrono::{DateTime, NaiveDate, Utc};

    fn blob_chunk(id: usize, center_km: f64, n: usize) -> Chunk {
        let ts = DateTime::from_utc(NaiveDate::from_ymd(2024, 5, 4).and_hms(6, 0, 0), Utc);
        let positions = (0..n)
            .map(|i| {
                let km = center_km + 0.01 * (i % 10) as f64;
                let east = 0.01 * (i / 10) as f64;
                PositionRecord::new(
                    55.5 + km / KM_PER_DEGREE,
                    11.0 + east / (KM_PER_DEGREE * 0.566),
                    ts,
                )
            })
            .collect();
        Chunk::new(id, positions)
    }

    fn scales() -> Vec<ScaleConfig> {
        vec![
            ScaleConfig::new("coarse", "Coarse", 0.5, 10),
            ScaleConfig::new("fine", "Fine", 0.05, 5),
        ]
    }

    #[test]
    fn test_one_list_per_chunk_and_scale() {
        let chunks: Vec<Chunk> = (0..7).map(|i| blob_chunk(i + 100, 3.0 * i as f64, 40)).collect();

        let msc = MultiScaleClusterer::new(&scales(), 3).unwrap();
        let output = msc.run(&chunks).unwrap();

        assert_eq!(output.lists.len(), 14);
        assert!(output.skipped_chunks.is_empty());
        assert_eq!(output.scale_stats.len(), 2);

        for (i, list) in output.lists.iter().enumerate() {
            assert_eq!(list.scale, i / 7);
            assert_eq!(list.chunk, i % 7);
            assert_eq!(list.chunk_id, 100 + i % 7);
        }

        assert_eq!(output.scale_stats[0].clusters, 7);
        assert_eq!(output.num_clusters(), output.scale_stats.iter().map(|s| s.clusters).sum());
    }

    #[test]
    fn test_thread_count_does_not_change_result() {
        let chunks: Vec<Chunk> = (0..12)
            .map(|i| blob_chunk(i, 2.0 * i as f64, 25 + 5 * i))
            .collect();

        let single = MultiScaleClusterer::new(&scales(), 1).unwrap();
        let many = MultiScaleClusterer::new(&scales(), 8).unwrap();

        let a = single.run(&chunks).unwrap();
        let b = many.run(&chunks).unwrap();
        assert_eq!(a.lists, b.lists);
    }

    #[test]
    fn test_bad_chunk_is_skipped() {
        let mut bad = blob_chunk(9, 0.0, 20);
        bad.positions[3].lon = f64::INFINITY;
        let chunks = vec![blob_chunk(8, 0.0, 20), bad];

        let output = MultiScaleClusterer::new(&scales(), 2)
            .unwrap()
            .run(&chunks)
            .unwrap();

        assert_eq!(output.skipped_chunks, vec![1]);
        assert_eq!(output.lists.len(), 2);
        assert!(output.lists.iter().all(|l| l.chunk_id == 8));
    }

    #[test]
    fn test_skipped_chunk_is_found_by_position() {
        let mut bad = blob_chunk(4, 0.0, 20);
        bad.positions[0].lat = f64::NAN;
        let chunks = vec![blob_chunk(4, 0.0, 20), blob_chunk(4, 5.0, 20), bad];

        let output = MultiScaleClusterer::new(&scales(), 2)
            .unwrap()
            .run(&chunks)
            .unwrap();

        assert_eq!(output.skipped_chunks, vec![2]);
        assert_eq!(output.lists.len(), 4);
        assert!(output.lists.iter().all(|l| l.chunk < 2));
    }

    #[test]
    fn test_no_chunks() {
        let output = MultiScaleClusterer::new(&scales(), 2)
            .unwrap()
            .run(&[])
            .unwrap();

        assert!(output.lists.is_empty());
        assert_eq!(output.num_clusters(), 0);
        assert_eq!(output.scale_stats.len(), 2);
    }

    #[test]
    fn test_bad_config() {
        assert!(MultiScaleClusterer::new(&scales(), 0).is_err());

        let mut bad = scales();
        bad[1].min_samples = 0;
        assert!(MultiScaleClusterer::new(&bad, 2).is_err());
    }
}
