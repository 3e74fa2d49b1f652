/*!
 * Chunks of cleaned position data.
 *
 * The preprocessing stage writes the filtered reports out in chunks, one CSV file per chunk. The
 * core never looks across chunk boundaries while clustering; that is left to the merger.
 */
use crate::{
    error::{ChunkError, PortFindResult},
    geo::Coord,
    position::PositionRecord,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::Path;

const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";
const TIMESTAMP_COLUMN: &str = "# Timestamp";
const MMSI_COLUMN: &str = "MMSI";
const SOG_COLUMN: &str = "SOG";

/// Format of the timestamps in the Danish Maritime Authority AIS files.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// An ordered group of position records that is clustered as a unit.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    /// An identifier for logging, usually the order the chunk was written in.
    pub id: usize,
    pub positions: Vec<PositionRecord>,
}

impl Chunk {
    pub fn new(id: usize, positions: Vec<PositionRecord>) -> Self {
        Chunk { id, positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The location of the record at `index`.
    pub fn coord(&self, index: usize) -> Coord {
        self.positions[index].coord()
    }

    /// Make sure every coordinate in the chunk is a usable number.
    pub fn check(&self) -> Result<(), ChunkError> {
        match self.positions.iter().position(|p| !p.coord().is_finite()) {
            Some(index) => Err(ChunkError::new(format!(
                "chunk {} has a non-finite coordinate at row {}",
                self.id, index
            ))),
            None => Ok(()),
        }
    }

    /// Load a chunk from a CSV file.
    ///
    /// The file needs a header row with at least the `Latitude` and `Longitude` columns. The
    /// `# Timestamp`, `MMSI` and `SOG` columns are used if they are present. Rows that can not be
    /// parsed are skipped with a warning.
    pub fn from_csv<P: AsRef<Path>>(id: usize, path: P) -> PortFindResult<Self> {
        let path = path.as_ref();

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        let find_column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let lat_col = find_column(LATITUDE_COLUMN).ok_or_else(|| {
            ChunkError::new(format!("{} has no {} column", path.display(), LATITUDE_COLUMN))
        })?;
        let lon_col = find_column(LONGITUDE_COLUMN).ok_or_else(|| {
            ChunkError::new(format!("{} has no {} column", path.display(), LONGITUDE_COLUMN))
        })?;
        let time_col = find_column(TIMESTAMP_COLUMN);
        let mmsi_col = find_column(MMSI_COLUMN);
        let sog_col = find_column(SOG_COLUMN);

        let mut positions = vec![];
        let mut bad_rows = 0usize;

        for record in rdr.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    log::debug!("Skipping unreadable row in {}: {}", path.display(), err);
                    bad_rows += 1;
                    continue;
                }
            };

            let field = |col: usize| record.get(col).map(str::trim).filter(|s| !s.is_empty());

            let lat: Option<f64> = field(lat_col).and_then(|s| s.parse().ok());
            let lon: Option<f64> = field(lon_col).and_then(|s| s.parse().ok());
            let (lat, lon) = match (lat, lon) {
                (Some(lat), Some(lon)) => (lat, lon),
                _ => {
                    bad_rows += 1;
                    continue;
                }
            };

            let timestamp = match time_col.map(|col| field(col).map(parse_timestamp)) {
                None => unknown_time(),
                Some(Some(Ok(ts))) => ts,
                Some(_) => {
                    bad_rows += 1;
                    continue;
                }
            };

            let mut position = PositionRecord::new(lat, lon, timestamp);
            if let Some(mmsi) = mmsi_col.and_then(field).and_then(|s| s.parse().ok()) {
                position = position.with_mmsi(mmsi);
            }
            if let Some(sog) = sog_col.and_then(field).and_then(|s| s.parse().ok()) {
                position = position.with_sog(sog);
            }

            positions.push(position);
        }

        if bad_rows > 0 {
            log::warn!(
                "Skipped {} unusable rows while loading {}",
                bad_rows,
                path.display()
            );
        }

        log::debug!("Loaded {} positions from {}", positions.len(), path.display());

        Ok(Chunk { id, positions })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)?;
    Ok(DateTime::from_utc(naive, Utc))
}

/// Stand in for records without a time, the start of the Unix epoch.
fn unknown_time() -> DateTime<Utc> {
    DateTime::from_utc(NaiveDate::from_ymd(1970, 1, 1).and_hms(0, 0, 0), Utc)
}
