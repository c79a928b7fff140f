use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use engine::{EngineError, LogRow, parse_count, timestamp_format};

use crate::store::LogStore;

pub const HEADER: [&str; 5] = [
    "timestamp",
    "total_add_to_cart",
    "total_ordered_units",
    "new_add_to_cart",
    "new_ordered_units",
];

/// CSV-file data log.
///
/// The file is read once at open to recover the last row; after that the
/// last row is tracked in memory and only advances on a successful append.
pub struct CsvLogStore {
    path: PathBuf,
    last: Mutex<Option<LogRow>>,
}

impl CsvLogStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let last = match File::open(&path) {
            Ok(file) => read_last_row(file)
                .with_context(|| format!("failed to read data log {}", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "data log not found; it will be created on first append");
                None
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open data log {}", path.display()));
            }
        };

        debug!(path = %path.display(), has_last_row = last.is_some(), "csv data log opened");

        Ok(Self {
            path,
            last: Mutex::new(last),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogStore for CsvLogStore {
    async fn last_row(&self) -> Result<Option<LogRow>> {
        Ok(self.last.lock().clone())
    }

    #[instrument(skip(self, row), target = "store", fields(path = %self.path.display()))]
    async fn append(&self, row: &LogRow) -> Result<()> {
        let path = self.path.clone();
        let owned = row.clone();

        tokio::task::spawn_blocking(move || write_row(&path, &owned))
            .await
            .context("data log writer task failed")??;

        *self.last.lock() = Some(row.clone());
        debug!("row appended to data log");
        Ok(())
    }
}

/// On-disk row as read back. Counts are floats because older logs were
/// written with float-rendered counts (`150.0`).
#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    total_add_to_cart: f64,
    total_ordered_units: f64,
    new_add_to_cart: f64,
    new_ordered_units: f64,
}

impl StoredRow {
    fn into_log_row(self) -> Result<LogRow, EngineError> {
        Ok(LogRow {
            timestamp: self.timestamp,
            total_add_to_cart: parse_count("total_add_to_cart", self.total_add_to_cart)?,
            total_ordered_units: parse_count("total_ordered_units", self.total_ordered_units)?,
            new_add_to_cart: parse_count("new_add_to_cart", self.new_add_to_cart)?,
            new_ordered_units: parse_count("new_ordered_units", self.new_ordered_units)?,
        })
    }
}

pub(crate) fn read_last_row<R: Read>(reader: R) -> Result<Option<LogRow>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("failed to read data log header")?.clone();
    if !headers.is_empty() && headers.iter().ne(HEADER.iter().copied()) {
        anyhow::bail!("unexpected data log header: {:?}", headers);
    }

    let mut last = None;
    for (i, record) in rdr.deserialize::<StoredRow>().enumerate() {
        let record = record.with_context(|| format!("malformed data log row {}", i + 1))?;
        last = Some(record);
    }

    last.map(StoredRow::into_log_row)
        .transpose()
        .context("invalid counts in last data log row")
}

fn write_row(path: &Path, row: &LogRow) -> Result<()> {
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(e).with_context(|| format!("failed to stat {}", path.display())),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {} for append", path.display()))?;

    // A truncated or hand-edited last line must not swallow the new row.
    if !needs_header && !ends_with_newline(&mut file)? {
        file.write_all(b"\n")
            .with_context(|| format!("failed to terminate last line of {}", path.display()))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);

    wtr.serialize(row).context("failed to encode data log row")?;
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    Ok(())
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).context("failed to seek data log")?;
    file.read_exact(&mut last).context("failed to read data log tail")?;
    Ok(last[0] == b'\n')
}
