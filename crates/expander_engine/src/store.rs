use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use expander_core::ResultRecord;
use thiserror::Error;

use crate::persist::{ensure_dir, parent_dir, PersistError};

const HEADER: [&str; 3] = ["query", "title", "url"];
const URL_COLUMN: usize = 2;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("csv error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("output directory unusable: {0}")]
    Dir(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Append-only sink that accepts each URL at most once per session.
pub trait ResultStore: Send {
    /// Appends `record` unless its URL was seen before. Returns whether it
    /// was written.
    fn record_if_new(&mut self, record: &ResultRecord) -> Result<bool, StoreError>;
    fn contains(&self, url: &str) -> bool;
    /// Records present in the output, including those from earlier runs.
    fn count(&self) -> usize;
}

/// CSV-backed result store. Existing rows seed the seen set on open; every
/// accepted record is appended and flushed before `record_if_new` returns.
pub struct CsvResultStore {
    path: PathBuf,
    writer: csv::Writer<File>,
    seen: HashSet<String>,
}

impl CsvResultStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        ensure_dir(&parent_dir(&path))?;

        let seen = load_existing_urls(&path)?;
        if !seen.is_empty() {
            engine_info!(
                "Loaded {} existing URLs from {} for deduplication",
                seen.len(),
                path.display()
            );
        }

        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let torn_tail = !needs_header && ends_mid_row(&path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if torn_tail {
            engine_warn!(
                "{} does not end with a newline (interrupted append?); terminating the last row",
                path.display()
            );
            file.write_all(b"\n")?;
            file.sync_data()?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(HEADER)
                .map_err(|source| csv_error(&path, source))?;
            writer.flush()?;
        }

        Ok(Self { path, writer, seen })
    }
}

impl ResultStore for CsvResultStore {
    fn record_if_new(&mut self, record: &ResultRecord) -> Result<bool, StoreError> {
        if record.url.is_empty() || self.seen.contains(&record.url) {
            return Ok(false);
        }
        self.writer
            .write_record([&record.query, &record.title, &record.url])
            .map_err(|source| csv_error(&self.path, source))?;
        self.writer.flush()?;
        self.seen.insert(record.url.clone());
        Ok(true)
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    fn count(&self) -> usize {
        self.seen.len()
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}

/// True when the last byte of a non-empty file is not a newline.
fn ends_mid_row(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn load_existing_urls(path: &Path) -> Result<HashSet<String>, StoreError> {
    let mut seen = HashSet::new();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(seen),
        Err(err) => return Err(err.into()),
    };
    if file.metadata()?.len() == 0 {
        return Ok(seen);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let url_column = match reader.headers() {
        Ok(headers) => match headers.iter().position(|h| h.trim() == "url") {
            Some(index) => index,
            None => {
                engine_warn!(
                    "No 'url' column in {}; assuming column {}",
                    path.display(),
                    URL_COLUMN + 1
                );
                URL_COLUMN
            }
        },
        Err(err) => {
            engine_warn!("Could not read header of {}: {}", path.display(), err);
            return Ok(seen);
        }
    };

    for (line, row) in reader.records().enumerate() {
        match row {
            Ok(row) => {
                if let Some(url) = row.get(url_column).map(str::trim) {
                    if !url.is_empty() {
                        seen.insert(url.to_string());
                    }
                }
            }
            Err(err) => {
                engine_warn!("Skipping unreadable row {} of {}: {}", line + 2, path.display(), err);
            }
        }
    }
    Ok(seen)
}
