//! CSV ingestion for orders, reference tables and partial-order queries.
//!
//! Readers are lenient about individual rows and strict about files: a
//! malformed row is logged, counted in the [`IngestSummary`] and skipped,
//! while an unreadable file or a missing required column aborts the load.

use std::fmt::Display;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use thiserror::Error;

mod columns;
mod orders;
mod queries;
mod reference;
mod timestamp;

use columns::Columns;

pub use orders::{read_orders, read_orders_from};
pub use queries::{QueryBatch, QueryLayout, QueryRow, read_queries, read_queries_from};
pub use reference::{read_customers, read_customers_from, read_stores, read_stores_from};
pub use timestamp::parse_timestamp;

/// Row counts gathered while loading one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    /// Data rows read, excluding the header.
    pub rows: u64,
    /// Rows skipped because a required cell was missing or malformed.
    pub skipped_rows: u64,
    /// Records produced after grouping and validation.
    pub records: u64,
}

/// Records loaded from a file together with their [`IngestSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport<T> {
    /// Counts gathered while loading.
    pub summary: IngestSummary,
    /// Loaded records.
    pub records: Vec<T>,
}

/// Errors returned when a CSV input cannot be loaded at all.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be opened.
    #[error("failed to open {path}")]
    Open {
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
        /// File that failed to open.
        path: Utf8PathBuf,
    },
    /// The header row could not be read.
    #[error("failed to read the header row of {path}")]
    Header {
        /// Source error from the CSV reader.
        #[source]
        source: csv::Error,
        /// File with the unreadable header.
        path: Utf8PathBuf,
    },
    /// A required column was absent from the header row.
    #[error("{path} is missing required column {column}")]
    MissingColumn {
        /// File with the incomplete header.
        path: Utf8PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },
}

/// Open `path` and load it with `read`.
fn load_path<T, F>(path: &Utf8Path, read: F) -> Result<IngestReport<T>, IngestError>
where
    F: FnOnce(fs_utf8::File, &Utf8Path) -> Result<IngestReport<T>, IngestError>,
{
    let file = sidekick_fs::open_utf8_file(path).map_err(|source| IngestError::Open {
        source,
        path: path.to_path_buf(),
    })?;
    let report = read(file, path)?;
    info!(
        "Loaded {} records from {path} ({} rows, {} skipped)",
        report.summary.records, report.summary.rows, report.summary.skipped_rows
    );
    Ok(report)
}

/// Header-aware CSV reader that tracks row counts.
struct CsvSource<'a, R: Read> {
    csv: csv::Reader<R>,
    columns: Columns,
    path: &'a Utf8Path,
    summary: IngestSummary,
}

impl<'a, R: Read> CsvSource<'a, R> {
    fn new(reader: R, path: &'a Utf8Path) -> Result<Self, IngestError> {
        let mut csv = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = csv.headers().map_err(|source| IngestError::Header {
            source,
            path: path.to_path_buf(),
        })?;
        let columns = Columns::from_headers(headers);
        Ok(Self {
            csv,
            columns,
            path,
            summary: IngestSummary::default(),
        })
    }

    fn require(&self, column: &'static str) -> Result<usize, IngestError> {
        self.columns
            .position(column)
            .ok_or_else(|| IngestError::MissingColumn {
                path: self.path.to_path_buf(),
                column,
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.columns.position(column)
    }

    /// Read the next data row into `record`, skipping rows the parser
    /// rejects. Returns `false` at end of input.
    fn next_row(&mut self, record: &mut StringRecord) -> bool {
        loop {
            match self.csv.read_record(record) {
                Ok(true) => {
                    self.summary.rows += 1;
                    return true;
                }
                Ok(false) => return false,
                Err(err) if err.is_io_error() => {
                    warn!("Stopped reading {} after an I/O error: {err}", self.path);
                    return false;
                }
                Err(err) => {
                    self.summary.rows += 1;
                    self.skip(err);
                }
            }
        }
    }

    /// Log and count the current row as skipped.
    fn skip(&mut self, reason: impl Display) {
        self.summary.skipped_rows += 1;
        warn!("Skipping row {} in {}: {reason}", self.summary.rows, self.path);
    }

    fn finish<T>(self, records: Vec<T>) -> IngestReport<T> {
        let mut summary = self.summary;
        summary.records = records.len() as u64;
        IngestReport { summary, records }
    }
}
