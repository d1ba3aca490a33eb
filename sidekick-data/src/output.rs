//! Recommendation table writer.
//!
//! The table echoes the queries file: `CUSTOMER_ID` when the input had it,
//! then `ORDER_ID` and `item1..itemN` with every item cell in its original
//! column, followed by one `RECOMMENDATION k` column per slot. At least
//! three item columns are written and short rows are padded with empty
//! cells so every row has the same width.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use sidekick_core::{RECOMMENDATION_SLOTS, Recommendation};
use thiserror::Error;

use crate::ingest::{QueryLayout, QueryRow};

/// Fewest item columns the table carries.
pub const MIN_ITEM_COLUMNS: usize = 3;

/// A query paired with the recommendation produced for it.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRow<'a> {
    /// The partial order and its input cells.
    pub query: &'a QueryRow,
    /// Recommendations for it.
    pub recommendation: &'a Recommendation,
}

/// Errors returned when writing the recommendation table.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output file could not be created.
    #[error("failed to create output file {path}")]
    Create {
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
        /// Output path.
        path: Utf8PathBuf,
    },
    /// Writing a row failed.
    #[error("failed to write recommendations to {path}")]
    Write {
        /// Source error from the CSV writer.
        #[source]
        source: csv::Error,
        /// Output path.
        path: Utf8PathBuf,
    },
}

/// Write the recommendation table to `path`, creating parent directories.
///
/// # Errors
/// Returns [`OutputError`] when the file cannot be created or written.
pub fn write_recommendations(
    path: &Utf8Path,
    layout: QueryLayout,
    rows: &[RecommendationRow<'_>],
) -> Result<(), OutputError> {
    let file = sidekick_fs::create_file(path).map_err(|source| OutputError::Create {
        source,
        path: path.to_path_buf(),
    })?;
    write_recommendations_to(file, layout, rows).map_err(|source| OutputError::Write {
        source,
        path: path.to_path_buf(),
    })?;
    info!("Wrote {} recommendation rows to {path}", rows.len());
    Ok(())
}

/// Write the recommendation table to any writer.
///
/// # Errors
/// Returns the underlying [`csv::Error`] when a row cannot be written.
pub fn write_recommendations_to<W: Write>(
    writer: W,
    layout: QueryLayout,
    rows: &[RecommendationRow<'_>],
) -> Result<(), csv::Error> {
    let width = rows
        .iter()
        .map(|row| row.query.item_cells.len())
        .fold(layout.item_columns.max(MIN_ITEM_COLUMNS), usize::max);
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(layout, width))?;
    for row in rows {
        let query = &row.query.query;
        let mut record = Vec::with_capacity(2 + width + RECOMMENDATION_SLOTS);
        if layout.customer_column {
            record.push(
                query
                    .customer
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            );
        }
        record.push(query.id.as_str().to_owned());
        let mut cells = row.query.item_cells.clone();
        cells.resize(width, String::new());
        record.extend(cells);
        record.extend(row.recommendation.slot_names(RECOMMENDATION_SLOTS));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

fn header(layout: QueryLayout, width: usize) -> Vec<String> {
    layout
        .customer_column
        .then(|| "CUSTOMER_ID".to_owned())
        .into_iter()
        .chain(std::iter::once("ORDER_ID".to_owned()))
        .chain((1..=width).map(|n| format!("item{n}")))
        .chain((1..=RECOMMENDATION_SLOTS).map(|n| format!("RECOMMENDATION {n}")))
        .collect()
}
