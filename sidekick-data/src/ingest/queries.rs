//! Partial-order queries to complete.
//!
//! Known items sit in sequential `item1..itemN` columns; blank cells are
//! ignored when scoring but kept by position so the output can echo the
//! input row. Every row becomes a query, even one with no usable items, so
//! the output has a row for every input row.

use std::io::Read;

use camino::Utf8Path;
use csv::StringRecord;
use log::warn;
use sidekick_core::{CustomerId, ItemName, OrderId, PartialOrderQuery, StoreId};

use super::columns::cell;
use super::{CsvSource, IngestError, IngestReport, load_path};

const ORDER_ID: &str = "ORDER_ID";
const CUSTOMER_ID: &str = "CUSTOMER_ID";
const STORE_NUMBER: &str = "STORE_NUMBER";
const ITEM_PREFIX: &str = "item";
const MISSING_ITEM: &str = "MISSING_ITEM";

/// Column layout of a queries file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryLayout {
    /// Number of `itemN` columns in the header.
    pub item_columns: usize,
    /// Whether the header carries `CUSTOMER_ID`.
    pub customer_column: bool,
}

/// A query with the item cells it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    /// The parsed partial order.
    pub query: PartialOrderQuery,
    /// Cells of `item1..itemN` in column order, blanks included.
    pub item_cells: Vec<String>,
}

impl From<PartialOrderQuery> for QueryRow {
    fn from(query: PartialOrderQuery) -> Self {
        let item_cells = query.known.iter().map(ToString::to_string).collect();
        Self { query, item_cells }
    }
}

/// Queries loaded from one file together with its column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBatch {
    /// Layout of the source header.
    pub layout: QueryLayout,
    /// Loaded rows and their counts.
    pub report: IngestReport<QueryRow>,
}

impl QueryBatch {
    /// Iterate over the parsed queries in input order.
    pub fn queries(&self) -> impl ExactSizeIterator<Item = &PartialOrderQuery> {
        self.report.records.iter().map(|row| &row.query)
    }
}

/// Load partial-order queries from a CSV file.
///
/// # Errors
/// Returns [`IngestError`] when the file cannot be opened or lacks the
/// `ORDER_ID` column.
pub fn read_queries(path: &Utf8Path) -> Result<QueryBatch, IngestError> {
    let mut layout = QueryLayout::default();
    let report = load_path(path, |reader, source| {
        let batch = read_queries_from(reader, source)?;
        layout = batch.layout;
        Ok(batch.report)
    })?;
    Ok(QueryBatch { layout, report })
}

/// Load partial-order queries from any reader.
///
/// # Errors
/// Returns [`IngestError`] when the header cannot be read or lacks
/// `ORDER_ID`.
pub fn read_queries_from<R: Read>(reader: R, source: &Utf8Path) -> Result<QueryBatch, IngestError> {
    let mut csv = CsvSource::new(reader, source)?;
    let id_col = csv.require(ORDER_ID)?;
    let customer_col = csv.optional(CUSTOMER_ID);
    let store_col = csv.optional(STORE_NUMBER);
    let missing_col = csv.optional(MISSING_ITEM);
    let item_cols = csv.columns.numbered(ITEM_PREFIX);
    if item_cols.is_empty() {
        warn!("{source} has no item columns; every query will fall back to popularity");
    }
    let layout = QueryLayout {
        item_columns: item_cols.len(),
        customer_column: customer_col.is_some(),
    };
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while csv.next_row(&mut record) {
        let id = cell(&record, Some(id_col)).unwrap_or_default();
        if id.is_empty() {
            warn!("Query row {} in {source} has no ORDER_ID", csv.summary.rows);
        }
        let item_cells: Vec<String> = item_cols
            .iter()
            .map(|position| cell(&record, Some(*position)).unwrap_or_default().to_owned())
            .collect();
        let known = item_cells
            .iter()
            .filter_map(|raw| ItemName::new(raw).ok())
            .collect();
        let mut query = PartialOrderQuery::new(OrderId::new(id), known);
        query.customer = cell(&record, customer_col).map(CustomerId::new);
        query.store = cell(&record, store_col).map(StoreId::new);
        query.expected_missing = cell(&record, missing_col).and_then(|raw| ItemName::new(raw).ok());
        rows.push(QueryRow { query, item_cells });
    }
    Ok(QueryBatch {
        layout,
        report: csv.finish(rows),
    })
}
