//! Persisted audit trail of delivered recommendations.
//!
//! The log seeds [`RecommendationHistory`] at the start of a run so the
//! freshness filter remembers what earlier runs showed each customer, and
//! records every recommendation the run delivers.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDateTime, TimeDelta};
use rusqlite::{Connection, params};
use sidekick_core::{CustomerId, ItemName, Recommendation, RecommendationHistory};
use thiserror::Error;

/// Storage format for timestamps; sorts lexicographically.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised by [`HistoryLog`].
#[derive(Debug, Error)]
pub enum HistoryLogError {
    /// The database could not be opened or its schema created.
    #[error("failed to initialise recommendation log at {path}")]
    Initialise {
        /// Source error from `SQLite`.
        #[source]
        source: rusqlite::Error,
        /// Database location.
        path: Utf8PathBuf,
    },
    /// Recording a recommendation failed.
    #[error("failed to record recommendations for order {order}")]
    Record {
        /// Source error from `SQLite`.
        #[source]
        source: rusqlite::Error,
        /// Order whose recommendations were being stored.
        order: String,
    },
    /// Reading the log back failed.
    #[error("failed to load recommendation history")]
    Load {
        /// Source error from `SQLite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored row did not hold a valid item name or timestamp.
    #[error("recommendation log row {row} is corrupt: {reason}")]
    Corrupt {
        /// Row identifier.
        row: i64,
        /// What was wrong with it.
        reason: String,
    },
}

/// `SQLite` log of recommendation events.
#[derive(Debug)]
pub struct HistoryLog {
    connection: Connection,
    location: Utf8PathBuf,
}

impl HistoryLog {
    /// Open (or create) the log at the supplied path.
    ///
    /// # Errors
    /// Returns [`HistoryLogError::Initialise`] when the database cannot be
    /// opened or the schema cannot be created.
    pub fn initialise(path: &Utf8Path) -> Result<Self, HistoryLogError> {
        let initialise_err = |source| HistoryLogError::Initialise {
            source,
            path: path.to_path_buf(),
        };
        let connection = Connection::open(path.as_std_path()).map_err(initialise_err)?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS recommendations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    order_id TEXT NOT NULL,
                    customer_id TEXT NOT NULL,
                    item_name TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    score REAL NOT NULL,
                    recommended_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS recommendations_by_time
                    ON recommendations (recommended_at);",
            )
            .map_err(initialise_err)?;
        Ok(Self {
            connection,
            location: path.to_path_buf(),
        })
    }

    /// Record the items delivered to `customer` for one order.
    ///
    /// # Errors
    /// Returns [`HistoryLogError::Record`] when the insert fails; no rows for
    /// the order are stored in that case.
    pub fn record(
        &mut self,
        customer: &CustomerId,
        recommendation: &Recommendation,
        at: NaiveDateTime,
    ) -> Result<(), HistoryLogError> {
        let order = recommendation.query.as_str();
        let record_err = |source| HistoryLogError::Record {
            source,
            order: order.to_owned(),
        };
        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let tx = self.connection.transaction().map_err(record_err)?;
        {
            let mut insert = tx
                .prepare_cached(
                    "INSERT INTO recommendations (
                        order_id,
                        customer_id,
                        item_name,
                        kind,
                        score,
                        recommended_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(record_err)?;
            for item in &recommendation.items {
                insert
                    .execute(params![
                        order,
                        customer.as_str(),
                        item.item.as_str(),
                        item.kind.as_str(),
                        f64::from(item.score),
                        timestamp
                    ])
                    .map_err(record_err)?;
            }
        }
        tx.commit().map_err(record_err)
    }

    /// Load events inside the window ending at `as_of` into a history.
    ///
    /// # Errors
    /// Returns [`HistoryLogError::Load`] when the query fails and
    /// [`HistoryLogError::Corrupt`] when a stored row cannot be decoded.
    pub fn load(
        &self,
        as_of: NaiveDateTime,
        window: TimeDelta,
    ) -> Result<RecommendationHistory, HistoryLogError> {
        let load_err = |source| HistoryLogError::Load { source };
        let since = (as_of - window).format(TIMESTAMP_FORMAT).to_string();
        let until = as_of.format(TIMESTAMP_FORMAT).to_string();
        let mut select = self
            .connection
            .prepare(
                "SELECT id, customer_id, item_name, recommended_at
                 FROM recommendations
                 WHERE recommended_at > ?1 AND recommended_at <= ?2
                 ORDER BY recommended_at, id",
            )
            .map_err(load_err)?;
        let rows = select
            .query_map(params![since, until], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(load_err)?;
        let mut history = RecommendationHistory::new();
        for row in rows {
            let (id, customer, item, stamp) = row.map_err(load_err)?;
            let item = ItemName::new(&item).map_err(|err| HistoryLogError::Corrupt {
                row: id,
                reason: err.to_string(),
            })?;
            let at = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).map_err(|err| {
                HistoryLogError::Corrupt {
                    row: id,
                    reason: format!("timestamp {stamp:?}: {err}"),
                }
            })?;
            history.record(&CustomerId::new(customer), [item], at);
        }
        Ok(history)
    }

    /// Location of the underlying `SQLite` database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.location
    }

    #[cfg(test)]
    pub(crate) const fn connection(&self) -> &Connection {
        &self.connection
    }
}
