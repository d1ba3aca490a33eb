//! Immutable model tables built once from training orders.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use bincode::Options;
use camino::Utf8Path;
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use sidekick_core::{CategoryRules, ItemName, Order};
use sidekick_fs::{read_file, write_file};

use crate::{
    AssociationRules, Catalog, CooccurrenceTable, DEFAULT_MIN_SUPPORT, ItemTimeline, TablesError,
};

/// Bincode options used for the tables artefact.
pub(crate) fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
}

/// Settings applied while building [`ModelTables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesConfig {
    /// Minimum pair count for an association rule.
    pub min_support: u32,
    /// Keyword rules assigning catalog categories.
    pub category_rules: CategoryRules,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            category_rules: CategoryRules::default(),
        }
    }
}

/// Everything the scorer learns from history: the catalog, pair counts,
/// association rules and the daily sales timeline.
///
/// Tables are read-only once built and safe to share across threads.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use sidekick_core::{ItemName, LineItem, Order, OrderId};
/// use sidekick_scorer::{ModelTables, TablesConfig};
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let line = |raw: &str| LineItem::new(ItemName::new(raw).unwrap(), 1, None);
/// let order = Order::new(OrderId::new("o-1"), None, None, at, vec![line("wings"), line("cola")])
///     .unwrap();
/// let tables = ModelTables::build(&[order], &TablesConfig::default());
/// assert_eq!(tables.catalog.len(), 2);
/// assert_eq!(tables.cooccurrence.count(0, 1), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelTables {
    /// Items ranked by popularity.
    pub catalog: Catalog,
    /// Pair counts keyed by catalog position.
    pub cooccurrence: CooccurrenceTable,
    /// Directional rules above the support threshold.
    pub rules: AssociationRules,
    /// Daily per-item order counts.
    pub timeline: ItemTimeline,
    /// Timestamp of the most recent training order.
    pub latest_order: Option<NaiveDateTime>,
    /// Number of training orders.
    pub order_count: usize,
}

impl ModelTables {
    /// Build the tables from `orders`.
    ///
    /// Repeated items within an order count once, so quantities never
    /// inflate pair counts.
    #[must_use]
    pub fn build(orders: &[Order], config: &TablesConfig) -> Self {
        let baskets: Vec<Vec<&ItemName>> = orders.iter().map(distinct_items).collect();

        let mut counts: BTreeMap<String, (ItemName, u32)> = BTreeMap::new();
        for basket in &baskets {
            for &name in basket {
                counts
                    .entry(name.folded())
                    .and_modify(|(_, count)| *count = count.saturating_add(1))
                    .or_insert_with(|| (name.clone(), 1));
            }
        }
        let catalog = Catalog::from_counts(counts.into_values(), &config.category_rules);

        let mut timeline = ItemTimeline::default();
        let positions: Vec<Vec<usize>> = orders
            .iter()
            .zip(&baskets)
            .map(|(order, basket)| {
                let indices: Vec<usize> = basket
                    .iter()
                    .filter_map(|name| catalog.position(name))
                    .collect();
                timeline.record(order.ordered_at().date(), &indices);
                indices
            })
            .collect();

        let cooccurrence = CooccurrenceTable::build(&positions, catalog.len());
        let rules = AssociationRules::mine(&cooccurrence, config.min_support);
        let latest_order = orders.iter().map(Order::ordered_at).max();

        info!(
            "built model tables: {} orders, {} items, {} pairs, {} rules",
            orders.len(),
            catalog.len(),
            cooccurrence.pair_count(),
            rules.len()
        );

        Self {
            catalog,
            cooccurrence,
            rules,
            timeline,
            latest_order,
            order_count: orders.len(),
        }
    }
}

fn distinct_items(order: &Order) -> Vec<&ItemName> {
    let mut seen = Vec::new();
    let mut items = Vec::new();
    for name in order.items() {
        let folded = name.folded();
        if !seen.contains(&folded) {
            seen.push(folded);
            items.push(name);
        }
    }
    items
}

/// Persist `tables` to `path` as `bincode`.
///
/// The parent directory is created when missing and the file is replaced
/// atomically.
///
/// # Errors
/// Returns [`TablesError::Serialise`] when encoding fails and
/// [`TablesError::WriteFile`] when the file cannot be written.
pub fn write_tables(path: &Utf8Path, tables: &ModelTables) -> Result<(), TablesError> {
    let bytes = bincode_options()
        .serialize(tables)
        .map_err(|source| TablesError::Serialise {
            path: path.to_path_buf(),
            source,
        })?;
    write_file(path, &bytes).map_err(|source| TablesError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote model tables to {path}");
    Ok(())
}

/// Load tables previously written by [`write_tables`].
///
/// # Errors
/// Returns [`TablesError::ReadFile`] when the file cannot be read and
/// [`TablesError::Decode`] when its contents are not a tables artefact.
pub fn read_tables(path: &Utf8Path) -> Result<ModelTables, TablesError> {
    let bytes = read_file(path).map_err(|source| TablesError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    bincode_options()
        .deserialize(&bytes)
        .map_err(|source| TablesError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
