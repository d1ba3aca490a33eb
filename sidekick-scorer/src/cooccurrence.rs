//! Pairwise co-occurrence counts between catalog items.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Symmetric count of orders containing each pair of distinct items, plus
/// the number of orders containing each item.
///
/// Rows are keyed by catalog position. Both `(a, b)` and `(b, a)` are
/// stored, so [`CooccurrenceTable::count`] is symmetric by construction.
///
/// # Examples
/// ```
/// use sidekick_scorer::CooccurrenceTable;
///
/// let table = CooccurrenceTable::build(&[vec![0, 1, 2], vec![0, 1], vec![2]], 3);
/// assert_eq!(table.count(0, 1), 2);
/// assert_eq!(table.count(1, 0), 2);
/// assert_eq!(table.count(1, 2), 1);
/// assert_eq!(table.orders_containing(2), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CooccurrenceTable {
    neighbours: Vec<BTreeMap<usize, u32>>,
    item_orders: Vec<u32>,
}

impl CooccurrenceTable {
    /// Count pairs across `baskets`, each a list of distinct catalog
    /// positions below `item_count`.
    ///
    /// Positions at or beyond `item_count` are ignored. Single-item baskets
    /// only contribute to the per-item counts.
    #[must_use]
    pub fn build(baskets: &[Vec<usize>], item_count: usize) -> Self {
        let mut neighbours = vec![BTreeMap::new(); item_count];
        let mut item_orders = vec![0_u32; item_count];
        for basket in baskets {
            let valid: Vec<usize> = basket
                .iter()
                .copied()
                .filter(|position| *position < item_count)
                .collect();
            for (offset, &left) in valid.iter().enumerate() {
                if let Some(count) = item_orders.get_mut(left) {
                    *count = count.saturating_add(1);
                }
                for &right in valid.iter().skip(offset + 1) {
                    if left == right {
                        continue;
                    }
                    increment(&mut neighbours, left, right);
                    increment(&mut neighbours, right, left);
                }
            }
        }
        Self {
            neighbours,
            item_orders,
        }
    }

    /// Number of orders containing both `a` and `b`; zero when `a == b`.
    #[must_use]
    pub fn count(&self, a: usize, b: usize) -> u32 {
        if a == b {
            return 0;
        }
        self.neighbours
            .get(a)
            .and_then(|row| row.get(&b))
            .copied()
            .unwrap_or(0)
    }

    /// Number of orders containing `item`.
    #[must_use]
    pub fn orders_containing(&self, item: usize) -> u32 {
        self.item_orders.get(item).copied().unwrap_or(0)
    }

    /// Items seen alongside `item` with their pair counts.
    pub fn neighbours(&self, item: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.neighbours
            .get(item)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&other, &count)| (other, count)))
    }

    /// Number of distinct unordered pairs with a non-zero count.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.neighbours
            .iter()
            .enumerate()
            .map(|(position, row)| row.range(position + 1..).count())
            .sum()
    }

    /// Number of item rows.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_orders.len()
    }
}

fn increment(neighbours: &mut [BTreeMap<usize, u32>], from: usize, to: usize) {
    if let Some(row) = neighbours.get_mut(from) {
        let count = row.entry(to).or_insert(0);
        *count = count.saturating_add(1);
    }
}
