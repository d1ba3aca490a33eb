//! Header lookup for CSV inputs.

use std::collections::HashMap;

use csv::StringRecord;

/// Case-insensitive index of header names.
#[derive(Debug, Clone, Default)]
pub(super) struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    pub(super) fn from_headers(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (position, name) in headers.iter().enumerate() {
            // First occurrence wins when a header repeats.
            index.entry(fold(name)).or_insert(position);
        }
        Self { index }
    }

    pub(super) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&fold(name)).copied()
    }

    /// Positions of `<prefix>1`, `<prefix>2`, ... columns in numeric order.
    pub(super) fn numbered(&self, prefix: &str) -> Vec<usize> {
        let prefix = fold(prefix);
        let mut found: Vec<(u32, usize)> = self
            .index
            .iter()
            .filter_map(|(name, position)| {
                let number = name.strip_prefix(prefix.as_str())?.parse::<u32>().ok()?;
                Some((number, *position))
            })
            .collect();
        found.sort_unstable();
        found.into_iter().map(|(_, position)| position).collect()
    }
}

fn fold(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Trimmed, non-empty cell at `position`.
pub(super) fn cell(record: &StringRecord, position: Option<usize>) -> Option<&str> {
    let value = record.get(position?)?.trim();
    (!value.is_empty()).then_some(value)
}
