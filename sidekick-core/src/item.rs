//! Canonical menu item names.
//!
//! Item names are the only key the engine has for a menu item, so two
//! spellings that differ only in surrounding or repeated whitespace must map
//! to the same key.

use std::fmt;

use thiserror::Error;

/// Canonical name of a menu item.
///
/// Leading and trailing whitespace is removed and inner runs of whitespace
/// collapse to a single space. Case is preserved.
///
/// # Examples
/// ```
/// use sidekick_core::ItemName;
///
/// let name = ItemName::new("  10 pc   Spicy Wings ").unwrap();
/// assert_eq!(name.as_str(), "10 pc Spicy Wings");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemName(String);

/// Errors returned by [`ItemName::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemNameError {
    /// The name was empty once whitespace was removed.
    #[error("item name must not be blank")]
    Blank,
    /// The name was a placeholder for a missing spreadsheet cell.
    #[error("item name {raw:?} is a missing-value placeholder")]
    Placeholder {
        /// Raw value as read from the input.
        raw: String,
    },
}

impl ItemName {
    /// Validate and canonicalise an item name.
    ///
    /// # Errors
    /// Returns [`ItemNameError::Blank`] for empty or whitespace-only input and
    /// [`ItemNameError::Placeholder`] for `nan`/`null` cells left behind by
    /// spreadsheet exports.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemNameError> {
        let raw_ref = raw.as_ref();
        let canonical = raw_ref.split_whitespace().collect::<Vec<_>>().join(" ");
        if canonical.is_empty() {
            return Err(ItemNameError::Blank);
        }
        if is_placeholder(&canonical) {
            return Err(ItemNameError::Placeholder {
                raw: raw_ref.to_owned(),
            });
        }
        Ok(Self(canonical))
    }

    /// Borrow the canonical name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for case-insensitive comparisons.
    #[must_use]
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

fn is_placeholder(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "nan" | "null" | "none" | "n/a"
    )
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for ItemName {
    type Error = ItemNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
