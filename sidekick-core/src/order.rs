//! Historical orders and their line items.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{CustomerId, ItemName, StoreId};

/// Identifier of an order, as supplied by the point-of-sale export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrderId(String);

impl OrderId {
    /// Wrap a raw identifier, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One item on an order with its aggregated quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Canonical item name.
    pub item: ItemName,
    /// Total quantity across repeated entries.
    pub quantity: u32,
    /// Unit price, when the export provides one.
    pub unit_price: Option<f64>,
}

impl LineItem {
    /// Build a line item.
    #[must_use]
    pub const fn new(item: ItemName, quantity: u32, unit_price: Option<f64>) -> Self {
        Self {
            item,
            quantity,
            unit_price,
        }
    }
}

/// A completed historical order.
///
/// Item names are unique within an order: repeated entries for the same item
/// merge into one [`LineItem`] whose quantity is the sum of the repeats.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use sidekick_core::{ItemName, LineItem, Order, OrderId};
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .unwrap();
/// let wings = ItemName::new("wings").unwrap();
/// let order = Order::new(
///     OrderId::new("o-1"),
///     None,
///     None,
///     at,
///     vec![
///         LineItem::new(wings.clone(), 1, None),
///         LineItem::new(wings.clone(), 2, None),
///     ],
/// )
/// .unwrap();
/// assert_eq!(order.lines().len(), 1);
/// assert_eq!(order.lines()[0].quantity, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    customer: Option<CustomerId>,
    store: Option<StoreId>,
    ordered_at: NaiveDateTime,
    lines: Vec<LineItem>,
}

/// Errors returned by [`Order::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The order carried no line items.
    #[error("order {id} must contain at least one line item")]
    Empty {
        /// Identifier of the rejected order.
        id: OrderId,
    },
    /// A line item had a zero quantity.
    #[error("order {id} has a zero quantity for {item}")]
    ZeroQuantity {
        /// Identifier of the rejected order.
        id: OrderId,
        /// Offending item.
        item: ItemName,
    },
}

impl Order {
    /// Validate and construct an [`Order`], merging repeated items.
    ///
    /// # Errors
    /// Returns [`OrderError::Empty`] when `lines` is empty and
    /// [`OrderError::ZeroQuantity`] when any line has a zero quantity.
    pub fn new(
        id: OrderId,
        customer: Option<CustomerId>,
        store: Option<StoreId>,
        ordered_at: NaiveDateTime,
        lines: Vec<LineItem>,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Empty { id });
        }
        let mut merged: Vec<LineItem> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(OrderError::ZeroQuantity {
                    id,
                    item: line.item,
                });
            }
            match merged.iter_mut().find(|existing| existing.item == line.item) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                    if existing.unit_price.is_none() {
                        existing.unit_price = line.unit_price;
                    }
                }
                None => merged.push(line),
            }
        }
        Ok(Self {
            id,
            customer,
            store,
            ordered_at,
            lines: merged,
        })
    }

    /// Order identifier.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Customer who placed the order, if known.
    #[must_use]
    pub const fn customer(&self) -> Option<&CustomerId> {
        self.customer.as_ref()
    }

    /// Store the order was placed at, if known.
    #[must_use]
    pub const fn store(&self) -> Option<&StoreId> {
        self.store.as_ref()
    }

    /// When the order was placed.
    #[must_use]
    pub const fn ordered_at(&self) -> NaiveDateTime {
        self.ordered_at
    }

    /// Line items, one per distinct item.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Iterate over the distinct items on the order.
    pub fn items(&self) -> impl Iterator<Item = &ItemName> {
        self.lines.iter().map(|line| &line.item)
    }
}
