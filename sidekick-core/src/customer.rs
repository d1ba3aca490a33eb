//! Customers, stores and the personas derived from them.
//!
//! Reference data is incomplete in practice: orders reference customers
//! that never made it into the profile export and stores without metadata.
//! Lookups therefore fall back to [`CustomerProfile::guest`] and
//! [`Channel::default`] instead of failing.

use std::collections::HashMap;

use chrono::NaiveDate;

/// Identifier of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CustomerId(String);

impl CustomerId {
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

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StoreId(String);

impl StoreId {
    /// Wrap a raw store number, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    /// Borrow the store number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account type recorded for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CustomerType {
    /// Checked out without an account.
    #[default]
    Guest,
    /// Holds a loyalty account.
    Registered,
    /// Flagged for special treatment by the business.
    Special,
}

impl CustomerType {
    /// Parse a customer type leniently; anything unrecognised is a guest.
    ///
    /// # Examples
    /// ```
    /// use sidekick_core::CustomerType;
    ///
    /// assert_eq!(CustomerType::parse_lenient(" Registered "), CustomerType::Registered);
    /// assert_eq!(CustomerType::parse_lenient("???"), CustomerType::Guest);
    /// ```
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "registered" => Self::Registered,
            "special" | "vip" => Self::Special,
            _ => Self::Guest,
        }
    }
}

/// Profile of a customer from the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    /// Customer identifier.
    pub id: CustomerId,
    /// Account type.
    pub customer_type: CustomerType,
    /// Date the account was created, when known.
    pub registered_on: Option<NaiveDate>,
    /// Lifetime number of orders.
    pub total_orders: u32,
}

impl CustomerProfile {
    /// Default profile used when a customer is missing from the reference
    /// table.
    #[must_use]
    pub const fn guest(id: CustomerId) -> Self {
        Self {
            id,
            customer_type: CustomerType::Guest,
            registered_on: None,
            total_orders: 0,
        }
    }

    /// Derive the persona used to pick fusion weights.
    ///
    /// # Examples
    /// ```
    /// use sidekick_core::{CustomerId, CustomerProfile, CustomerType, Persona};
    ///
    /// let mut profile = CustomerProfile::guest(CustomerId::new("c-1"));
    /// assert_eq!(profile.persona(10), Persona::FirstTimeGuest);
    /// profile.customer_type = CustomerType::Registered;
    /// profile.total_orders = 12;
    /// assert_eq!(profile.persona(10), Persona::LoyalRegistered);
    /// ```
    #[must_use]
    pub const fn persona(&self, loyal_order_threshold: u32) -> Persona {
        match self.customer_type {
            CustomerType::Special => Persona::Vip,
            CustomerType::Guest if self.total_orders <= 1 => Persona::FirstTimeGuest,
            CustomerType::Guest => Persona::OccasionalGuest,
            CustomerType::Registered if self.total_orders >= loyal_order_threshold => {
                Persona::LoyalRegistered
            }
            CustomerType::Registered => Persona::RegularRegistered,
        }
    }
}

/// Behavioural segment driving strategy-weight overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Persona {
    /// Guest with at most one order; lean on popularity.
    FirstTimeGuest,
    /// Guest with some history.
    OccasionalGuest,
    /// Registered customer below the loyalty threshold.
    RegularRegistered,
    /// Registered customer at or above the loyalty threshold.
    LoyalRegistered,
    /// Customer flagged as special.
    Vip,
}

impl Persona {
    /// Every persona, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::FirstTimeGuest,
        Self::OccasionalGuest,
        Self::RegularRegistered,
        Self::LoyalRegistered,
        Self::Vip,
    ];

    /// Return the persona as a `snake_case` `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTimeGuest => "first_time_guest",
            Self::OccasionalGuest => "occasional_guest",
            Self::RegularRegistered => "regular_registered",
            Self::LoyalRegistered => "loyal_registered",
            Self::Vip => "vip",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering channel a store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    /// Mobile app ordering.
    #[default]
    Digital,
    /// In-store self-service kiosk.
    Kiosk,
    /// Desktop website.
    Website,
}

impl Channel {
    /// Parse a channel leniently; anything unrecognised is
    /// [`Channel::Digital`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "kiosk" => Self::Kiosk,
            "website" | "web" => Self::Website,
            _ => Self::Digital,
        }
    }
}

/// Store metadata from the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProfile {
    /// Store number.
    pub id: StoreId,
    /// Display name.
    pub name: String,
    /// Channel the store primarily serves.
    pub channel: Channel,
    /// Free-form location, usually the city.
    pub location: String,
}

impl StoreProfile {
    /// Default profile used when a store is missing from the reference table.
    #[must_use]
    pub const fn unknown(id: StoreId) -> Self {
        Self {
            id,
            name: String::new(),
            channel: Channel::Digital,
            location: String::new(),
        }
    }
}

/// Customer and store reference tables with lenient lookups.
///
/// # Examples
/// ```
/// use sidekick_core::{Channel, CustomerDirectory, CustomerId, Persona, StoreId};
///
/// let directory = CustomerDirectory::default();
/// let unknown = CustomerId::new("c-404");
/// assert_eq!(directory.customer(Some(&unknown)).persona(10), Persona::FirstTimeGuest);
/// assert_eq!(directory.channel(Some(&StoreId::new("1"))), Channel::Digital);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDirectory {
    customers: HashMap<CustomerId, CustomerProfile>,
    stores: HashMap<StoreId, StoreProfile>,
}

impl CustomerDirectory {
    /// Build a directory from loaded reference rows. Later rows replace
    /// earlier rows with the same identifier.
    pub fn new<C, S>(customers: C, stores: S) -> Self
    where
        C: IntoIterator<Item = CustomerProfile>,
        S: IntoIterator<Item = StoreProfile>,
    {
        Self {
            customers: customers
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
            stores: stores
                .into_iter()
                .map(|store| (store.id.clone(), store))
                .collect(),
        }
    }

    /// Profile for `id`, or a guest profile when the customer is unknown.
    #[must_use]
    pub fn customer(&self, id: Option<&CustomerId>) -> CustomerProfile {
        match id {
            Some(id) => self
                .customers
                .get(id)
                .cloned()
                .unwrap_or_else(|| CustomerProfile::guest(id.clone())),
            None => CustomerProfile::guest(CustomerId::new("")),
        }
    }

    /// Channel for `id`, or [`Channel::Digital`] when the store is unknown.
    #[must_use]
    pub fn channel(&self, id: Option<&StoreId>) -> Channel {
        id.and_then(|id| self.stores.get(id))
            .map_or_else(Channel::default, |store| store.channel)
    }

    /// Number of known customers.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Number of known stores.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }
}
