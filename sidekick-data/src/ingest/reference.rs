//! Customer and store reference tables.

use std::io::Read;

use camino::Utf8Path;
use csv::StringRecord;
use log::debug;
use sidekick_core::{Channel, CustomerId, CustomerProfile, CustomerType, StoreId, StoreProfile};

use super::columns::cell;
use super::{CsvSource, IngestError, IngestReport, load_path, parse_timestamp};

const CUSTOMER_ID: &str = "CUSTOMER_ID";
const CUSTOMER_TYPE: &str = "CUSTOMER_TYPE";
const REGISTRATION_DATE: &str = "REGISTRATION_DATE";
const TOTAL_ORDERS: &str = "TOTAL_ORDERS";
const STORE_NUMBER: &str = "STORE_NUMBER";
const STORE_NAME: &str = "STORE_NAME";
const ORDER_CHANNEL_NAME: &str = "ORDER_CHANNEL_NAME";
const CITY: &str = "CITY";

/// Load customer profiles from a CSV file.
///
/// # Errors
/// Returns [`IngestError`] when the file cannot be opened or lacks a
/// `CUSTOMER_ID` column.
pub fn read_customers(path: &Utf8Path) -> Result<IngestReport<CustomerProfile>, IngestError> {
    load_path(path, read_customers_from)
}

/// Load customer profiles from any reader.
///
/// Unknown customer types become guests, blank order counts become zero and
/// unparseable registration dates are dropped. Rows without an identifier
/// or with a non-numeric order count are skipped.
///
/// # Errors
/// Returns [`IngestError`] when the header cannot be read or lacks
/// `CUSTOMER_ID`.
pub fn read_customers_from<R: Read>(
    reader: R,
    source: &Utf8Path,
) -> Result<IngestReport<CustomerProfile>, IngestError> {
    let mut csv = CsvSource::new(reader, source)?;
    let id_col = csv.require(CUSTOMER_ID)?;
    let type_col = csv.optional(CUSTOMER_TYPE);
    let registered_col = csv.optional(REGISTRATION_DATE);
    let orders_col = csv.optional(TOTAL_ORDERS);
    let mut profiles = Vec::new();
    let mut record = StringRecord::new();
    while csv.next_row(&mut record) {
        let Some(id) = cell(&record, Some(id_col)) else {
            csv.skip("missing CUSTOMER_ID");
            continue;
        };
        let total_orders = match cell(&record, orders_col).map(parse_count) {
            None => 0,
            Some(Some(count)) => count,
            Some(None) => {
                csv.skip(format!("invalid TOTAL_ORDERS for customer {id}"));
                continue;
            }
        };
        let registered_on = cell(&record, registered_col).and_then(|raw| {
            let parsed = parse_timestamp(raw).map(|stamp| stamp.date());
            if parsed.is_none() {
                debug!("Ignoring unparseable REGISTRATION_DATE {raw:?} for customer {id}");
            }
            parsed
        });
        profiles.push(CustomerProfile {
            id: CustomerId::new(id),
            customer_type: cell(&record, type_col)
                .map_or(CustomerType::Guest, CustomerType::parse_lenient),
            registered_on,
            total_orders,
        });
    }
    Ok(csv.finish(profiles))
}

/// Load store metadata from a CSV file.
///
/// # Errors
/// Returns [`IngestError`] when the file cannot be opened or lacks a
/// `STORE_NUMBER` column.
pub fn read_stores(path: &Utf8Path) -> Result<IngestReport<StoreProfile>, IngestError> {
    load_path(path, read_stores_from)
}

/// Load store metadata from any reader. Unknown channels become
/// [`Channel::Digital`].
///
/// # Errors
/// Returns [`IngestError`] when the header cannot be read or lacks
/// `STORE_NUMBER`.
pub fn read_stores_from<R: Read>(
    reader: R,
    source: &Utf8Path,
) -> Result<IngestReport<StoreProfile>, IngestError> {
    let mut csv = CsvSource::new(reader, source)?;
    let id_col = csv.require(STORE_NUMBER)?;
    let name_col = csv.optional(STORE_NAME);
    let channel_col = csv.optional(ORDER_CHANNEL_NAME);
    let city_col = csv.optional(CITY);
    let mut stores = Vec::new();
    let mut record = StringRecord::new();
    while csv.next_row(&mut record) {
        let Some(id) = cell(&record, Some(id_col)) else {
            csv.skip("missing STORE_NUMBER");
            continue;
        };
        stores.push(StoreProfile {
            id: StoreId::new(id),
            name: cell(&record, name_col).unwrap_or_default().to_owned(),
            channel: cell(&record, channel_col).map_or(Channel::Digital, Channel::parse_lenient),
            location: cell(&record, city_col).unwrap_or_default().to_owned(),
        });
    }
    Ok(csv.finish(stores))
}

/// Non-negative count, tolerating spreadsheet-style `12.0`.
fn parse_count(raw: &str) -> Option<u32> {
    raw.strip_suffix(".0").unwrap_or(raw).parse().ok()
}
