//! Historical order lines grouped into [`Order`]s.
//!
//! The export has one row per line item. Rows are grouped by `ORDER_ID` in
//! first-seen order; customer and store come from the first valid row of an
//! order and the order timestamp is the earliest valid line timestamp.

use std::collections::HashMap;
use std::io::Read;

use camino::Utf8Path;
use chrono::NaiveDateTime;
use csv::StringRecord;
use log::warn;
use sidekick_core::{CustomerId, ItemName, LineItem, Order, OrderId, StoreId};

use super::columns::cell;
use super::{CsvSource, IngestError, IngestReport, load_path, parse_timestamp};

const ORDER_ID: &str = "ORDER_ID";
const CUSTOMER_ID: &str = "CUSTOMER_ID";
const STORE_NUMBER: &str = "STORE_NUMBER";
const ITEM_NAME: &str = "ITEM_NAME";
const QUANTITY: &str = "QUANTITY";
const PRICE: &str = "PRICE";
const ORDER_CREATED_DATE: &str = "ORDER_CREATED_DATE";

/// Load historical orders from a CSV file.
///
/// # Errors
/// Returns [`IngestError`] when the file cannot be opened or lacks the
/// `ORDER_ID`, `ITEM_NAME` or `ORDER_CREATED_DATE` columns.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use sidekick_data::read_orders;
///
/// # fn main() -> Result<(), sidekick_data::IngestError> {
/// let report = read_orders(Utf8Path::new("data/order_data.csv"))?;
/// println!("{} orders", report.records.len());
/// # Ok(())
/// # }
/// ```
pub fn read_orders(path: &Utf8Path) -> Result<IngestReport<Order>, IngestError> {
    load_path(path, read_orders_from)
}

/// Load historical orders from any reader; `source` names it in errors and
/// logs.
///
/// # Errors
/// Returns [`IngestError`] when the header cannot be read or lacks a
/// required column.
pub fn read_orders_from<R: Read>(
    reader: R,
    source: &Utf8Path,
) -> Result<IngestReport<Order>, IngestError> {
    let mut csv = CsvSource::new(reader, source)?;
    let layout = OrderLayout {
        order_id: csv.require(ORDER_ID)?,
        item_name: csv.require(ITEM_NAME)?,
        created: csv.require(ORDER_CREATED_DATE)?,
        customer: csv.optional(CUSTOMER_ID),
        store: csv.optional(STORE_NUMBER),
        quantity: csv.optional(QUANTITY),
        price: csv.optional(PRICE),
    };
    let mut accumulator = OrderAccumulator::default();
    let mut record = StringRecord::new();
    while csv.next_row(&mut record) {
        match layout.parse(&record) {
            Ok(row) => accumulator.push(row),
            Err(reason) => csv.skip(reason),
        }
    }
    let orders = accumulator.into_orders();
    Ok(csv.finish(orders))
}

/// Column positions for the order export.
struct OrderLayout {
    order_id: usize,
    item_name: usize,
    created: usize,
    customer: Option<usize>,
    store: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
}

/// One validated line-item row.
struct OrderRow {
    id: OrderId,
    customer: Option<CustomerId>,
    store: Option<StoreId>,
    ordered_at: NaiveDateTime,
    line: LineItem,
}

impl OrderLayout {
    fn parse(&self, record: &StringRecord) -> Result<OrderRow, String> {
        let id = cell(record, Some(self.order_id)).ok_or("missing ORDER_ID")?;
        let raw_item = record.get(self.item_name).unwrap_or_default();
        let item = ItemName::new(raw_item).map_err(|err| err.to_string())?;
        let raw_created = cell(record, Some(self.created)).unwrap_or_default();
        let ordered_at = parse_timestamp(raw_created)
            .ok_or_else(|| format!("unparseable ORDER_CREATED_DATE {raw_created:?}"))?;
        let quantity = match cell(record, self.quantity) {
            None => 1,
            Some(raw) => parse_quantity(raw).ok_or_else(|| format!("invalid QUANTITY {raw:?}"))?,
        };
        let unit_price = cell(record, self.price).and_then(|raw| raw.parse::<f64>().ok());
        Ok(OrderRow {
            id: OrderId::new(id),
            customer: cell(record, self.customer).map(CustomerId::new),
            store: cell(record, self.store).map(StoreId::new),
            ordered_at,
            line: LineItem::new(item, quantity, unit_price),
        })
    }
}

/// Accepts positive integers, including spreadsheet-style `2.0`.
fn parse_quantity(raw: &str) -> Option<u32> {
    let whole = raw.strip_suffix(".0").unwrap_or(raw);
    whole.parse::<u32>().ok().filter(|quantity| *quantity > 0)
}

#[derive(Debug)]
struct PendingOrder {
    id: OrderId,
    customer: Option<CustomerId>,
    store: Option<StoreId>,
    ordered_at: NaiveDateTime,
    lines: Vec<LineItem>,
}

#[derive(Debug, Default)]
struct OrderAccumulator {
    pending: Vec<PendingOrder>,
    positions: HashMap<OrderId, usize>,
}

impl OrderAccumulator {
    fn push(&mut self, row: OrderRow) {
        if let Some(order) = self
            .positions
            .get(&row.id)
            .and_then(|position| self.pending.get_mut(*position))
        {
            order.ordered_at = order.ordered_at.min(row.ordered_at);
            order.lines.push(row.line);
            return;
        }
        self.positions.insert(row.id.clone(), self.pending.len());
        self.pending.push(PendingOrder {
            id: row.id,
            customer: row.customer,
            store: row.store,
            ordered_at: row.ordered_at,
            lines: vec![row.line],
        });
    }

    fn into_orders(self) -> Vec<Order> {
        self.pending
            .into_iter()
            .filter_map(|pending| {
                Order::new(
                    pending.id,
                    pending.customer,
                    pending.store,
                    pending.ordered_at,
                    pending.lines,
                )
                .inspect_err(|err| warn!("Dropping order: {err}"))
                .ok()
            })
            .collect()
    }
}
