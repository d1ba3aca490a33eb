//! Test helpers for composing CSV datasets in a temporary workspace.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Ten `wings, fries, cola` baskets and five `wings, ranch dip` baskets,
/// all placed on 1 March 2024.
pub(super) const ORDERS_CSV: &str = "\
ORDER_ID,CUSTOMER_ID,STORE_NUMBER,ITEM_NAME,QUANTITY,PRICE,ORDER_CREATED_DATE
o-1,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-1,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-1,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-2,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-2,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-2,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-3,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-3,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-3,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-4,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-4,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-4,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-5,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-5,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-5,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-6,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-6,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-6,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-7,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-7,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-7,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-8,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-8,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-8,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-9,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-9,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-9,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-10,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-10,c-9,s-1,fries,1,2.99,2024-03-01 12:00:00
o-10,c-9,s-1,cola,1,1.99,2024-03-01 12:00:00
o-11,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-11,c-9,s-1,ranch dip,1,0.99,2024-03-01 12:00:00
o-12,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-12,c-9,s-1,ranch dip,1,0.99,2024-03-01 12:00:00
o-13,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-13,c-9,s-1,ranch dip,1,0.99,2024-03-01 12:00:00
o-14,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-14,c-9,s-1,ranch dip,1,0.99,2024-03-01 12:00:00
o-15,c-9,s-1,wings,1,8.99,2024-03-01 12:00:00
o-15,c-9,s-1,ranch dip,1,0.99,2024-03-01 12:00:00
";

/// One answerable query with a held-out item and one with no usable items.
pub(super) const QUERIES_CSV: &str = "\
ORDER_ID,CUSTOMER_ID,STORE_NUMBER,item1,item2,MISSING_ITEM
q-1,c-1,s-1,wings,,cola
q-2,,,,,
";

pub(super) const CUSTOMERS_CSV: &str = "\
CUSTOMER_ID,CUSTOMER_TYPE,REGISTRATION_DATE,TOTAL_ORDERS
c-1,Registered,2023-01-05,12
";

pub(super) const STORES_CSV: &str = "\
STORE_NUMBER,STORE_NAME,ORDER_CHANNEL_NAME,CITY
s-1,Downtown,Website,Dallas
";

/// Temporary directory addressed through UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }

    /// Orders and queries for a plain run.
    pub(super) fn standard_inputs(&self) -> (Utf8PathBuf, Utf8PathBuf) {
        (
            self.write("orders.csv", ORDERS_CSV),
            self.write("queries.csv", QUERIES_CSV),
        )
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

/// Header row of the output table.
pub(super) fn read_header(path: &Utf8Path) -> Vec<String> {
    let text = fs::read_to_string(path.as_std_path()).expect("read output");
    let header = text.lines().next().expect("header row");
    header.split(',').map(str::to_owned).collect()
}

/// Recommendation cells of each output row, keyed by order id.
pub(super) fn read_output(path: &Utf8Path) -> Vec<(String, Vec<String>)> {
    let text = fs::read_to_string(path.as_std_path()).expect("read output");
    let mut lines = text.lines();
    let header: Vec<&str> = lines.next().expect("header row").split(',').collect();
    let id_column = header
        .iter()
        .position(|column| *column == "ORDER_ID")
        .expect("order id column");
    let first_slot = header
        .iter()
        .position(|column| column.starts_with("RECOMMENDATION"))
        .expect("recommendation columns");
    lines
        .map(|line| {
            let cells: Vec<String> = line.split(',').map(str::to_owned).collect();
            let id = cells.get(id_column).cloned().unwrap_or_default();
            let slots = cells.into_iter().skip(first_slot).collect();
            (id, slots)
        })
        .collect()
}
