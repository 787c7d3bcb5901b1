//! Production ("Produção") tables: liters produced per product, one page per year.
//!
//! Header rows carry a product category and its aggregate; sub-rows carry the
//! product types. The aggregate is kept as a "total" record with empty
//! `tipo_produto` and `quantidade_l`, and quantities stay as the site prints
//! them (`"169.762.429"`).

use super::document::DataTable;
use super::rows::{GroupedRow, walk_grouped};
use crate::models::Record;

pub const OPCAO: &str = "opt_02";

pub fn extract_table(table: &DataTable, ano: i32) -> Vec<Record> {
    walk_grouped(table)
        .into_iter()
        .map(|row| match row {
            GroupedRow::Header { label, .. } => Record::producao(Some(label), "", "", ano),
            GroupedRow::Leaf { group, label, value } => Record::producao(group, label, value, ano),
        })
        .collect()
}
