//! Processing ("Processamento") tables: grapes crushed per cultivar, in kg.
//!
//! Each page covers one grape category (sub-dimension) for one year. Header
//! rows name the grape type (`TINTAS`, `BRANCAS E ROSADAS`), sub-rows name the
//! cultivar. Missing quantities are stored as `null`.

use super::SubOpcao;
use super::document::DataTable;
use super::rows::{GroupedRow, walk_grouped};
use crate::models::Record;
use crate::utils::{NoValue, normalize_number};

pub const OPCAO: &str = "opt_03";

pub const SUBOPCOES: [SubOpcao; 4] = [
    SubOpcao::new("subopt_01", "Viníferas"),
    SubOpcao::new("subopt_02", "Americanas e híbridas"),
    SubOpcao::new("subopt_03", "Uvas de mesa"),
    SubOpcao::new("subopt_04", "Sem classificação"),
];

/// One record per cultivar sub-row, attributed to the grape type above it.
pub fn extract_table(table: &DataTable, categoria_uva: &str, ano: i32) -> Vec<Record> {
    walk_grouped(table)
        .into_iter()
        .filter_map(|row| match row {
            GroupedRow::Header { .. } => None,
            GroupedRow::Leaf { group, label, value } => Some(Record::processamento(
                categoria_uva,
                group,
                label,
                normalize_number(value, NoValue::Null),
                ano,
            )),
        })
        .collect()
}
