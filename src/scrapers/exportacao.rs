//! Export ("Exportação") tables, fetched by POST per product category and year.
//!
//! Exports have no raisin ("Uvas passas") page, so `subopt_04` is grape juice
//! here, unlike imports.

use super::SubOpcao;
use super::comercio_exterior;
use super::document::DataTable;
use crate::models::{Etapa, Record};

pub const OPCAO: &str = "opt_06";

pub const SUBOPCOES: [SubOpcao; 4] = [
    SubOpcao::new("subopt_01", "Vinhos de mesa"),
    SubOpcao::new("subopt_02", "Espumantes"),
    SubOpcao::new("subopt_03", "Uvas frescas"),
    SubOpcao::new("subopt_04", "Suco de uva"),
];

pub fn extract_table(table: &DataTable, categoria: &str, ano: i32) -> Vec<Record> {
    comercio_exterior::extract_table(table, Etapa::Exportacao, categoria, ano)
}
