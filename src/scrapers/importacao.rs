//! Import ("Importação") tables, fetched by POST per product category and year.

use super::SubOpcao;
use super::comercio_exterior;
use super::document::DataTable;
use crate::models::{Etapa, Record};

pub const OPCAO: &str = "opt_05";

pub const SUBOPCOES: [SubOpcao; 5] = [
    SubOpcao::new("subopt_01", "Vinhos de mesa"),
    SubOpcao::new("subopt_02", "Espumantes"),
    SubOpcao::new("subopt_03", "Uvas frescas"),
    SubOpcao::new("subopt_04", "Uvas passas"),
    SubOpcao::new("subopt_05", "Suco de uva"),
];

pub fn extract_table(table: &DataTable, categoria: &str, ano: i32) -> Vec<Record> {
    comercio_exterior::extract_table(table, Etapa::Importacao, categoria, ano)
}
