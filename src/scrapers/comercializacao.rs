//! Commercialization ("Comercialização") tables.
//!
//! Same layout as [`producao`](super::producao): a total record per category
//! header and a detail record per product, with the product in `produto`.

use super::document::DataTable;
use super::rows::{GroupedRow, walk_grouped};
use crate::models::Record;

pub const OPCAO: &str = "opt_04";

pub fn extract_table(table: &DataTable, ano: i32) -> Vec<Record> {
    walk_grouped(table)
        .into_iter()
        .map(|row| match row {
            GroupedRow::Header { label, .. } => Record::comercializacao(Some(label), "", "", ano),
            GroupedRow::Leaf { group, label, value } => Record::comercializacao(group, label, value, ano),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Etapa;
    use crate::scrapers::rows::fixtures::*;

    #[test]
    fn test_total_and_detail_use_produto() {
        let t = table(vec![header("VINHO DE MESA", "187.016.848"), sub("Tinto", "165.097.539")]);
        let records = extract_table(&t, 2022);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.etapa == Etapa::Comercializacao));
        assert!(records.iter().all(|r| r.tipo_produto.is_none()));

        assert_eq!(records[0].produto.as_deref(), Some(""));
        assert_eq!(records[0].quantidade_l.as_deref(), Some(""));
        assert_eq!(records[1].produto.as_deref(), Some("Tinto"));
        assert_eq!(records[1].quantidade_l.as_deref(), Some("165.097.539"));
        assert_eq!(records[1].categoria_produto.as_deref(), Some("VINHO DE MESA"));
    }

    #[test]
    fn test_three_cell_rows_are_ignored() {
        let t = table(vec![plain(&["Produto", "Quantidade", "x"]), header("ESPUMANTES", "1")]);
        assert_eq!(extract_table(&t, 2022).len(), 1);
    }
}
