//! Country-keyed trade tables shared by import and export.
//!
//! These pages have no header/sub-row hierarchy: after the title row, every
//! three-cell row is `país | quantidade (kg) | valor (US$)`. Missing numbers
//! are stored as zero. Cells are read with their inner spacing kept.

use super::document::DataTable;
use crate::models::{Etapa, Record};
use crate::utils::{NoValue, normalize_number};

const TRADE_ROW_ARITY: usize = 3;

/// One record per country row. `categoria` is the sub-dimension label the
/// page was fetched for (e.g. `"Espumantes"`).
pub fn extract_table(table: &DataTable, etapa: Etapa, categoria: &str, ano: i32) -> Vec<Record> {
    table
        .rows()
        .iter()
        .skip(1)
        .filter(|row| row.cells().len() == TRADE_ROW_ARITY)
        .map(|row| {
            let cells = row.cells();
            Record::comercio_exterior(
                etapa,
                categoria,
                cells[0].inline_text(),
                normalize_number(cells[1].inline_text(), NoValue::Zero).unwrap_or_default(),
                normalize_number(cells[2].inline_text(), NoValue::Zero).unwrap_or_default(),
                ano,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::rows::fixtures::*;

    #[test]
    fn test_dash_quantity_becomes_zero() {
        let t = table(vec![
            plain(&["Países", "Quantidade (Kg)", "Valor (US$)"]),
            plain(&["Alemanha", "-", "1.234"]),
        ]);
        let records = extract_table(&t, Etapa::Importacao, "Vinhos de mesa", 2022);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pais.as_deref(), Some("Alemanha"));
        assert_eq!(records[0].quantidade_kg, Some(0));
        assert_eq!(records[0].valor_usd, Some(1234));
        assert_eq!(records[0].categoria_produto.as_deref(), Some("Vinhos de mesa"));
        assert_eq!(records[0].etapa, Etapa::Importacao);
    }

    #[test]
    fn test_title_row_always_skipped() {
        // the first row is dropped even if it looks like data
        let t = table(vec![plain(&["Argentina", "10", "20"]), plain(&["Chile", "1.000", "2.500"])]);
        let records = extract_table(&t, Etapa::Exportacao, "Espumantes", 2021);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pais.as_deref(), Some("Chile"));
        assert_eq!(records[0].quantidade_kg, Some(1000));
        assert_eq!(records[0].valor_usd, Some(2500));
    }

    #[test]
    fn test_rows_with_other_arity_skipped() {
        let t = table(vec![
            plain(&["Países", "Quantidade (Kg)", "Valor (US$)"]),
            plain(&["Total", "9"]),
            plain(&["Uruguai", "5", "6"]),
            plain(&["a", "b", "c", "d"]),
        ]);
        assert_eq!(extract_table(&t, Etapa::Exportacao, "Suco de uva", 2024).len(), 1);
    }

    #[test]
    fn test_non_numeric_values_become_zero() {
        let t = table(vec![plain(&["h", "h", "h"]), plain(&["Peru", "n/d", ""])]);
        let records = extract_table(&t, Etapa::Importacao, "Uvas passas", 2020);
        assert_eq!(records[0].quantidade_kg, Some(0));
        assert_eq!(records[0].valor_usd, Some(0));
    }

    #[test]
    fn test_country_split_across_inline_tags_keeps_spaces() {
        use crate::scrapers::document::{DATA_TABLE_MARKER, HtmlPage, TableDocument};

        let page = HtmlPage::parse(
            r#"<table class="tb_dados">
                 <tr><th>Países</th><th>Quantidade (Kg)</th><th>Valor (US$)</th></tr>
                 <tr><td>Estados <b>Unidos</b></td><td> 2.000 </td><td>5.000</td></tr>
               </table>"#,
        );
        let t = page.find_table(DATA_TABLE_MARKER).unwrap().unwrap();
        let records = extract_table(&t, Etapa::Exportacao, "Espumantes", 2023);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pais.as_deref(), Some("Estados Unidos"));
        assert_eq!(records[0].quantidade_kg, Some(2000));
    }
}
