//! Row classification and the grouped row walk shared by the hierarchical tables.
//!
//! Report tables mark the first cell of each row with a class:
//!
//! | class | role | effect |
//! |-------|------|--------|
//! | `tb_item` | [`RowRole::Header`] | starts a new group; its label becomes the cursor |
//! | `tb_subitem` | [`RowRole::SubRow`] | leaf value attributed to the current group |
//! | anything else | [`RowRole::Other`] | skipped |
//!
//! Rows whose cell count differs from the table's expected arity are
//! [`RowRole::Other`] as well.

use super::document::{DataTable, TableRow};

pub const HEADER_CLASS: &str = "tb_item";
pub const SUB_ROW_CLASS: &str = "tb_subitem";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Header,
    SubRow,
    Other,
}

/// Decide the role of `row` in a table whose data rows have `arity` cells.
pub fn classify(row: &TableRow, arity: usize) -> RowRole {
    let cells = row.cells();
    if cells.len() != arity {
        return RowRole::Other;
    }
    let first = &cells[0];
    if first.has_class(HEADER_CLASS) {
        RowRole::Header
    } else if first.has_class(SUB_ROW_CLASS) {
        RowRole::SubRow
    } else {
        RowRole::Other
    }
}

/// A classified two-column row with its grouping already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupedRow<'a> {
    Header {
        label: &'a str,
        value: &'a str,
    },
    Leaf {
        group: Option<&'a str>,
        label: &'a str,
        value: &'a str,
    },
}

/// Walk a label/value table, threading the most recent header label into
/// every following sub-row.
///
/// The cursor starts empty for each call, so sub-rows that appear before any
/// header carry `group: None`. [`RowRole::Other`] rows are dropped.
pub fn walk_grouped<'a>(table: &'a DataTable) -> Vec<GroupedRow<'a>> {
    let (_, rows) = table.rows().iter().fold(
        (None::<&'a str>, Vec::new()),
        |(cursor, mut out), row| {
            let cells = row.cells();
            match classify(row, 2) {
                RowRole::Header => {
                    let label = cells[0].text();
                    out.push(GroupedRow::Header {
                        label,
                        value: cells[1].text(),
                    });
                    (Some(label), out)
                }
                RowRole::SubRow => {
                    out.push(GroupedRow::Leaf {
                        group: cursor,
                        label: cells[0].text(),
                        value: cells[1].text(),
                    });
                    (cursor, out)
                }
                RowRole::Other => (cursor, out),
            }
        },
    );
    rows
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_classify_roles() {
        assert_eq!(classify(&header("TINTAS", "1"), 2), RowRole::Header);
        assert_eq!(classify(&sub("Ancelota", "1"), 2), RowRole::SubRow);
        assert_eq!(classify(&plain(&["Total", "1"]), 2), RowRole::Other);
    }

    #[test]
    fn test_classify_wrong_arity_is_other() {
        assert_eq!(classify(&header("TINTAS", "1"), 3), RowRole::Other);
        assert_eq!(classify(&plain(&[]), 2), RowRole::Other);
    }

    #[test]
    fn test_walk_grouped_threads_cursor() {
        let t = table(vec![
            header("TINTAS", "10"),
            sub("Ancelota", "7"),
            sub("Alicante", "3"),
            header("BRANCAS E ROSADAS", "5"),
            sub("Moscato", "5"),
        ]);
        let rows = walk_grouped(&t);
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[2],
            GroupedRow::Leaf {
                group: Some("TINTAS"),
                label: "Alicante",
                value: "3"
            }
        );
        assert_eq!(
            rows[4],
            GroupedRow::Leaf {
                group: Some("BRANCAS E ROSADAS"),
                label: "Moscato",
                value: "5"
            }
        );
    }

    #[test]
    fn test_walk_grouped_leaf_before_header_has_no_group() {
        let t = table(vec![sub("Orphan", "1"), header("TINTAS", "1")]);
        let rows = walk_grouped(&t);
        assert_eq!(
            rows[0],
            GroupedRow::Leaf {
                group: None,
                label: "Orphan",
                value: "1"
            }
        );
    }

    #[test]
    fn test_walk_grouped_skips_other_rows() {
        let t = table(vec![
            plain(&[]),
            header("VINHO DE MESA", "1"),
            plain(&["Total", "9"]),
            plain(&["a", "b", "c"]),
            sub("Tinto", "1"),
        ]);
        let rows = walk_grouped(&t);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_walk_grouped_cursor_does_not_leak_between_tables() {
        let first = table(vec![header("TINTAS", "1")]);
        let second = table(vec![sub("Ancelota", "1")]);
        let _ = walk_grouped(&first);
        let rows = walk_grouped(&second);
        assert!(matches!(rows[0], GroupedRow::Leaf { group: None, .. }));
    }
}
