//! Narrow view of a report page: "find the data table, list its rows and cells".
//!
//! Extractors only ever see [`DataTable`]s, so the row-walking logic can be
//! exercised against synthetic tables without parsing any HTML. The
//! [`HtmlPage`] implementation is the only place that touches `scraper`.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::errors::ScrapeError;

/// Class marker of the statistics table on every report page.
pub const DATA_TABLE_MARKER: &str = "tb_dados";

/// A parsed page that may contain a data table.
pub trait TableDocument {
    /// Locate the first table carrying the class `marker`.
    ///
    /// `Ok(None)` means the page parsed but has no such table.
    fn find_table(&self, marker: &str) -> Result<Option<DataTable>, ScrapeError>;
}

/// One cell: its text in two renderings and the classes set on it.
///
/// [`text`](TableCell::text) trims every text node and joins them with no
/// separator, so `<td> Tinto <b></b></td>` is `"Tinto"`.
/// [`inline_text`](TableCell::inline_text) joins the nodes as they are and
/// trims only the ends, keeping the spaces around inline tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCell {
    text: String,
    inline_text: String,
    classes: Vec<String>,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            inline_text: text.clone(),
            text,
            classes: Vec::new(),
        }
    }

    fn from_parts(text: String, inline_text: String) -> Self {
        Self {
            text,
            inline_text,
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn inline_text(&self) -> &str {
        &self.inline_text
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// The `<td>` cells of one `<tr>`, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataTable {
    rows: Vec<TableRow>,
}

impl DataTable {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

/// A table that is already in memory is its own document.
impl TableDocument for DataTable {
    fn find_table(&self, _marker: &str) -> Result<Option<DataTable>, ScrapeError> {
        Ok(Some(self.clone()))
    }
}

static ROW_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("tr").ok());
static CELL_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("td").ok());

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn cached(selector: &'static Lazy<Option<Selector>>, source: &str) -> Result<&'static Selector, ScrapeError> {
    selector.as_ref().ok_or_else(|| ScrapeError::Selector {
        selector: source.to_string(),
        reason: "failed to parse".to_string(),
    })
}

/// An HTML report page parsed with `scraper`.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }
}

impl TableDocument for HtmlPage {
    fn find_table(&self, marker: &str) -> Result<Option<DataTable>, ScrapeError> {
        let table_selector = parse_selector(&format!("table.{marker}"))?;
        let row_selector = cached(&ROW_SELECTOR, "tr")?;
        let cell_selector = cached(&CELL_SELECTOR, "td")?;

        let Some(table) = self.document.select(&table_selector).next() else {
            return Ok(None);
        };

        let rows = table
            .select(row_selector)
            .map(|row| TableRow::new(row.select(cell_selector).map(cell_from_element).collect()))
            .collect();
        Ok(Some(DataTable::new(rows)))
    }
}

fn cell_from_element(element: ElementRef<'_>) -> TableCell {
    let text = element.text().map(str::trim).collect::<String>();
    let inline_text = element.text().collect::<String>().trim().to_string();
    element
        .value()
        .classes()
        .fold(TableCell::from_parts(text, inline_text), TableCell::with_class)
}
