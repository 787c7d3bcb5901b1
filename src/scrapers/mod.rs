//! Year-range scraping of the VitiBrasil report tables.
//!
//! Every stage is scraped the same way:
//!
//! 1. **Planning**: expand a [`YearRange`] (and the stage's sub-dimensions, if
//!    any) into an ordered list of [`FetchUnit`]s
//! 2. **Fetching**: one request per unit through a [`FetchPage`]
//! 3. **Extraction**: the stage's extractor turns the page's data table into
//!    [`Record`]s
//!
//! # Supported Stages
//!
//! | Stage | Module | `opcao` | Sub-dimensions | Order |
//! |-------|--------|---------|----------------|-------|
//! | Produção | [`producao`] | `opt_02` | none | year |
//! | Processamento | [`processamento`] | `opt_03` | 4 grape categories | year, then category |
//! | Comercialização | [`comercializacao`] | `opt_04` | none | year |
//! | Importação | [`importacao`] | `opt_05` | 5 product categories | category, then year |
//! | Exportação | [`exportacao`] | `opt_06` | 4 product categories | category, then year |
//!
//! Units run strictly one after another, so output order is deterministic.
//! A unit that cannot be fetched or parsed is skipped and recorded as such in
//! the [`ScrapeReport`]; it never aborts the run.

pub mod comercializacao;
pub mod comercio_exterior;
pub mod document;
pub mod exportacao;
pub mod importacao;
pub mod processamento;
pub mod producao;
pub mod rows;
pub mod transport;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::errors::ScrapeError;
use crate::models::{Etapa, Record, YearRange};
use crate::utils::truncate_for_log;
use document::{DATA_TABLE_MARKER, TableDocument};
use transport::FetchPage;

/// A fixed classification code that partitions a report into separate pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubOpcao {
    /// Value sent as `subopcao` (e.g. `"subopt_01"`).
    pub code: &'static str,
    /// Human label stored on the records (e.g. `"Viníferas"`).
    pub label: &'static str,
}

impl SubOpcao {
    pub const fn new(code: &'static str, label: &'static str) -> Self {
        Self { code, label }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One page to fetch: a stage, a year and optionally a sub-dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchUnit {
    pub etapa: Etapa,
    pub opcao: &'static str,
    pub subopcao: Option<SubOpcao>,
    pub ano: i32,
}

impl FetchUnit {
    /// Trade pages only answer to form posts.
    pub fn method(&self) -> HttpMethod {
        match self.etapa {
            Etapa::Importacao | Etapa::Exportacao => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }
}

/// Expand a year range into the stage's fetch units, in scrape order.
pub fn plan_units(etapa: Etapa, range: YearRange) -> Vec<FetchUnit> {
    let unit = |opcao: &'static str, subopcao: Option<SubOpcao>, ano: i32| FetchUnit {
        etapa,
        opcao,
        subopcao,
        ano,
    };
    match etapa {
        Etapa::Producao => range.years().map(|ano| unit(producao::OPCAO, None, ano)).collect(),
        Etapa::Comercializacao => range
            .years()
            .map(|ano| unit(comercializacao::OPCAO, None, ano))
            .collect(),
        Etapa::Processamento => range
            .years()
            .flat_map(|ano| {
                processamento::SUBOPCOES
                    .iter()
                    .map(move |sub| unit(processamento::OPCAO, Some(*sub), ano))
            })
            .collect(),
        Etapa::Importacao => trade_units(importacao::OPCAO, &importacao::SUBOPCOES, range, unit),
        Etapa::Exportacao => trade_units(exportacao::OPCAO, &exportacao::SUBOPCOES, range, unit),
    }
}

fn trade_units(
    opcao: &'static str,
    subopcoes: &[SubOpcao],
    range: YearRange,
    unit: impl Fn(&'static str, Option<SubOpcao>, i32) -> FetchUnit,
) -> Vec<FetchUnit> {
    subopcoes
        .iter()
        .flat_map(|sub| range.years().map(move |ano| (*sub, ano)))
        .map(|(sub, ano)| unit(opcao, Some(sub), ano))
        .collect()
}

/// Why a unit contributed no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The fetch failed (transport error, timeout, non-2xx).
    NoDocument,
    /// The page parsed but had no data table.
    TableMissing,
    /// Anything else that went wrong while handling the unit.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Extracted { unit: FetchUnit, records: Vec<Record> },
    Skipped { unit: FetchUnit, reason: SkipReason },
}

/// Per-unit outcomes of one stage scrape, in scrape order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeReport {
    pub etapa: Etapa,
    pub outcomes: Vec<UnitOutcome>,
}

impl ScrapeReport {
    pub fn extracted_units(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UnitOutcome::Extracted { .. }))
            .count()
    }

    pub fn skipped_units(&self) -> usize {
        self.outcomes.len() - self.extracted_units()
    }

    pub fn record_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                UnitOutcome::Extracted { records, .. } => records.len(),
                UnitOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// Concatenate every unit's records, keeping scrape order.
    pub fn into_records(self) -> Vec<Record> {
        self.outcomes
            .into_iter()
            .flat_map(|o| match o {
                UnitOutcome::Extracted { records, .. } => records,
                UnitOutcome::Skipped { .. } => Vec::new(),
            })
            .collect()
    }
}

/// Scrape every unit of `etapa` within `range`, one request at a time.
#[instrument(level = "info", skip(fetcher), fields(inicio = range.inicio(), fim = range.fim()))]
pub async fn scrape_etapa<F: FetchPage>(fetcher: &F, etapa: Etapa, range: YearRange) -> ScrapeReport {
    let units = plan_units(etapa, range);
    info!(units = units.len(), years = range.year_count(), "Scraping stage");

    let outcomes: Vec<UnitOutcome> = stream::iter(units)
        .then(|unit| async move { run_unit(fetcher, unit).await })
        .collect()
        .await;

    let report = ScrapeReport { etapa, outcomes };
    info!(
        extracted_units = report.extracted_units(),
        skipped_units = report.skipped_units(),
        records = report.record_count(),
        "Finished stage"
    );
    report
}

async fn run_unit<F: FetchPage>(fetcher: &F, unit: FetchUnit) -> UnitOutcome {
    let Some(document) = fetcher.fetch(&unit).await else {
        return UnitOutcome::Skipped {
            unit,
            reason: SkipReason::NoDocument,
        };
    };

    match extract_unit(&document, &unit) {
        Ok(Some(records)) => {
            debug!(etapa = %unit.etapa, ano = unit.ano, records = records.len(), "Extracted unit");
            UnitOutcome::Extracted { unit, records }
        }
        Ok(None) => {
            debug!(etapa = %unit.etapa, ano = unit.ano, "No data table on page");
            UnitOutcome::Skipped {
                unit,
                reason: SkipReason::TableMissing,
            }
        }
        Err(e) => {
            let reason = truncate_for_log(&e.to_string(), 300);
            warn!(
                etapa = %unit.etapa,
                ano = unit.ano,
                subopcao = unit.subopcao.map(|s| s.code),
                error = %reason,
                "Unit failed; skipping"
            );
            UnitOutcome::Skipped {
                unit,
                reason: SkipReason::Failed(reason),
            }
        }
    }
}

/// Run the stage's extractor over the page's data table.
///
/// `Ok(None)` when the page has no data table.
pub fn extract_unit<D: TableDocument>(document: &D, unit: &FetchUnit) -> Result<Option<Vec<Record>>, ScrapeError> {
    let Some(table) = document.find_table(DATA_TABLE_MARKER)? else {
        return Ok(None);
    };
    let categoria = unit.subopcao.map(|s| s.label).unwrap_or_default();
    let records = match unit.etapa {
        Etapa::Producao => producao::extract_table(&table, unit.ano),
        Etapa::Comercializacao => comercializacao::extract_table(&table, unit.ano),
        Etapa::Processamento => processamento::extract_table(&table, categoria, unit.ano),
        Etapa::Importacao => importacao::extract_table(&table, categoria, unit.ano),
        Etapa::Exportacao => exportacao::extract_table(&table, categoria, unit.ano),
    };
    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::document::{DataTable, HtmlPage};
    use super::rows::fixtures::*;
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned pages keyed by (subopcao, ano) and remembers request order.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<(Option<&'static str>, i32), String>,
        requested: RefCell<Vec<FetchUnit>>,
    }

    impl FakeFetcher {
        fn with_page(mut self, subopcao: Option<&'static str>, ano: i32, html: &str) -> Self {
            self.pages.insert((subopcao, ano), html.to_string());
            self
        }
    }

    impl FetchPage for FakeFetcher {
        type Document = HtmlPage;

        async fn fetch(&self, unit: &FetchUnit) -> Option<HtmlPage> {
            self.requested.borrow_mut().push(*unit);
            self.pages
                .get(&(unit.subopcao.map(|s| s.code), unit.ano))
                .map(|body| HtmlPage::parse(body))
        }
    }

    /// A document whose table lookup always fails.
    struct BrokenDocument;

    impl TableDocument for BrokenDocument {
        fn find_table(&self, marker: &str) -> Result<Option<DataTable>, ScrapeError> {
            Err(ScrapeError::Selector {
                selector: format!("table.{marker}"),
                reason: "unexpected token".to_string(),
            })
        }
    }

    struct BrokenFetcher;

    impl FetchPage for BrokenFetcher {
        type Document = BrokenDocument;

        async fn fetch(&self, _unit: &FetchUnit) -> Option<BrokenDocument> {
            Some(BrokenDocument)
        }
    }

    const PROCESSAMENTO_2022: &str = r#"
        <table class="tb_base tb_dados">
          <thead><tr><th>Cultivar</th><th>Quantidade (Kg)</th></tr></thead>
          <tbody>
            <tr><td class="tb_item">TINTAS</td><td class="tb_item">139.320.884</td></tr>
            <tr><td class="tb_subitem">Ancelota</td><td class="tb_subitem">139.320.884</td></tr>
            <tr><td class="tb_subitem">Alicante</td><td class="tb_subitem">-</td></tr>
          </tbody>
        </table>"#;

    const EXPORTACAO_2023: &str = r#"
        <table class="tb_base tb_dados">
          <thead><tr><th>Países</th><th>Quantidade (Kg)</th><th>Valor (US$)</th></tr></thead>
          <tbody>
            <tr><td>Paraguai</td><td>-</td><td>1.234</td></tr>
            <tr><td>Estados Unidos</td><td>2.000</td><td>5.000</td></tr>
          </tbody>
        </table>"#;

    #[test]
    fn test_plan_units_processamento_year_major() {
        let units = plan_units(Etapa::Processamento, YearRange::new(2021, 2022).unwrap());
        assert_eq!(units.len(), 8);
        assert_eq!((units[0].ano, units[0].subopcao.unwrap().code), (2021, "subopt_01"));
        assert_eq!((units[3].ano, units[3].subopcao.unwrap().code), (2021, "subopt_04"));
        assert_eq!((units[4].ano, units[4].subopcao.unwrap().code), (2022, "subopt_01"));
        assert!(units.iter().all(|u| u.method() == HttpMethod::Get));
    }

    #[test]
    fn test_plan_units_trade_category_major() {
        let units = plan_units(Etapa::Importacao, YearRange::new(2020, 2022).unwrap());
        assert_eq!(units.len(), 15);
        assert_eq!((units[0].subopcao.unwrap().code, units[0].ano), ("subopt_01", 2020));
        assert_eq!((units[2].subopcao.unwrap().code, units[2].ano), ("subopt_01", 2022));
        assert_eq!((units[3].subopcao.unwrap().code, units[3].ano), ("subopt_02", 2020));
        assert!(units.iter().all(|u| u.method() == HttpMethod::Post && u.opcao == "opt_05"));

        let exports = plan_units(Etapa::Exportacao, YearRange::new(2024, 2024).unwrap());
        assert_eq!(exports.len(), 4);
        assert_eq!(exports[3].subopcao.unwrap().label, "Suco de uva");
    }

    #[test]
    fn test_plan_units_flat_stages() {
        let units = plan_units(Etapa::Producao, Etapa::Producao.default_range());
        assert_eq!(units.len(), 55);
        assert!(units.iter().all(|u| u.subopcao.is_none() && u.opcao == "opt_02"));
        let units = plan_units(Etapa::Comercializacao, YearRange::new(2000, 2001).unwrap());
        assert_eq!(units.iter().map(|u| u.ano).collect::<Vec<_>>(), vec![2000, 2001]);
    }

    #[tokio::test]
    async fn test_processamento_single_year_end_to_end() {
        let fetcher = FakeFetcher::default().with_page(Some("subopt_01"), 2022, PROCESSAMENTO_2022);
        let report = scrape_etapa(&fetcher, Etapa::Processamento, YearRange::new(2022, 2022).unwrap()).await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.extracted_units(), 1);
        assert_eq!(report.skipped_units(), 3);

        let records = report.into_records();
        assert_eq!(
            records,
            vec![
                Record::processamento("Viníferas", Some("TINTAS"), "Ancelota", Some(139_320_884), 2022),
                Record::processamento("Viníferas", Some("TINTAS"), "Alicante", None, 2022),
            ]
        );
    }

    #[tokio::test]
    async fn test_units_run_in_order_and_failures_are_skipped() {
        let fetcher = FakeFetcher::default()
            .with_page(Some("subopt_02"), 2023, EXPORTACAO_2023)
            .with_page(Some("subopt_01"), 2024, "<html><body>sem tabela</body></html>");
        let range = YearRange::new(2023, 2024).unwrap();
        let report = scrape_etapa(&fetcher, Etapa::Exportacao, range).await;

        let requested: Vec<_> = fetcher
            .requested
            .borrow()
            .iter()
            .map(|u| (u.subopcao.unwrap().code, u.ano))
            .collect();
        let planned: Vec<_> = plan_units(Etapa::Exportacao, range)
            .iter()
            .map(|u| (u.subopcao.unwrap().code, u.ano))
            .collect();
        assert_eq!(requested, planned);

        let reasons: Vec<_> = report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                UnitOutcome::Skipped { reason, .. } => Some(reason.clone()),
                _ => None,
            })
            .collect();
        assert!(reasons.contains(&SkipReason::TableMissing));
        assert!(reasons.contains(&SkipReason::NoDocument));

        let records = report.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].categoria_produto.as_deref(), Some("Espumantes"));
        assert_eq!(records[0].quantidade_kg, Some(0));
        assert_eq!(records[0].valor_usd, Some(1234));
        assert!(records.iter().all(|r| r.etapa == Etapa::Exportacao && range.contains(r.ano)));
    }

    #[tokio::test]
    async fn test_failing_units_do_not_abort_the_run() {
        let report = scrape_etapa(&BrokenFetcher, Etapa::Producao, YearRange::new(2001, 2003).unwrap()).await;
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes.iter().all(|o| matches!(
            o,
            UnitOutcome::Skipped {
                reason: SkipReason::Failed(_),
                ..
            }
        )));
        assert!(report.into_records().is_empty());
    }

    #[tokio::test]
    async fn test_fully_failed_run_is_empty() {
        let report = scrape_etapa(&FakeFetcher::default(), Etapa::Comercializacao, YearRange::new(1970, 1975).unwrap()).await;
        assert_eq!(report.skipped_units(), 6);
        assert!(report.into_records().is_empty());
    }

    #[test]
    fn test_extract_unit_dispatches_by_stage() {
        let t = table(vec![header("VINHO DE MESA", "1"), sub("Tinto", "1.000")]);
        let unit = FetchUnit {
            etapa: Etapa::Comercializacao,
            opcao: comercializacao::OPCAO,
            subopcao: None,
            ano: 2010,
        };
        let records = extract_unit(&t, &unit).unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].produto.as_deref(), Some("Tinto"));
    }
}
