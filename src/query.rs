//! Filtering and pagination of record listings.
//!
//! Each stage accepts its own set of filters; a filter given for a field the
//! stage does not support is ignored, as is an absent one. Filters compare
//! for exact equality.
//!
//! | Stage | Filters |
//! |-------|---------|
//! | Produção | `ano`, `categoria_produto` |
//! | Processamento | `ano`, `categoria_uva`, `tipo_uva` |
//! | Comercialização | `ano`, `categoria_produto`, `tipo_produto` (matches `produto`) |
//! | Importação, Exportação | `ano`, `categoria_produto`, `pais` |

use thiserror::Error;
use tracing::error;

use crate::errors::ScrapeError;
use crate::models::{Etapa, Record, YearRange};
use crate::store::RecordStore;

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_OFFSET: usize = 0;

/// Failure of a listing, as reported to its caller.
///
/// Internal failures carry a fixed message; the cause is only logged.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Erro interno ao consultar os dados")]
    Internal,
}

impl From<ScrapeError> for ReadError {
    fn from(e: ScrapeError) -> Self {
        error!(error = %e, "Listing failed");
        ReadError::Internal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub ano: Option<i32>,
    pub categoria_produto: Option<String>,
    pub tipo_produto: Option<String>,
    pub categoria_uva: Option<String>,
    pub tipo_uva: Option<String>,
    pub pais: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            ano: None,
            categoria_produto: None,
            tipo_produto: None,
            categoria_uva: None,
            tipo_uva: None,
            pais: None,
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual.as_deref() == Some(w.as_str()),
    }
}

impl ListQuery {
    /// Whether `record` passes every filter `etapa` supports.
    pub fn matches(&self, etapa: Etapa, record: &Record) -> bool {
        if record.etapa != etapa || self.ano.is_some_and(|ano| record.ano != ano) {
            return false;
        }
        match etapa {
            Etapa::Producao => field_matches(&self.categoria_produto, &record.categoria_produto),
            Etapa::Processamento => {
                field_matches(&self.categoria_uva, &record.categoria_uva)
                    && field_matches(&self.tipo_uva, &record.tipo_uva)
            }
            Etapa::Comercializacao => {
                field_matches(&self.categoria_produto, &record.categoria_produto)
                    && field_matches(&self.tipo_produto, &record.produto)
            }
            Etapa::Importacao | Etapa::Exportacao => {
                field_matches(&self.categoria_produto, &record.categoria_produto)
                    && field_matches(&self.pais, &record.pais)
            }
        }
    }

    /// Filter, then take `limit` records starting at `offset`.
    pub fn apply(&self, etapa: Etapa, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| self.matches(etapa, r))
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

/// List stored records of `etapa` within `range`.
pub fn from_store(store: &RecordStore, etapa: Etapa, range: YearRange, query: &ListQuery) -> Result<Vec<Record>, ReadError> {
    let stored = store.list(etapa)?;
    let in_range = stored.into_iter().filter(|r| range.contains(r.ano)).collect();
    Ok(query.apply(etapa, in_range))
}
