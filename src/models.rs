//! Data models for scraped VitiBrasil records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Etapa`]: The reporting stage a record belongs to
//! - [`Record`]: The flat, uniform record every extractor emits
//! - [`YearRange`]: A validated inclusive span of report years
//!
//! Field names are the Portuguese column names used by the store and by the
//! JSON output, so the JSON schema is identical to the table schema.

use std::fmt;
use std::ops::RangeInclusive;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::ScrapeError;

/// First report year published by the site.
pub const MIN_ANO: i32 = 1970;
/// Last report year published by the site.
pub const MAX_ANO: i32 = 2024;

/// The reporting stage ("etapa") of a record.
///
/// Serializes as the Portuguese label shown on the site (e.g. `"Produção"`);
/// on the command line it is written as an ASCII slug (e.g. `producao`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Etapa {
    #[serde(rename = "Produção")]
    #[value(name = "producao")]
    Producao,
    #[serde(rename = "Processamento")]
    #[value(name = "processamento")]
    Processamento,
    #[serde(rename = "Comercialização")]
    #[value(name = "comercializacao")]
    Comercializacao,
    #[serde(rename = "Importação")]
    #[value(name = "importacao")]
    Importacao,
    #[serde(rename = "Exportação")]
    #[value(name = "exportacao")]
    Exportacao,
}

impl Etapa {
    /// All stages, in the order a full population run visits them.
    pub const ALL: [Etapa; 5] = [
        Etapa::Producao,
        Etapa::Processamento,
        Etapa::Comercializacao,
        Etapa::Importacao,
        Etapa::Exportacao,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Etapa::Producao => "Produção",
            Etapa::Processamento => "Processamento",
            Etapa::Comercializacao => "Comercialização",
            Etapa::Importacao => "Importação",
            Etapa::Exportacao => "Exportação",
        }
    }

    /// ASCII name used for file names and CLI arguments.
    pub fn slug(self) -> &'static str {
        match self {
            Etapa::Producao => "producao",
            Etapa::Processamento => "processamento",
            Etapa::Comercializacao => "comercializacao",
            Etapa::Importacao => "importacao",
            Etapa::Exportacao => "exportacao",
        }
    }

    /// Parse the stored label back into a stage.
    pub fn from_label(label: &str) -> Result<Etapa, ScrapeError> {
        Etapa::ALL
            .into_iter()
            .find(|e| e.label() == label)
            .ok_or_else(|| ScrapeError::UnknownEtapa(label.to_string()))
    }

    /// Year range scraped when the caller does not give one.
    pub fn default_range(self) -> YearRange {
        match self {
            Etapa::Producao | Etapa::Comercializacao => YearRange {
                inicio: MIN_ANO,
                fim: MAX_ANO,
            },
            Etapa::Processamento | Etapa::Importacao | Etapa::Exportacao => YearRange {
                inicio: 2020,
                fim: MAX_ANO,
            },
        }
    }
}

impl fmt::Display for Etapa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An inclusive `[inicio, fim]` span of report years.
///
/// Construction through [`YearRange::new`] guarantees both ends lie within
/// [`MIN_ANO`]..=[`MAX_ANO`] and `inicio <= fim`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    inicio: i32,
    fim: i32,
}

impl YearRange {
    pub fn new(inicio: i32, fim: i32) -> Result<Self, ScrapeError> {
        let in_bounds = |ano: i32| (MIN_ANO..=MAX_ANO).contains(&ano);
        if !in_bounds(inicio) || !in_bounds(fim) || inicio > fim {
            return Err(ScrapeError::InvalidYearRange {
                inicio,
                fim,
                min: MIN_ANO,
                max: MAX_ANO,
            });
        }
        Ok(Self { inicio, fim })
    }

    /// Resolve optional CLI bounds against a stage's defaults.
    pub fn resolve(etapa: Etapa, inicio: Option<i32>, fim: Option<i32>) -> Result<Self, ScrapeError> {
        let default = etapa.default_range();
        YearRange::new(inicio.unwrap_or(default.inicio), fim.unwrap_or(default.fim))
    }

    pub fn inicio(&self) -> i32 {
        self.inicio
    }

    pub fn fim(&self) -> i32 {
        self.fim
    }

    pub fn contains(&self, ano: i32) -> bool {
        (self.inicio..=self.fim).contains(&ano)
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.inicio..=self.fim
    }

    pub fn year_count(&self) -> usize {
        (self.fim - self.inicio + 1) as usize
    }
}

/// One normalized data point scraped from a report table.
///
/// Only `etapa` and `ano` are always present. Each extractor populates the
/// subset of fields that belongs to its stage and leaves the rest `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub etapa: Etapa,
    pub categoria_uva: Option<String>,
    pub tipo_uva: Option<String>,
    pub nome_uva: Option<String>,
    pub categoria_produto: Option<String>,
    pub tipo_produto: Option<String>,
    pub produto: Option<String>,
    /// Liters, kept as the site's grouped-digit text (e.g. `"169.762.429"`).
    pub quantidade_l: Option<String>,
    pub quantidade_kg: Option<i64>,
    pub valor_usd: Option<i64>,
    pub ano: i32,
    pub pais: Option<String>,
}

impl Record {
    /// A record with only the mandatory fields set.
    pub fn new(etapa: Etapa, ano: i32) -> Self {
        Self {
            etapa,
            categoria_uva: None,
            tipo_uva: None,
            nome_uva: None,
            categoria_produto: None,
            tipo_produto: None,
            produto: None,
            quantidade_l: None,
            quantidade_kg: None,
            valor_usd: None,
            ano,
            pais: None,
        }
    }

    pub fn processamento(
        categoria_uva: &str,
        tipo_uva: Option<&str>,
        nome_uva: &str,
        quantidade_kg: Option<i64>,
        ano: i32,
    ) -> Self {
        Self {
            categoria_uva: Some(categoria_uva.to_string()),
            tipo_uva: tipo_uva.map(str::to_string),
            nome_uva: Some(nome_uva.to_string()),
            quantidade_kg,
            ..Record::new(Etapa::Processamento, ano)
        }
    }

    pub fn producao(categoria: Option<&str>, tipo_produto: &str, quantidade_l: &str, ano: i32) -> Self {
        Self {
            categoria_produto: categoria.map(str::to_string),
            tipo_produto: Some(tipo_produto.to_string()),
            quantidade_l: Some(quantidade_l.to_string()),
            ..Record::new(Etapa::Producao, ano)
        }
    }

    pub fn comercializacao(categoria: Option<&str>, produto: &str, quantidade_l: &str, ano: i32) -> Self {
        Self {
            categoria_produto: categoria.map(str::to_string),
            produto: Some(produto.to_string()),
            quantidade_l: Some(quantidade_l.to_string()),
            ..Record::new(Etapa::Comercializacao, ano)
        }
    }

    /// Country-keyed trade record for [`Etapa::Importacao`] or [`Etapa::Exportacao`].
    pub fn comercio_exterior(
        etapa: Etapa,
        categoria: &str,
        pais: &str,
        quantidade_kg: i64,
        valor_usd: i64,
        ano: i32,
    ) -> Self {
        Self {
            categoria_produto: Some(categoria.to_string()),
            pais: Some(pais.to_string()),
            quantidade_kg: Some(quantidade_kg),
            valor_usd: Some(valor_usd),
            ..Record::new(etapa, ano)
        }
    }
}
