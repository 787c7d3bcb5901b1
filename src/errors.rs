//! Error type for everything that can fail outside the per-unit recovery path.
//!
//! Fetch and extraction failures for a single (year, sub-dimension) unit never
//! surface here; they are folded into a skipped [`UnitOutcome`](crate::scrapers::UnitOutcome).

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid year range {inicio}..={fim}: years must lie within {min}..={max} and start <= end")]
    InvalidYearRange {
        inicio: i32,
        fim: i32,
        min: i32,
        max: i32,
    },
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
    #[error("unknown etapa '{0}'")]
    UnknownEtapa(String),
    #[error("unsupported database '{0}': expected a file path or a sqlite:// URL")]
    UnsupportedDatabase(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
