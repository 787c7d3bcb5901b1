//! Scraper configuration: where the site lives and how requests identify themselves.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::errors::ScrapeError;

pub const DEFAULT_BASE_URL: &str = "http://vitibrasil.cnpuv.embrapa.br/index.php";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Embrapa-Data-Scraper/1.0 (+https://www.embrapa.br)";
pub const DEFAULT_DATABASE: &str = "embrapa.db";

/// Settings shared by every request of a run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ScrapeConfig {
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: user_agent.to_string(),
        })
    }
}

/// Where the record store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    /// Accept a plain file path or an SQLAlchemy-style `sqlite://` URL.
    ///
    /// `sqlite:///rel.db` is relative, `sqlite:////abs/x.db` absolute, and a
    /// bare `sqlite://` (or `:memory:`) is an in-memory database. Any other
    /// URL scheme is rejected.
    pub fn parse(database: &str) -> Result<Self, ScrapeError> {
        if database == ":memory:" {
            return Ok(DatabaseLocation::Memory);
        }
        match database.split_once("://") {
            None => Ok(DatabaseLocation::File(PathBuf::from(database))),
            Some(("sqlite", "")) => Ok(DatabaseLocation::Memory),
            Some(("sqlite", rest)) => match rest.strip_prefix('/') {
                Some(":memory:") => Ok(DatabaseLocation::Memory),
                Some(path) if !path.is_empty() => Ok(DatabaseLocation::File(PathBuf::from(path))),
                _ => Err(ScrapeError::UnsupportedDatabase(database.to_string())),
            },
            Some(_) => Err(ScrapeError::UnsupportedDatabase(database.to_string())),
        }
    }
}
