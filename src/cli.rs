//! Command-line interface definitions for the VitiBrasil scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via command-line flags or environment
//! variables.

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_DATABASE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::models::Etapa;
use crate::query::{DEFAULT_LIMIT, DEFAULT_OFFSET, ListQuery};

/// Command-line arguments for the VitiBrasil scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape processing data for 2022 and store it
/// vitibrasil_scraper scrape processamento --ano-inicio 2022 --ano-fim 2022 --save
///
/// # Fill an empty database with every stage
/// vitibrasil_scraper --database ./data/embrapa.db populate
///
/// # List stored exports to Paraguay, 20 at a time
/// vitibrasil_scraper query exportacao --pais Paraguai --limit 20 --from-store
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Report site endpoint
    #[arg(long, env = "VITIBRASIL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "VITIBRASIL_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// User-Agent sent with every request
    #[arg(long, env = "VITIBRASIL_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// SQLite database file or `sqlite://` URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE)]
    pub database: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape one stage over a year range
    Scrape {
        #[arg(value_enum)]
        etapa: Etapa,

        #[command(flatten)]
        range: RangeArgs,

        /// Save the scraped records to the database
        #[arg(long)]
        save: bool,

        /// Write the scraped records as JSON under this directory
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },
    /// Scrape every stage into the database if it is empty
    Populate,
    /// List records of one stage as a JSON array
    Query {
        #[arg(value_enum)]
        etapa: Etapa,

        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Read from the database instead of scraping the site
        #[arg(long)]
        from_store: bool,
    },
    /// Print database statistics as JSON
    Summary,
}

/// Year bounds; the stage's default range fills in whichever is missing.
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    #[arg(long)]
    pub ano_inicio: Option<i32>,

    #[arg(long)]
    pub ano_fim: Option<i32>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub ano: Option<i32>,

    #[arg(long)]
    pub categoria_produto: Option<String>,

    #[arg(long)]
    pub tipo_produto: Option<String>,

    #[arg(long)]
    pub categoria_uva: Option<String>,

    #[arg(long)]
    pub tipo_uva: Option<String>,

    #[arg(long)]
    pub pais: Option<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = DEFAULT_OFFSET)]
    pub offset: usize,
}

impl From<FilterArgs> for ListQuery {
    fn from(args: FilterArgs) -> Self {
        ListQuery {
            ano: args.ano,
            categoria_produto: args.categoria_produto,
            tipo_produto: args.tipo_produto,
            categoria_uva: args.categoria_uva,
            tipo_uva: args.tipo_uva,
            pais: args.pais,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["vitibrasil_scraper", "summary"]);
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.timeout_secs, 10);
        assert!(matches!(cli.command, Command::Summary));
    }

    #[test]
    fn test_scrape_parsing() {
        let cli = Cli::parse_from([
            "vitibrasil_scraper",
            "--database",
            "/tmp/x.db",
            "scrape",
            "importacao",
            "--ano-inicio",
            "2021",
            "--save",
            "-j",
            "./json",
        ]);
        assert_eq!(cli.database, "/tmp/x.db");
        match cli.command {
            Command::Scrape {
                etapa,
                range,
                save,
                json_output_dir,
            } => {
                assert_eq!(etapa, Etapa::Importacao);
                assert_eq!(range.ano_inicio, Some(2021));
                assert_eq!(range.ano_fim, None);
                assert!(save);
                assert_eq!(json_output_dir.as_deref(), Some("./json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_query_parsing_into_list_query() {
        let cli = Cli::parse_from([
            "vitibrasil_scraper",
            "query",
            "processamento",
            "--categoria-uva",
            "Viníferas",
            "--limit",
            "5",
            "--from-store",
        ]);
        match cli.command {
            Command::Query {
                etapa,
                filters,
                from_store,
                ..
            } => {
                assert_eq!(etapa, Etapa::Processamento);
                assert!(from_store);
                let query = ListQuery::from(filters);
                assert_eq!(query.categoria_uva.as_deref(), Some("Viníferas"));
                assert_eq!((query.limit, query.offset), (5, 0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_etapa_rejected() {
        assert!(Cli::try_parse_from(["vitibrasil_scraper", "scrape", "vinificacao"]).is_err());
    }
}
