//! # VitiBrasil Scraper
//!
//! Collects the viticulture statistics Embrapa publishes on its VitiBrasil
//! report site and turns the HTML tables into flat, typed records.
//!
//! ## Features
//!
//! - Scrapes the five report stages (Produção, Processamento,
//!   Comercialização, Importação and Exportação) over a year range
//! - Stores records in SQLite without duplicates
//! - Lists records with per-stage filters and pagination
//! - Writes scraped records as dated JSON files
//!
//! ## Usage
//!
//! ```sh
//! vitibrasil_scraper scrape exportacao --ano-inicio 2022 --save -j ./json
//! vitibrasil_scraper populate
//! vitibrasil_scraper query producao --ano 2023 --from-store
//! vitibrasil_scraper summary
//! ```
//!
//! ## Architecture
//!
//! 1. **Planning**: expand a stage and year range into fetch units
//! 2. **Fetching**: request each unit's page, one at a time
//! 3. **Extraction**: classify the data table's rows into records
//! 4. **Output**: save to the store, write JSON, or print a listing

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod errors;
mod models;
mod outputs;
mod query;
mod scrapers;
mod store;
mod utils;

use cli::{Cli, Command, FilterArgs, RangeArgs};
use config::ScrapeConfig;
use models::{Etapa, YearRange};
use outputs::json;
use query::{ListQuery, ReadError};
use scrapers::scrape_etapa;
use scrapers::transport::HttpTransport;
use store::RecordStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("vitibrasil_scraper starting up");

    let args = Cli::parse();
    debug!(base_url = %args.base_url, database = %args.database, "Parsed CLI arguments");

    let config = ScrapeConfig::new(&args.base_url, args.timeout_secs, &args.user_agent)?;

    match args.command {
        Command::Scrape {
            etapa,
            range,
            save,
            json_output_dir,
        } => run_scrape(config, &args.database, etapa, range, save, json_output_dir.as_deref()).await?,
        Command::Populate => run_populate(config, &args.database).await?,
        Command::Query {
            etapa,
            range,
            filters,
            from_store,
        } => run_query(config, &args.database, etapa, range, filters, from_store).await?,
        Command::Summary => {
            let store = RecordStore::connect(&args.database)?;
            println!("{}", serde_json::to_string_pretty(&store.summary()?)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

async fn run_scrape(
    config: ScrapeConfig,
    database: &str,
    etapa: Etapa,
    range: RangeArgs,
    save: bool,
    json_output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let range = YearRange::resolve(etapa, range.ano_inicio, range.ano_fim)?;
    let transport = HttpTransport::new(config)?;

    let report = scrape_etapa(&transport, etapa, range).await;
    if report.extracted_units() == 0 {
        warn!(etapa = %report.etapa, skipped_units = report.skipped_units(), "No unit yielded data");
    }
    let records = report.into_records();

    if save {
        let mut store = RecordStore::connect(database)?;
        let saved = store.save(&records)?;
        info!(%etapa, inserted = saved.inserted, ignored = saved.ignored, "Saved records");
    }

    match json_output_dir {
        Some(dir) => {
            if let Err(e) = json::write_records(&records, etapa, dir).await {
                error!(error = %e, "Failed to write JSON");
                return Err(e);
            }
        }
        None if !save => println!("{}", serde_json::to_string_pretty(&records)?),
        None => {}
    }

    Ok(())
}

/// Fill an empty store with every stage over its default years.
async fn run_populate(config: ScrapeConfig, database: &str) -> Result<(), Box<dyn Error>> {
    let mut store = RecordStore::connect(database)?;
    if !store.is_empty()? {
        warn!(database, "Database already holds records; skipping population");
        return Ok(());
    }

    let transport = HttpTransport::new(config)?;
    for etapa in Etapa::ALL {
        let report = scrape_etapa(&transport, etapa, etapa.default_range()).await;
        let saved = store.save(&report.into_records())?;
        info!(%etapa, inserted = saved.inserted, ignored = saved.ignored, "Populated stage");
    }

    let summary = store.summary()?;
    info!(total = summary.total, anos = summary.anos.len(), "Population complete");
    Ok(())
}

async fn run_query(
    config: ScrapeConfig,
    database: &str,
    etapa: Etapa,
    range: RangeArgs,
    filters: FilterArgs,
    from_store: bool,
) -> Result<(), Box<dyn Error>> {
    let range = YearRange::resolve(etapa, range.ano_inicio, range.ano_fim)?;
    let list_query = ListQuery::from(filters);

    let records = if from_store {
        let store = RecordStore::connect(database).map_err(ReadError::from)?;
        query::from_store(&store, etapa, range, &list_query)?
    } else {
        let transport = HttpTransport::new(config).map_err(ReadError::from)?;
        let report = scrape_etapa(&transport, etapa, range).await;
        list_query.apply(etapa, report.into_records())
    };

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
