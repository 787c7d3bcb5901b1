//! JSON output of scraped records.
//!
//! # Output Structure
//!
//! Files are organized by scrape date with one file per stage:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── producao.json
//!     └── processamento.json
//! ```
//!
//! A second scrape of the same stage on the same day overwrites the file.

use crate::models::{Etapa, Record};
use crate::utils::ensure_writable_dir;
use chrono::Local;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `records` as a JSON array to `{json_output_dir}/{date}/{etapa}.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, %etapa))]
pub async fn write_records(
    records: &[Record],
    etapa: Etapa,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        Local::now().date_naive()
    );

    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = ensure_writable_dir(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e);
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, etapa.slug());
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, count = records.len(), "Wrote JSON records file");

    Ok(output_json_filename)
}
