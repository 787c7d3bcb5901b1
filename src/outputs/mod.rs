//! Output generation for scraped records.
//!
//! # Submodules
//!
//! - [`json`]: Writes a stage's records to a dated JSON file

pub mod json;
