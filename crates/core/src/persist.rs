//! JSON persistence of extraction results.
//!
//! Results are stored as `data_<seed>.json` next to each other in a data
//! directory, so a caller can find the record for an upload by its seed.

use crate::error::Result;
use crate::types::ExtractionResult;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// File name of the persisted record for a seed.
pub fn data_file_name(seed: u64) -> String {
    format!("data_{}.json", seed)
}

/// Serialize a result as pretty-printed JSON.
pub fn to_json(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write `data_<seed>.json` into `data_dir`, creating the directory if
/// needed. Returns the written path.
pub fn write_result(data_dir: &Path, seed: u64, result: &ExtractionResult) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let path = data_dir.join(data_file_name(seed));
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, result)?;

    log::debug!("Wrote extraction result to {}", path.display());

    Ok(path)
}
