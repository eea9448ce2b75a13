//! Saving codebooks and encoding results

use crate::error::{QuantError, Result};
use crate::quant::Codebook;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize `value` as pretty JSON to `path`
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).map_err(|source| QuantError::Io { path: path.to_path_buf(), source })
}

/// Save a codebook snapshot
pub fn save_codebook(codebook: &Codebook, path: impl AsRef<Path>) -> Result<()> {
    save_json(&codebook.snapshot(), path)
}
