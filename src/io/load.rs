//! Loading latents and codebooks

use super::records::LatentFile;
use crate::error::{QuantError, Result};
use crate::quant::{Codebook, CodebookSnapshot};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read and deserialize a JSON file
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|source| QuantError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a latent batch
pub fn load_latents(path: impl AsRef<Path>) -> Result<LatentFile> {
    load_json(path)
}

/// Load a codebook snapshot
pub fn load_codebook(path: impl AsRef<Path>) -> Result<Codebook> {
    let snapshot: CodebookSnapshot = load_json(path)?;
    Codebook::from_snapshot(snapshot)
}
