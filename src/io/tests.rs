//! Round-trip tests against the filesystem

use super::*;
use crate::error::QuantError;
use crate::quant::{Codebook, LatentShape};
use tempfile::TempDir;

#[test]
fn test_codebook_save_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codebook.json");
    let codebook = Codebook::from_weights(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 3, 2).unwrap();

    save_codebook(&codebook, &path).unwrap();
    let loaded = load_codebook(&path).unwrap();

    assert_eq!(loaded.n_embed(), 3);
    assert_eq!(loaded.embed_dim(), 2);
    assert_eq!(loaded.weight().data(), codebook.weight().data());
    assert!(loaded.weight().requires_grad());
}

#[test]
fn test_load_latents_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latents.json");
    let file = LatentFile::new(LatentShape::new(2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]);
    save_json(&file, &path).unwrap();

    let loaded = load_latents(&path).unwrap();
    assert_eq!(loaded, file);
}

#[test]
fn test_load_corrupt_codebook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codebook.json");
    std::fs::write(&path, r#"{"n_embed":2,"embed_dim":2,"weights":[1.0]}"#).unwrap();

    assert!(matches!(load_codebook(&path), Err(QuantError::CodebookShape { len: 1, .. })));
}

#[test]
fn test_load_missing_file() {
    let err = load_latents("/nonexistent/latents.json").unwrap_err();
    assert!(matches!(err, QuantError::Io { .. }));
}

#[test]
fn test_load_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latents.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(load_latents(&path), Err(QuantError::Json(_))));
}
