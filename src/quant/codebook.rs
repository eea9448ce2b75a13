//! Learned codebook (embedding table) shared by all quantizers

use super::base::normalize_rows;
use crate::autograd::Tensor;
use crate::error::{QuantError, Result, ValidationError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// `n_embed x embed_dim` table of code vectors
#[derive(Clone, Debug)]
pub struct Codebook {
    weight: Tensor,
    n_embed: usize,
    embed_dim: usize,
}

impl Codebook {
    /// Draw every entry from U(-1/n_embed, 1/n_embed)
    pub fn uniform<R: Rng + ?Sized>(n_embed: usize, embed_dim: usize, rng: &mut R) -> Result<Self> {
        check_dims(n_embed, embed_dim)?;
        let bound = 1.0 / n_embed as f32;
        let weights: Vec<f32> =
            (0..n_embed * embed_dim).map(|_| rng.random_range(-bound..=bound)).collect();
        Self::from_weights(weights, n_embed, embed_dim)
    }

    /// Build from explicit row-major weights
    pub fn from_weights(weights: Vec<f32>, n_embed: usize, embed_dim: usize) -> Result<Self> {
        check_dims(n_embed, embed_dim)?;
        if weights.len() != n_embed * embed_dim {
            return Err(QuantError::CodebookShape { len: weights.len(), n_embed, embed_dim });
        }
        Ok(Self {
            weight: Tensor::from_vec(weights, true),
            n_embed,
            embed_dim,
        })
    }

    pub fn n_embed(&self) -> usize {
        self.n_embed
    }

    pub fn embed_dim(&self) -> usize {
        self.embed_dim
    }

    /// Trainable weight tensor (leaf)
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Tensor {
        &mut self.weight
    }

    /// Table as a graph node, L2-normalized per row when `use_norm`
    pub fn normalized(&self, use_norm: bool) -> Tensor {
        normalize_rows(&self.weight, self.n_embed, self.embed_dim, use_norm)
    }

    /// Raw rows for `indices`, concatenated
    pub fn entries(&self, indices: &[usize]) -> Result<Vec<f32>> {
        let table = self.weight.data();
        let mut out = Vec::with_capacity(indices.len() * self.embed_dim);
        for &index in indices {
            self.check_index(index)?;
            let start = index * self.embed_dim;
            out.extend(table.iter().skip(start).take(self.embed_dim));
        }
        Ok(out)
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.n_embed {
            return Err(QuantError::IndexOutOfRange { index, n_embed: self.n_embed });
        }
        Ok(())
    }

    pub fn snapshot(&self) -> CodebookSnapshot {
        CodebookSnapshot {
            n_embed: self.n_embed,
            embed_dim: self.embed_dim,
            weights: self.weight.data().to_vec(),
        }
    }

    pub fn from_snapshot(snapshot: CodebookSnapshot) -> Result<Self> {
        Self::from_weights(snapshot.weights, snapshot.n_embed, snapshot.embed_dim)
    }
}

/// An empty table cannot serve any lookup
fn check_dims(n_embed: usize, embed_dim: usize) -> Result<()> {
    if n_embed == 0 {
        return Err(ValidationError::InvalidCodebookSize(n_embed).into());
    }
    if embed_dim == 0 {
        return Err(ValidationError::InvalidEmbedDim(embed_dim).into());
    }
    Ok(())
}

/// Serializable codebook state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebookSnapshot {
    pub n_embed: usize,
    pub embed_dim: usize,
    pub weights: Vec<f32>,
}
