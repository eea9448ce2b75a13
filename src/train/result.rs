//! Codebook fitting result

use crate::quant::CodeUsage;
use serde::{Deserialize, Serialize};

/// Summary of a fitting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    /// Steps executed
    pub steps: usize,
    /// Loss before the first update
    pub initial_loss: f32,
    /// Loss of the last step
    pub final_loss: f32,
    /// Best loss observed
    pub best_loss: f32,
    /// Code assignment statistics of the last step
    pub usage: CodeUsage,
    /// Wall-clock time in seconds
    pub elapsed_secs: f64,
}

impl FitResult {
    /// Relative loss reduction, 0 when the initial loss is zero
    pub fn improvement(&self) -> f32 {
        if self.initial_loss.abs() < f32::EPSILON {
            0.0
        } else {
            (self.initial_loss - self.final_loss) / self.initial_loss
        }
    }
}
