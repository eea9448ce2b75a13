//! Quantizer trace module
//!
//! Collects per-step wall-clock timings of the quantization pipeline
//! (normalization, distance computation, codebook lookup, Gumbel sampling,
//! loss and backward). Disabled by default.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The lifecycle steps of a quantization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceStep {
    /// Whole quantizer forward pass
    Forward,
    /// Backward pass (gradient computation)
    Backward,
    /// Matrix multiplication kernel
    Matmul,
    /// Row-wise L2 normalization
    Normalize,
    /// Latent-to-codebook distance matrix
    Distance,
    /// Codebook row gather
    Lookup,
    /// Gumbel noise sampling and relaxation
    Gumbel,
    /// Loss computation
    Loss,
}

impl TraceStep {
    /// Forward wraps every other step, so it is reported but not summed
    fn is_enclosing(self) -> bool {
        self == TraceStep::Forward
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single timing measurement.
#[derive(Debug, Clone)]
pub struct TraceMeasurement {
    pub step: TraceStep,
    pub duration: Duration,
    pub metadata: String,
}

/// Aggregated timings of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    pub step: TraceStep,
    pub count: usize,
    pub total: Duration,
    /// Share of the summed inner-step time, in percent
    pub share: f64,
}

#[derive(Default)]
struct TraceState {
    measurements: Vec<TraceMeasurement>,
    open: HashMap<TraceStep, Instant>,
}

/// Thread-safe tracer for collecting timing measurements.
pub struct Tracer {
    enabled: AtomicBool,
    state: Mutex<TraceState>,
}

impl Tracer {
    /// Create a new (disabled) tracer.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            state: Mutex::new(TraceState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TraceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Open a span for `step`.
    pub fn start(&self, step: TraceStep) {
        if self.is_enabled() {
            self.state().open.insert(step, Instant::now());
        }
    }

    /// Close the open span for `step` and record it.
    pub fn end(&self, step: TraceStep, metadata: impl Into<String>) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state();
        if let Some(started) = state.open.remove(&step) {
            state.measurements.push(TraceMeasurement {
                step,
                duration: started.elapsed(),
                metadata: metadata.into(),
            });
        }
    }

    /// Run a closure within a measured span.
    #[inline]
    pub fn span<F, R>(&self, step: TraceStep, metadata: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.is_enabled() {
            return f();
        }
        let started = Instant::now();
        let result = f();
        self.record(step, started.elapsed(), metadata);
        result
    }

    pub(crate) fn record(&self, step: TraceStep, duration: Duration, metadata: impl Into<String>) {
        self.state().measurements.push(TraceMeasurement { step, duration, metadata: metadata.into() });
    }

    /// Number of recorded measurements for a step.
    pub fn count(&self, step: TraceStep) -> usize {
        self.state().measurements.iter().filter(|m| m.step == step).count()
    }

    /// Drop all measurements and open spans.
    pub fn clear(&self) {
        let mut state = self.state();
        state.measurements.clear();
        state.open.clear();
    }

    /// Per-step totals, slowest first.
    pub fn summary(&self) -> Vec<StepSummary> {
        let state = self.state();
        let mut by_step: HashMap<TraceStep, (usize, Duration)> = HashMap::new();
        for m in &state.measurements {
            let entry = by_step.entry(m.step).or_default();
            entry.0 += 1;
            entry.1 += m.duration;
        }

        let inner: Duration = by_step
            .iter()
            .filter(|(step, _)| !step.is_enclosing())
            .map(|(_, (_, total))| *total)
            .sum();

        let mut rows: Vec<StepSummary> = by_step
            .into_iter()
            .map(|(step, (count, total))| {
                let share = if step.is_enclosing() || inner.is_zero() {
                    0.0
                } else {
                    total.as_secs_f64() / inner.as_secs_f64() * 100.0
                };
                StepSummary { step, count, total, share }
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows
    }

    /// Render the per-step timing table.
    pub fn report(&self) -> String {
        let rows = self.summary();
        if rows.is_empty() {
            return "No measurements recorded. Enable tracing with TRACER.enable()".to_string();
        }

        let inner: Duration =
            rows.iter().filter(|r| !r.step.is_enclosing()).map(|r| r.total).sum();
        let rule = "-".repeat(56);

        let mut out = String::from("\nQUANTIZER TRACE REPORT\n");
        out.push_str(&format!("Total Measured Time: {inner:.2?}\n{rule}\n"));
        out.push_str(&format!("{:<12} {:>7} {:>14} {:>9}\n{rule}\n", "Step", "Count", "Duration", "Share"));
        for row in &rows {
            let duration = format!("{:.2?}", row.total);
            out.push_str(&format!(
                "{:<12} {:>7} {:>14} {:>8.2}%\n",
                row.step.to_string(),
                row.count,
                duration,
                row.share
            ));
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Global tracer instance.
pub static TRACER: LazyLock<Tracer> = LazyLock::new(Tracer::new);
