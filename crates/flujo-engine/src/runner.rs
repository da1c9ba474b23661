//! Fixed-rate tick loop and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, RunStats};

/// Cooperative cancellation flag shared between the run loop and its callers.
///
/// Clones observe the same flag. Cancellation is checked between ticks, so
/// the tick in flight always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests loop exit.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Drives a pipeline at a fixed tick rate.
///
/// The runner measures each tick and sleeps away the remainder of the
/// period. Overruns are logged and never compensated: a slow tick delays
/// the next one instead of triggering catch-up ticks.
pub struct TickRunner {
    period: Duration,
    max_ticks: Option<u64>,
}

impl TickRunner {
    /// A runner targeting `rate_hz` ticks per second.
    ///
    /// Non-positive and non-finite rates disable pacing; ticks then run back
    /// to back.
    pub fn new(rate_hz: f64) -> Self {
        let period = if rate_hz.is_finite() && rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / rate_hz)
        } else {
            Duration::ZERO
        };
        Self {
            period,
            max_ticks: None,
        }
    }

    /// Bounds the total number of ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// The tick period this runner enforces.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks the pipeline until cancelled or the tick bound is reached.
    ///
    /// Returns the pipeline's aggregate statistics at loop exit. A tick-level
    /// state error aborts the loop; per-node failures do not.
    pub fn run(
        &self,
        pipeline: &mut Pipeline,
        cancel: &CancelToken,
    ) -> Result<RunStats, PipelineError> {
        let mut completed: u64 = 0;
        while !self.finished(completed, cancel) {
            let outcome = pipeline.tick()?;
            completed += 1;

            if !self.period.is_zero() && outcome.elapsed > self.period {
                warn!(
                    "tick overrun: {:?} against a {:?} period",
                    outcome.elapsed, self.period
                );
            }
            if self.finished(completed, cancel) {
                break;
            }
            if let Some(remaining) = self.period.checked_sub(outcome.elapsed) {
                thread::sleep(remaining);
            }
        }
        debug!("run loop exit after {completed} ticks");
        Ok(pipeline.stats())
    }

    fn finished(&self, completed: u64, cancel: &CancelToken) -> bool {
        cancel.is_cancelled() || self.max_ticks.is_some_and(|max| completed >= max)
    }
}
