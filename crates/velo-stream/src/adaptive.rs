use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use velo_payload::{PayloadPattern, PayloadStore};

use crate::session::{SessionState, StreamSession, StreamSummary};
use crate::sink::ByteSink;
use crate::writer::StepOutcome;

const INITIAL_FLOOR_MB: f64 = 0.1;
const MAX_CEIL_MB: f64 = 10.0;
const DURATION_MIN_SECS: f64 = 1.0;
const DURATION_MAX_SECS: f64 = 10.0;
const THROTTLE_FLOOR: f64 = 0.1;

/// Fraction of the ramped target size emitted per tick.
const CHUNK_FRACTION: f64 = 0.03;
/// Smallest chunk ever emitted (50 KB).
const CHUNK_FLOOR_MB: f64 = 0.05;
/// Chunk sizes snap up to this grid so the payload cache sees a small,
/// fixed set of keys instead of one per tick.
const CHUNK_GRID_MB: f64 = 0.05;

const DELAY_BASE_MS: f64 = 100.0;
const DELAY_CAP_MS: f64 = 300.0;

/// Clamped parameters for a duration-bound adaptive transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSpec {
    pub initial_mb: f64,
    pub max_mb: f64,
    pub duration_secs: f64,
    pub pattern: PayloadPattern,
    pub throttle: f64,
}

impl AdaptiveSpec {
    /// Build a spec, correcting out-of-range inputs instead of rejecting
    /// them: `initial` floors at 0.1 MB, `max` ceils at 10 MB, duration is
    /// clamped to [1, 10] seconds and throttle floors at 0.1.
    pub fn clamped(
        initial_mb: f64,
        max_mb: f64,
        duration_secs: f64,
        pattern: PayloadPattern,
        throttle: f64,
    ) -> Self {
        let initial_mb = initial_mb.max(INITIAL_FLOOR_MB);
        Self {
            initial_mb,
            max_mb: max_mb.min(MAX_CEIL_MB).max(initial_mb),
            duration_secs: duration_secs.clamp(DURATION_MIN_SECS, DURATION_MAX_SECS),
            pattern,
            throttle: throttle.max(THROTTLE_FLOOR),
        }
    }

    /// Target payload size at `progress` (elapsed/duration): linear ramp
    /// from `initial` to `max`, reaching `max` at the halfway point and
    /// holding there.
    fn target_mb(&self, progress: f64) -> f64 {
        self.initial_mb + (self.max_mb - self.initial_mb) * (progress * 2.0).min(1.0)
    }

    /// Per-tick chunk size: a small throttle-scaled fraction of the ramped
    /// target, floored at 50 KB and snapped up to the cache grid.
    fn chunk_mb(&self, progress: f64) -> f64 {
        let raw = (self.target_mb(progress) * CHUNK_FRACTION * self.throttle).max(CHUNK_FLOOR_MB);
        (raw / CHUNK_GRID_MB).ceil() * CHUNK_GRID_MB
    }

    /// Pause before the next tick: grows with elapsed time, shrinks with
    /// higher throttle, capped at 300ms.
    fn tick_delay(&self, elapsed_secs: f64) -> Duration {
        let delay_ms = (DELAY_BASE_MS + elapsed_secs * 1000.0 * 10.0 / self.throttle).min(DELAY_CAP_MS);
        Duration::from_secs_f64(delay_ms / 1000.0)
    }
}

/// Drive a duration-bound transfer: chunk size ramps over time, pacing is
/// throttle-controlled, and the transfer ends when the duration elapses;
/// there is no byte target. Models a slow-start-like curve for exercising
/// client-side adaptive logic without real congestion control.
pub async fn run_adaptive<S: ByteSink>(
    mut session: StreamSession,
    spec: &AdaptiveSpec,
    store: &PayloadStore,
    sink: &mut S,
) -> StreamSummary {
    debug!(?spec, "starting adaptive stream");
    let cancel = session.cancel_token();
    let start = Instant::now();
    loop {
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed >= spec.duration_secs {
            match sink.shutdown().await {
                Ok(()) => {
                    session.finish(SessionState::Completed);
                }
                Err(e) => {
                    warn!(error = %e, "sink close failed at end of adaptive stream");
                    session.finish(SessionState::Failed);
                }
            }
            break;
        }

        let progress = elapsed / spec.duration_secs;
        let chunk = store.get(spec.chunk_mb(progress), spec.pattern);
        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => StepOutcome::Cancelled,
            res = sink.send(chunk.clone()) => match res {
                Ok(()) => {
                    session.record_sent(chunk.len());
                    StepOutcome::Delivered
                }
                Err(e) => {
                    warn!(error = %e, "sink write failed during adaptive stream");
                    StepOutcome::Failed
                }
            },
        };
        match step {
            StepOutcome::Delivered => {}
            StepOutcome::Cancelled => {
                session.finish(SessionState::Cancelled);
                break;
            }
            StepOutcome::Failed => {
                session.finish(SessionState::Failed);
                break;
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.finish(SessionState::Cancelled);
                break;
            }
            _ = tokio::time::sleep(spec.tick_delay(elapsed)) => {}
        }
    }
    session.summary()
}
