use std::time::Duration;

use tracing::{debug, warn};

use velo_payload::{PayloadPattern, PayloadStore};

use crate::session::{SessionState, StreamSession, StreamSummary};
use crate::sink::ByteSink;
use crate::writer::{DEFAULT_CHUNK_SIZE, StepOutcome, drain_payload};

/// One burst in the warmup sequence: payload size, then a pause before the
/// next phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarmupPhase {
    pub size_mb: f64,
    pub delay_ms: u64,
}

/// The fixed warmup schedule: growing bursts with growing pauses, priming
/// OS and network buffers before a real measurement.
pub const WARMUP_PHASES: [WarmupPhase; 4] = [
    WarmupPhase { size_mb: 0.1, delay_ms: 100 },
    WarmupPhase { size_mb: 0.5, delay_ms: 150 },
    WarmupPhase { size_mb: 1.0, delay_ms: 200 },
    WarmupPhase { size_mb: 2.0, delay_ms: 250 },
];

/// Emit the fixed phase sequence: write each payload fully (draining
/// backpressure before the pause), wait the phase delay, move on. The
/// session completes after the last phase's delay; cancellation is honored
/// at every send and every pause.
pub async fn run_warmup<S: ByteSink>(
    mut session: StreamSession,
    store: &PayloadStore,
    sink: &mut S,
) -> StreamSummary {
    let cancel = session.cancel_token();
    for (i, phase) in WARMUP_PHASES.iter().enumerate() {
        debug!(phase = i, size_mb = phase.size_mb, "warmup phase");
        let payload = store.get(phase.size_mb, PayloadPattern::Random);
        match drain_payload(&mut session, &payload, DEFAULT_CHUNK_SIZE, sink).await {
            StepOutcome::Delivered => {}
            StepOutcome::Cancelled => {
                session.finish(SessionState::Cancelled);
                return session.summary();
            }
            StepOutcome::Failed => {
                session.finish(SessionState::Failed);
                return session.summary();
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.finish(SessionState::Cancelled);
                return session.summary();
            }
            _ = tokio::time::sleep(Duration::from_millis(phase.delay_ms)) => {}
        }
    }

    match sink.shutdown().await {
        Ok(()) => {
            session.finish(SessionState::Completed);
        }
        Err(e) => {
            warn!(error = %e, "sink close failed after warmup");
            session.finish(SessionState::Failed);
        }
    }
    session.summary()
}
