use bytes::Bytes;
use tracing::{debug, warn};

use crate::session::{SessionState, StreamSession, StreamSummary};
use crate::sink::ByteSink;

/// Default chunk size for fixed-size downloads.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// What a single drain pass observed. `Delivered` means the whole payload
/// went out; the other two stop the session without a terminal transition
/// so the caller decides how to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    Delivered,
    Cancelled,
    Failed,
}

/// Write `payload` to the sink in bounded chunks, suspending on
/// backpressure and stopping at cancellation or sink error. The cursor
/// only ever advances, so chunks are emitted in strictly increasing offset
/// order with no gaps or overlaps.
pub(crate) async fn drain_payload<S: ByteSink>(
    session: &mut StreamSession,
    payload: &Bytes,
    chunk_size: usize,
    sink: &mut S,
) -> StepOutcome {
    let chunk_size = chunk_size.max(1);
    let cancel = session.cancel_token();
    let mut cursor = 0;
    while cursor < payload.len() {
        let end = (cursor + chunk_size).min(payload.len());
        let chunk = payload.slice(cursor..end);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return StepOutcome::Cancelled,
            res = sink.send(chunk) => match res {
                Ok(()) => {
                    session.record_sent(end - cursor);
                    cursor = end;
                }
                Err(e) => {
                    warn!(error = %e, offset = cursor, "sink write failed mid-stream");
                    return StepOutcome::Failed;
                }
            },
        }
    }
    StepOutcome::Delivered
}

/// Deliver a fully materialized payload as a fixed-size download.
///
/// Exactly one termination path executes: normal completion (sink closed
/// cleanly), cancellation, or failure. Errors past the first byte are
/// logged, never propagated: a streaming response cannot change its
/// status once bytes have flowed.
pub async fn write_chunked<S: ByteSink>(
    mut session: StreamSession,
    payload: Bytes,
    chunk_size: usize,
    sink: &mut S,
) -> StreamSummary {
    debug!(len = payload.len(), chunk_size, "starting fixed-size stream");
    match drain_payload(&mut session, &payload, chunk_size, sink).await {
        StepOutcome::Delivered => match sink.shutdown().await {
            Ok(()) => {
                session.finish(SessionState::Completed);
            }
            Err(e) => {
                warn!(error = %e, "sink close failed after final chunk");
                session.finish(SessionState::Failed);
            }
        },
        StepOutcome::Cancelled => {
            session.finish(SessionState::Cancelled);
        }
        StepOutcome::Failed => {
            session.finish(SessionState::Failed);
        }
    }
    session.summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::CollectSink;
    use crate::{ChannelSink, SessionState};
    use velo_payload::{PayloadPattern, generate, size_mb_to_bytes};

    #[tokio::test]
    async fn chunks_cover_payload_exactly_once() {
        let payload = generate(200_000, PayloadPattern::Incompressible);
        let mut sink = CollectSink::default();
        let summary =
            write_chunked(StreamSession::new(), payload.clone(), DEFAULT_CHUNK_SIZE, &mut sink)
                .await;

        assert_eq!(summary.state, SessionState::Completed);
        assert_eq!(summary.bytes_sent, 200_000);
        assert!(sink.closed);

        // Strictly increasing offsets, no gaps, no overlaps: concatenation
        // reproduces the payload byte for byte.
        let total: usize = sink.chunks.iter().map(Bytes::len).sum();
        assert_eq!(total, payload.len());
        assert!(sink.chunks.iter().all(|c| c.len() <= DEFAULT_CHUNK_SIZE));
        let mut rebuilt = Vec::with_capacity(total);
        for chunk in &sink.chunks {
            rebuilt.extend_from_slice(chunk);
        }
        assert_eq!(rebuilt, payload);
    }

    #[tokio::test]
    async fn compressible_download_is_exact_and_uniform() {
        let payload = generate(size_mb_to_bytes(0.1), PayloadPattern::Compressible);
        let mut sink = CollectSink::default();
        let summary =
            write_chunked(StreamSession::new(), payload, DEFAULT_CHUNK_SIZE, &mut sink).await;

        assert_eq!(summary.bytes_sent, 104_857);
        assert!(sink.chunks.iter().flatten().all(|&b| b == 0x41));
    }

    #[tokio::test]
    async fn sink_error_fails_session_once() {
        let payload = generate(300_000, PayloadPattern::Compressible);
        let mut sink = CollectSink::failing_after(2);
        let summary =
            write_chunked(StreamSession::new(), payload, DEFAULT_CHUNK_SIZE, &mut sink).await;

        assert_eq!(summary.state, SessionState::Failed);
        assert_eq!(sink.chunks.len(), 2);
        assert!(!sink.closed);
        assert_eq!(summary.bytes_sent, 2 * DEFAULT_CHUNK_SIZE as u64);
    }

    #[tokio::test]
    async fn cancellation_mid_stream_stops_writes() {
        // Channel capacity of one: the writer blocks on backpressure after
        // the second chunk is queued, which is where cancellation lands.
        let payload = generate(10 * DEFAULT_CHUNK_SIZE, PayloadPattern::Compressible);
        let (mut sink, mut rx) = ChannelSink::new(1);
        let session = StreamSession::new();
        let token = session.cancel_token();

        let writer = tokio::spawn(async move {
            write_chunked(session, payload, DEFAULT_CHUNK_SIZE, &mut sink).await
        });

        // Drain half the chunks, then hang up.
        for _ in 0..5 {
            rx.recv().await.unwrap();
        }
        token.cancel();

        let summary = writer.await.unwrap();
        assert_eq!(summary.state, SessionState::Cancelled);
        assert!(summary.bytes_sent < 10 * DEFAULT_CHUNK_SIZE as u64);
    }

    #[tokio::test]
    async fn receiver_drop_fails_instead_of_hanging() {
        let payload = generate(4 * DEFAULT_CHUNK_SIZE, PayloadPattern::Compressible);
        let (mut sink, rx) = ChannelSink::new(1);
        drop(rx);
        let summary =
            write_chunked(StreamSession::new(), payload, DEFAULT_CHUNK_SIZE, &mut sink).await;
        assert_eq!(summary.state, SessionState::Failed);
        assert_eq!(summary.bytes_sent, 0);
    }

    #[tokio::test]
    async fn empty_payload_completes_immediately() {
        let mut sink = CollectSink::default();
        let summary =
            write_chunked(StreamSession::new(), Bytes::new(), DEFAULT_CHUNK_SIZE, &mut sink).await;
        assert_eq!(summary.state, SessionState::Completed);
        assert_eq!(summary.bytes_sent, 0);
        assert!(sink.chunks.is_empty());
        assert!(sink.closed);
    }
}
