use bytes::Bytes;
use tracing::debug;

use velo_core::{Clock, LatencyReport, run_probe};
use velo_payload::PayloadStore;
use velo_stream::{ByteSink, StreamSession, StreamSummary, run_adaptive, run_warmup, write_chunked};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::params::{AdaptiveParams, DownloadParams, ProbeParams, UploadMeta};
use crate::response::{DownloadStarted, UploadReport};
use crate::upload;

/// A validated fixed-size download, ready to stream.
///
/// Split from the streaming itself so the transport can send
/// [`DownloadStarted`] metadata (headers, leading JSON) before the first
/// payload chunk goes out.
#[derive(Debug)]
pub struct PreparedDownload {
    pub meta: DownloadStarted,
    payload: Bytes,
    chunk_size: usize,
}

impl PreparedDownload {
    /// Drive the transfer to one of its terminal states. The caller holds a
    /// cancel-token clone from `session` and trips it on client disconnect.
    pub async fn stream<S: ByteSink>(self, session: StreamSession, sink: &mut S) -> StreamSummary {
        write_chunked(session, self.payload, self.chunk_size, sink).await
    }
}

/// Validate a fixed-size download request and materialize its payload.
/// Rejections happen here, before any response byte exists.
pub fn prepare_download(
    config: &ServerConfig,
    store: &PayloadStore,
    clock: &Clock,
    params: &DownloadParams,
) -> Result<PreparedDownload, ApiError> {
    params.validate(config)?;
    let payload = store.get(params.size_mb, params.pattern);
    debug!(
        size_mb = params.size_mb,
        bytes = payload.len(),
        pattern = params.pattern.as_str(),
        "download prepared"
    );
    Ok(PreparedDownload {
        meta: DownloadStarted {
            size_bytes: payload.len() as u64,
            size_mb: params.size_mb,
            pattern: params.pattern.as_str(),
            connections: params.connections,
            started_at: clock.wall_ms(),
        },
        payload,
        chunk_size: config.chunk_size,
    })
}

/// Run a duration-bound adaptive download to completion (or cancellation).
pub async fn handle_adaptive<S: ByteSink>(
    store: &PayloadStore,
    params: AdaptiveParams,
    session: StreamSession,
    sink: &mut S,
) -> StreamSummary {
    run_adaptive(session, &params.to_spec(), store, sink).await
}

/// Stream the fixed warmup burst sequence.
pub async fn handle_warmup<S: ByteSink>(
    store: &PayloadStore,
    session: StreamSession,
    sink: &mut S,
) -> StreamSummary {
    run_warmup(session, store, sink).await
}

/// Account for a fully received upload body.
pub fn handle_upload(
    config: &ServerConfig,
    clock: &Clock,
    meta: &UploadMeta,
    body: &[u8],
    receive_started_ms: f64,
) -> Result<UploadReport, ApiError> {
    upload::account_upload(config, clock, meta, body, receive_started_ms)
}

/// Run a latency probe and return the ordered samples plus statistics.
pub async fn handle_latency(clock: &Clock, params: ProbeParams) -> LatencyReport {
    run_probe(clock, &params.to_spec()).await
}
