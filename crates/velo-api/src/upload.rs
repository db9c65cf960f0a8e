use md5::{Digest, Md5};
use tracing::debug;

use velo_core::Clock;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::params::UploadMeta;
use crate::response::UploadReport;

/// Short integrity echo: first 8 hex chars of the body's MD5.
fn short_digest(body: &[u8]) -> String {
    let digest = Md5::digest(body);
    let mut hex = hex::encode(digest);
    hex.truncate(8);
    hex
}

/// Account for a fully received upload body.
///
/// `receive_started_ms` is the server clock reading taken when the request
/// began arriving; the difference to "now" is the measured transfer time.
/// Validation happens here, before any response is shaped, so bad uploads
/// produce a clean 4xx with no partial output.
pub fn account_upload(
    config: &ServerConfig,
    clock: &Clock,
    meta: &UploadMeta,
    body: &[u8],
    receive_started_ms: f64,
) -> Result<UploadReport, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation("no upload data received".to_string()));
    }
    if body.len() as u64 > config.max_upload_bytes {
        return Err(ApiError::Validation(format!(
            "upload exceeds maximum size of {} bytes",
            config.max_upload_bytes
        )));
    }

    let elapsed_seconds = ((clock.now_ms() - receive_started_ms) / 1000.0).max(0.0);
    let client_elapsed_seconds = meta
        .client_start_ms
        .map(|start| ((clock.wall_ms() - start) / 1000.0).max(0.0));
    let mbps = throughput_mbps(body.len() as u64, elapsed_seconds);

    // Multi-connection uploads skip the digest: each connection carries an
    // arbitrary slice, so a per-body hash tells the client nothing.
    let digest = match meta.connection_id {
        None => Some(short_digest(body)),
        Some(_) => None,
    };

    debug!(
        bytes = body.len(),
        elapsed_seconds,
        mbps,
        connection = ?meta.connection_id,
        "upload accounted"
    );

    Ok(UploadReport {
        received_bytes: body.len() as u64,
        pattern: meta.pattern.as_str(),
        declared_size_mb: meta.declared_size_mb,
        elapsed_seconds,
        client_elapsed_seconds,
        mbps,
        digest,
        connection_id: meta.connection_id,
        total_connections: meta.total_connections,
    })
}

/// Mbps as measured: `bytes * 8 / (seconds * 1024 * 1024)`. A sub-millisecond
/// measurement is floored to avoid reporting infinity on loopback.
pub fn throughput_mbps(bytes: u64, seconds: f64) -> f64 {
    let seconds = seconds.max(0.001);
    bytes as f64 * 8.0 / (seconds * 1024.0 * 1024.0)
}
