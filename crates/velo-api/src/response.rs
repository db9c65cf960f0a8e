use serde::Serialize;
use velo_core::fmt;

/// Metadata announced alongside a fixed-size download, before the first
/// chunk is written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStarted {
    /// Exact length the client will receive.
    pub size_bytes: u64,
    pub size_mb: f64,
    pub pattern: &'static str,
    pub connections: u32,
    /// Epoch-anchored server time, fixed 3-decimal string.
    #[serde(serialize_with = "fmt::fixed3")]
    pub started_at: f64,
}

/// Accounting returned after an upload body has been fully received.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub received_bytes: u64,
    pub pattern: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_size_mb: Option<f64>,
    /// Server-side receive time in seconds.
    #[serde(serialize_with = "fmt::fixed3")]
    pub elapsed_seconds: f64,
    /// Client-declared-start to server-finish, when the client sent a
    /// start timestamp.
    #[serde(serialize_with = "fmt::fixed3_opt", skip_serializing_if = "Option::is_none")]
    pub client_elapsed_seconds: Option<f64>,
    /// Throughput in Mbps: `bytes * 8 / (seconds * 1024 * 1024)`.
    #[serde(serialize_with = "fmt::fixed3")]
    pub mbps: f64,
    /// First 8 hex chars of the body's MD5; single-connection uploads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_connections: Option<u32>,
}
