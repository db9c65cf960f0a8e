use velo_payload::{PayloadPattern, PayloadStore};

/// Immutable server configuration, constructed once at startup and passed
/// by reference to the handlers. Nothing here changes at runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_name: String,
    pub server_version: String,
    /// Inclusive bounds for fixed-size download requests, in MB.
    pub min_download_mb: f64,
    pub max_download_mb: f64,
    /// Chunk size for fixed-size downloads.
    pub chunk_size: usize,
    /// Hard cap on upload bodies.
    pub max_upload_bytes: u64,
    /// Entry cap for the payload cache.
    pub payload_cache_entries: usize,
    /// Download sizes (MB) pre-generated at startup.
    pub prewarm_sizes_mb: Vec<f64>,
}

impl ServerConfig {
    /// Build the payload cache this configuration describes and generate
    /// the common download sizes ahead of traffic.
    pub fn build_store(&self) -> PayloadStore {
        let store = PayloadStore::new(self.payload_cache_entries);
        store.prewarm(
            &self.prewarm_sizes_mb,
            &[
                PayloadPattern::Random,
                PayloadPattern::Compressible,
                PayloadPattern::Incompressible,
            ],
        );
        store
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "velo".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            min_download_mb: 0.1,
            max_download_mb: 10.0,
            chunk_size: velo_stream::DEFAULT_CHUNK_SIZE,
            max_upload_bytes: 500 * 1024 * 1024,
            payload_cache_entries: 64,
            prewarm_sizes_mb: vec![0.1, 0.5, 1.0, 2.0, 3.0, 5.0, 8.0, 10.0],
        }
    }
}
