use velo_core::ProbeSpec;
use velo_payload::PayloadPattern;
use velo_stream::AdaptiveSpec;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Parsed query parameters for a fixed-size download.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadParams {
    pub size_mb: f64,
    pub pattern: PayloadPattern,
    /// Informational only; echoed back so multi-connection clients can
    /// correlate responses.
    pub connections: u32,
}

impl DownloadParams {
    pub fn new(size_mb: f64, pattern: PayloadPattern, connections: u32) -> Self {
        Self {
            size_mb,
            pattern,
            connections,
        }
    }

    /// Size is the one download parameter that rejects instead of clamping:
    /// out-of-range values are a client error, reported before any byte is
    /// streamed.
    pub fn validate(&self, config: &ServerConfig) -> Result<(), ApiError> {
        if !self.size_mb.is_finite()
            || self.size_mb < config.min_download_mb
            || self.size_mb > config.max_download_mb
        {
            return Err(ApiError::Validation(format!(
                "size must be between {} and {} MB",
                config.min_download_mb, config.max_download_mb
            )));
        }
        Ok(())
    }
}

/// Parsed query parameters for an adaptive (duration-bound) download.
/// These clamp rather than reject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveParams {
    pub initial_mb: f64,
    pub max_mb: f64,
    pub duration_secs: f64,
    pub pattern: PayloadPattern,
    pub throttle: f64,
}

impl AdaptiveParams {
    pub fn to_spec(self) -> AdaptiveSpec {
        AdaptiveSpec::clamped(
            self.initial_mb,
            self.max_mb,
            self.duration_secs,
            self.pattern,
            self.throttle,
        )
    }
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            initial_mb: 0.1,
            max_mb: 10.0,
            duration_secs: 10.0,
            pattern: PayloadPattern::Random,
            throttle: 1.0,
        }
    }
}

/// Parsed query parameters for a latency probe; clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParams {
    pub count: u32,
    pub interval_ms: u64,
}

impl ProbeParams {
    pub fn to_spec(self) -> ProbeSpec {
        ProbeSpec::clamped(self.count, self.interval_ms)
    }
}

/// Client-declared metadata accompanying an upload body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UploadMeta {
    /// Client's wall-clock start of the upload, epoch ms, if declared.
    pub client_start_ms: Option<f64>,
    /// Size the client claims to be sending, MB. Echo only.
    pub declared_size_mb: Option<f64>,
    pub pattern: PayloadPattern,
    /// Set for the multi-connection variant; its presence switches off the
    /// per-body integrity digest.
    pub connection_id: Option<u32>,
    pub total_connections: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_size_bounds_are_inclusive() {
        let cfg = ServerConfig::default();
        for ok in [0.1, 5.0, 10.0] {
            assert!(DownloadParams::new(ok, PayloadPattern::Random, 1).validate(&cfg).is_ok());
        }
        for bad in [-1.0, 0.0, 0.099, 10.001, 20.0, f64::NAN] {
            let err = DownloadParams::new(bad, PayloadPattern::Random, 1)
                .validate(&cfg)
                .unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn adaptive_params_clamp_through_to_spec() {
        let spec = AdaptiveParams {
            initial_mb: 0.0,
            max_mb: 100.0,
            duration_secs: 99.0,
            pattern: PayloadPattern::Random,
            throttle: 0.0,
        }
        .to_spec();
        assert_eq!(spec.initial_mb, 0.1);
        assert_eq!(spec.max_mb, 10.0);
        assert_eq!(spec.duration_secs, 10.0);
        assert_eq!(spec.throttle, 0.1);
    }

    #[test]
    fn probe_params_clamp_through_to_spec() {
        let spec = ProbeParams { count: 50, interval_ms: 1 }.to_spec();
        assert_eq!(spec.count, 10);
        assert_eq!(spec.interval_ms, 100);
    }
}
