use std::time::Duration;

use serde::Serialize;

use crate::Clock;
use crate::fmt;

/// Upper bound on samples per probe request.
pub const MAX_PROBE_COUNT: u32 = 10;

/// Lower bound on spacing between samples.
pub const MIN_PROBE_INTERVAL_MS: u64 = 100;

/// Clamped parameters for one latency probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSpec {
    pub count: u32,
    pub interval_ms: u64,
}

impl ProbeSpec {
    /// Build a spec, clamping `count` to `[1, 10]` and `interval_ms` to a
    /// 100ms floor. Out-of-range requests are corrected, not rejected.
    pub fn clamped(count: u32, interval_ms: u64) -> Self {
        Self {
            count: count.clamp(1, MAX_PROBE_COUNT),
            interval_ms: interval_ms.max(MIN_PROBE_INTERVAL_MS),
        }
    }
}

/// One timestamped measurement within a probe run.
///
/// `latency` is measured against the probe's start timestamp, not against
/// the previous sample.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySample {
    pub index: u32,
    #[serde(serialize_with = "fmt::fixed3")]
    pub server_timestamp: f64,
    #[serde(serialize_with = "fmt::fixed3")]
    pub latency: f64,
}

/// Descriptive statistics over the collected latencies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyStats {
    #[serde(serialize_with = "fmt::fixed3")]
    pub average: f64,
    #[serde(serialize_with = "fmt::fixed3")]
    pub min: f64,
    #[serde(serialize_with = "fmt::fixed3")]
    pub max: f64,
    #[serde(serialize_with = "fmt::fixed3")]
    pub jitter: f64,
}

impl LatencyStats {
    /// Reduce a latency series to average/min/max/jitter. An empty series
    /// yields all zeros.
    pub fn from_latencies(latencies: &[f64]) -> Self {
        if latencies.is_empty() {
            return Self {
                average: 0.0,
                min: 0.0,
                max: 0.0,
                jitter: 0.0,
            };
        }
        let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = latencies.iter().sum::<f64>() / latencies.len() as f64;
        Self {
            average,
            min,
            max,
            jitter: max - min,
        }
    }
}

/// Ordered samples plus aggregated statistics for one probe run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyReport {
    pub samples: Vec<LatencySample>,
    pub stats: LatencyStats,
}

/// Run one latency probe: `count` sequential measurements spaced
/// `interval_ms` apart. Finite and restartable; nothing persists after the
/// report is returned.
pub async fn run_probe(clock: &Clock, spec: &ProbeSpec) -> LatencyReport {
    let start = clock.now_ms();
    let mut samples = Vec::with_capacity(spec.count as usize);
    for index in 0..spec.count {
        tokio::time::sleep(Duration::from_millis(spec.interval_ms)).await;
        let now = clock.now_ms();
        samples.push(LatencySample {
            index,
            server_timestamp: clock.wall_ms(),
            latency: now - start,
        });
    }
    let latencies: Vec<f64> = samples.iter().map(|s| s.latency).collect();
    LatencyReport {
        stats: LatencyStats::from_latencies(&latencies),
        samples,
    }
}
