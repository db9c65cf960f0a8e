//! Timing primitives for the velo measurement server.
//!
//! Provides the monotonic high-resolution clock shared by all streaming
//! components and the latency probe that collects bounded sample sequences
//! and reduces them to descriptive statistics.
//!
//! # Key Features
//!
//! - **Monotonic timestamps**: sub-millisecond resolution, safe to subtract
//! - **Wall-clock echo**: epoch offset captured once at startup for
//!   externally comparable "server time" fields
//! - **Single-shot probes**: no state persists between invocations

pub use self::clock::Clock;
pub use self::probe::{
    LatencyReport, LatencySample, LatencyStats, ProbeSpec, run_probe, MAX_PROBE_COUNT,
    MIN_PROBE_INTERVAL_MS,
};

pub mod fmt;

mod clock;
mod probe;
