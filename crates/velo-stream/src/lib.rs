//! Backpressure-aware chunked streaming engine.
//!
//! Each in-flight transfer is one [`StreamSession`] driven by a single
//! logical task: the task owns the cursor, suspends at sink backpressure and
//! inter-chunk delays, and reaches exactly one terminal state
//! (completed, cancelled, or failed). Cancellation is a token owned by the
//! session and observed at every suspension point, settable exactly once
//! from any source.
//!
//! Three drivers share the session discipline:
//!
//! - [`write_chunked`] - fixed-size transfers in bounded chunks
//! - [`run_adaptive`] - duration-bound transfers with a ramping chunk size
//!   and throttle-controlled pacing
//! - [`run_warmup`] - a fixed series of payload bursts to prime the path

pub use self::adaptive::{AdaptiveSpec, run_adaptive};
pub use self::error::SinkError;
pub use self::session::{CancelToken, SessionState, StreamSession, StreamSummary};
pub use self::sink::{ByteSink, ChannelSink, into_body_stream};
pub use self::warmup::{WARMUP_PHASES, WarmupPhase, run_warmup};
pub use self::writer::{DEFAULT_CHUNK_SIZE, write_chunked};

mod adaptive;
mod error;
mod session;
mod sink;
mod warmup;
mod writer;

#[cfg(test)]
pub(crate) mod test_util;
