use thiserror::Error;

/// Errors reported by the built-in sink adapters.
///
/// Mid-stream sink failures never surface to the client (headers are
/// already gone by then), so these are logged by the drivers and folded
/// into the session's terminal state instead of being propagated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The consumer hung up; every subsequent write would be lost.
    #[error("sink closed by consumer")]
    Closed,
}
