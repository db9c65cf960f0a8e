use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

/// Lifecycle of one transfer: `Active` until exactly one terminal
/// transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

/// Cancellation signal owned by a session and observed at every suspension
/// point. Settable exactly once, from any source: consumer disconnect,
/// abort, or sink error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<CancelInner>);

#[derive(Debug, Default)]
struct CancelInner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Only the first call has any effect.
    pub fn cancel(&self) {
        if !self.0.flag.swap(true, Ordering::AcqRel) {
            self.0.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.flag.load(Ordering::Acquire)
    }

    /// Resolve once the token is tripped. Registration happens before the
    /// flag re-check, so a concurrent `cancel` cannot be missed.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            let notified = self.0.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Mutable state of one in-flight transfer.
///
/// The driving task owns the session; the only shared part is the
/// cancellation token, cloned out to whatever detects disconnects.
#[derive(Debug)]
pub struct StreamSession {
    started: Instant,
    bytes_sent: u64,
    state: SessionState,
    cancel: CancelToken,
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            bytes_sent: 0,
            state: SessionState::Active,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for external cancellation (transport close, client abort).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn record_sent(&mut self, n: usize) {
        self.bytes_sent += n as u64;
    }

    /// Apply a terminal transition. Returns `false` (and changes nothing)
    /// if the session already finished; late continuations become no-ops.
    pub fn finish(&mut self, terminal: SessionState) -> bool {
        debug_assert!(terminal.is_terminal());
        if self.state.is_terminal() {
            return false;
        }
        self.state = terminal;
        debug!(
            state = ?terminal,
            bytes_sent = self.bytes_sent,
            elapsed_ms = self.elapsed().as_millis() as u64,
            "stream session finished"
        );
        true
    }

    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            state: self.state,
            bytes_sent: self.bytes_sent,
            elapsed: self.elapsed(),
        }
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a finished (or observed) session, for logging and response
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub state: SessionState,
    pub bytes_sent: u64,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_applies_only_first_transition() {
        let mut session = StreamSession::new();
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.finish(SessionState::Completed));
        assert!(!session.finish(SessionState::Failed));
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_trip() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_tripped() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
