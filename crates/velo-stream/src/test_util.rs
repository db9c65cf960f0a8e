use bytes::Bytes;

use crate::error::SinkError;
use crate::sink::ByteSink;

/// In-memory sink for driver tests: records every chunk, optionally starts
/// failing after a fixed number of accepted writes.
#[derive(Debug, Default)]
pub(crate) struct CollectSink {
    pub chunks: Vec<Bytes>,
    pub closed: bool,
    fail_after: Option<usize>,
}

impl CollectSink {
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::default()
        }
    }
}

impl ByteSink for CollectSink {
    type Error = SinkError;

    async fn send(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        if let Some(limit) = self.fail_after {
            if self.chunks.len() >= limit {
                return Err(SinkError::Closed);
            }
        }
        self.chunks.push(chunk);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }
}
