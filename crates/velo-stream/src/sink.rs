use std::future::Future;

use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::mpsc;

use crate::error::SinkError;

/// Abstract output consumer for one transfer.
///
/// Backpressure is expressed through the futures themselves: `send`
/// resolves only once the sink has accepted the chunk, so a slow consumer
/// suspends the producing task without any explicit drain signal.
pub trait ByteSink: Send {
    type Error: std::error::Error + Send + 'static;

    /// Deliver one chunk. Resolves when the sink has taken ownership of it;
    /// an error means no further writes can succeed.
    fn send(&mut self, chunk: Bytes) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Clean close after the final chunk of a completed transfer.
    fn shutdown(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Sink over a bounded channel.
///
/// The HTTP layer drains the receiving half into the response body; the
/// channel's capacity is the amount of data in flight, and a full channel
/// is the backpressure signal. A dropped receiver models client disconnect.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport should drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ByteSink for ChannelSink {
    type Error = SinkError;

    async fn send(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        self.tx.send(chunk).await.map_err(|_| SinkError::Closed)
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        // Dropping the sender closes the stream; nothing to flush here.
        Ok(())
    }
}

/// Adapt the receiving half of a [`ChannelSink`] into a `Stream` of chunks,
/// the shape HTTP frameworks expect for a streaming response body.
pub fn into_body_stream(rx: mpsc::Receiver<Bytes>) -> impl Stream<Item = Bytes> + Send {
    futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.send(Bytes::from_static(b"abc")).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn send_fails_after_receiver_drops() {
        let (mut sink, rx) = ChannelSink::new(4);
        drop(rx);
        let err = sink.send(Bytes::from_static(b"abc")).await.unwrap_err();
        assert_eq!(err, SinkError::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn full_channel_exerts_backpressure() {
        let (mut sink, mut rx) = ChannelSink::new(1);
        sink.send(Bytes::from_static(b"one")).await.unwrap();

        // Second send must suspend until the receiver drains.
        let second = sink.send(Bytes::from_static(b"two"));
        tokio::pin!(second);
        tokio::select! {
            _ = &mut second => panic!("send resolved against a full channel"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
        }

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"one"));
        second.await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn body_stream_yields_chunks_then_ends() {
        let (mut sink, rx) = ChannelSink::new(4);
        sink.send(Bytes::from_static(b"a")).await.unwrap();
        sink.send(Bytes::from_static(b"b")).await.unwrap();
        drop(sink);

        let mut stream = std::pin::pin!(into_body_stream(rx));
        assert_eq!(stream.next().await.unwrap(), Bytes::from_static(b"a"));
        assert_eq!(stream.next().await.unwrap(), Bytes::from_static(b"b"));
        assert!(stream.next().await.is_none());
    }
}
