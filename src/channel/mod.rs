// SPDX-License-Identifier: MIT

//! Event channel abstraction
//!
//! An `EventChannel` is the ordered transport a run session owns:
//! inbound raw event frames, one outbound cancel record. Exactly one
//! channel is open per live session; the coordinator closes it when the
//! session ends, is replaced, or is reset.
//!
//! `local_channel` is the mpsc-backed in-process implementation used by
//! tests and the replay command; `ws` holds the WebSocket client.

pub mod ws;

pub use ws::WebSocketChannel;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::run::event::CancelRequest;

/// Ordered, bidirectional transport for one run session
#[async_trait]
pub trait EventChannel: Send {
    /// Next raw frame, in arrival order. `None` once the channel closes.
    async fn next_frame(&mut self) -> Option<String>;

    /// Submit the cancel record for this session.
    async fn send_cancel(&mut self, request: CancelRequest) -> Result<(), ChannelError>;

    /// Close the channel. Further `next_frame` calls return `None`.
    async fn close(&mut self);
}

/// Feeder side of an in-process channel: push frames in, observe cancels.
pub struct LocalChannelHandle {
    frames: mpsc::Sender<String>,
    pub cancels: mpsc::Receiver<CancelRequest>,
}

impl LocalChannelHandle {
    /// Queue one frame for delivery.
    pub async fn send_frame(&self, frame: impl Into<String>) -> Result<(), ChannelError> {
        self.frames
            .send(frame.into())
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

/// In-process `EventChannel` backed by tokio mpsc queues
pub struct LocalChannel {
    frames: Option<mpsc::Receiver<String>>,
    cancels: mpsc::Sender<CancelRequest>,
}

/// Create a connected (handle, channel) pair.
pub fn local_channel(capacity: usize) -> (LocalChannelHandle, LocalChannel) {
    let (frame_tx, frame_rx) = mpsc::channel(capacity);
    let (cancel_tx, cancel_rx) = mpsc::channel(8);

    (
        LocalChannelHandle {
            frames: frame_tx,
            cancels: cancel_rx,
        },
        LocalChannel {
            frames: Some(frame_rx),
            cancels: cancel_tx,
        },
    )
}

#[async_trait]
impl EventChannel for LocalChannel {
    async fn next_frame(&mut self) -> Option<String> {
        match self.frames.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    async fn send_cancel(&mut self, request: CancelRequest) -> Result<(), ChannelError> {
        if self.frames.is_none() {
            return Err(ChannelError::Closed);
        }
        self.cancels
            .send(request)
            .await
            .map_err(|_| ChannelError::Closed)
    }

    async fn close(&mut self) {
        self.frames = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (handle, mut channel) = local_channel(8);
        handle.send_frame("one").await.unwrap();
        handle.send_frame("two").await.unwrap();

        assert_eq!(channel.next_frame().await.as_deref(), Some("one"));
        assert_eq!(channel.next_frame().await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_dropped_handle_ends_stream() {
        let (handle, mut channel) = local_channel(8);
        handle.send_frame("last").await.unwrap();
        drop(handle);

        assert_eq!(channel.next_frame().await.as_deref(), Some("last"));
        assert_eq!(channel.next_frame().await, None);
    }

    #[tokio::test]
    async fn test_cancel_reaches_handle() {
        let (mut handle, mut channel) = local_channel(8);
        channel
            .send_cancel(CancelRequest::new("exec-1"))
            .await
            .unwrap();

        let request = handle.cancels.recv().await.unwrap();
        assert_eq!(request.execution_id, "exec-1");
    }

    #[tokio::test]
    async fn test_closed_channel_yields_nothing_and_rejects_cancel() {
        let (handle, mut channel) = local_channel(8);
        handle.send_frame("pending").await.unwrap();

        channel.close().await;

        assert_eq!(channel.next_frame().await, None);
        assert!(matches!(
            channel.send_cancel(CancelRequest::new("x")).await,
            Err(ChannelError::Closed)
        ));
    }
}
