//! WebSocket event channel
//!
//! Connects to the backend's execution stream at
//! `{ws_base}/ws/executions/{execution_id}` and adapts it to the
//! `EventChannel` trait: text frames come out raw, pings are answered,
//! the cancel record goes back as a text frame. A close frame, a
//! transport error, or `close()` ends the stream; the coordinator treats
//! an early end as a diagnostic, not a terminal run state.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::channel::EventChannel;
use crate::error::ChannelError;
use crate::run::event::CancelRequest;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `EventChannel` over a WebSocket connection
pub struct WebSocketChannel {
    stream: Option<WsStream>,
}

impl WebSocketChannel {
    /// Build the stream endpoint for an execution.
    pub fn endpoint(ws_base: &Url, execution_id: &str) -> Result<Url, ChannelError> {
        ws_base
            .join(&format!("/ws/executions/{}", execution_id))
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    /// Open the channel for one execution.
    pub async fn connect(ws_base: &Url, execution_id: &str) -> Result<Self, ChannelError> {
        let endpoint = Self::endpoint(ws_base, execution_id)?;
        log::info!("Opening event channel: {}", endpoint);

        let (stream, _) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| ChannelError::Transport(format!("connect failed: {}", e)))?;

        Ok(Self {
            stream: Some(stream),
        })
    }

    async fn pong(stream: &mut WsStream, payload: Vec<u8>) {
        let _ = stream.send(Message::Pong(payload)).await;
    }
}

#[async_trait]
impl EventChannel for WebSocketChannel {
    async fn next_frame(&mut self) -> Option<String> {
        let stream = self.stream.as_mut()?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text),
                Some(Ok(Message::Ping(payload))) => Self::pong(stream, payload).await,
                Some(Ok(Message::Close(_))) | None => {
                    self.stream = None;
                    return None;
                }
                Some(Ok(_)) => {} // binary/pong frames carry nothing for us
                Some(Err(e)) => {
                    log::warn!("Event channel transport error: {}", e);
                    self.stream = None;
                    return None;
                }
            }
        }
    }

    async fn send_cancel(&mut self, request: CancelRequest) -> Result<(), ChannelError> {
        let stream = self.stream.as_mut().ok_or(ChannelError::Closed)?;
        let frame = serde_json::to_string(&request)
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_builds_execution_path() {
        let base = Url::parse("ws://localhost:8000").unwrap();
        let endpoint = WebSocketChannel::endpoint(&base, "exec-42").unwrap();
        assert_eq!(endpoint.as_str(), "ws://localhost:8000/ws/executions/exec-42");
    }

    #[test]
    fn test_endpoint_replaces_base_path() {
        // The stream endpoint is absolute on the host, whatever path the
        // base URL carries.
        let base = Url::parse("wss://deck.example.com/api/v1/").unwrap();
        let endpoint = WebSocketChannel::endpoint(&base, "abc").unwrap();
        assert_eq!(endpoint.as_str(), "wss://deck.example.com/ws/executions/abc");
    }
}
