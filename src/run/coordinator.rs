// SPDX-License-Identifier: MIT

//! Execution coordinator
//!
//! Drives the live `RunSession` from its event channel. The coordinator
//! is logically single-threaded: one event at a time, strictly in
//! arrival order. Observers never see a half-applied transition - every
//! applied event publishes a complete session snapshot through a watch
//! channel, so a concurrent reader (a rendering layer, say) always
//! holds a consistent state.
//!
//! Channel lifecycle is one-per-session: starting a run adopts a fresh
//! channel and closes the previous one; reset and session replacement
//! close it too. The channel is assumed reliably ordered (one WebSocket
//! connection); no deduplication is attempted.

use tokio::sync::watch;

use crate::channel::EventChannel;
use crate::error::ChannelError;
use crate::run::event::{self, CancelRequest, ExecutionEvent};
use crate::run::state::RunSession;

/// Owns the one live run session and its event channel
pub struct ExecutionCoordinator {
    session: RunSession,
    channel: Option<Box<dyn EventChannel>>,
    snapshots: watch::Sender<RunSession>,
}

impl ExecutionCoordinator {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(RunSession::idle());
        Self {
            session: RunSession::idle(),
            channel: None,
            snapshots,
        }
    }

    /// The current session. Between calls into the coordinator this is
    /// stable; concurrent readers should use `subscribe` instead.
    pub fn session(&self) -> &RunSession {
        &self.session
    }

    /// Watch complete session snapshots, one per applied event.
    pub fn subscribe(&self) -> watch::Receiver<RunSession> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.clone());
    }

    async fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close().await;
        }
    }

    /// Start tracking a run: replaces any prior session wholesale and
    /// adopts `channel` as the session's event source. The previous
    /// channel, if any, is closed first.
    pub async fn start_execution(
        &mut self,
        execution_id: impl Into<String>,
        node_ids: &[String],
        channel: Box<dyn EventChannel>,
    ) {
        self.close_channel().await;
        self.session = RunSession::started(execution_id, node_ids);
        self.channel = Some(channel);
        self.publish();
    }

    /// Apply one already-decoded event and publish the new snapshot.
    pub fn apply(&mut self, event: ExecutionEvent) {
        self.session.apply(event);
        self.publish();
    }

    /// Read, decode and apply the next event; returns the applied event.
    ///
    /// Malformed frames are skipped. `None` means the channel is
    /// exhausted or the session has no channel.
    pub async fn step(&mut self) -> Option<ExecutionEvent> {
        loop {
            let frame = self.channel.as_mut()?.next_frame().await?;
            if let Some(event) = event::decode(&frame) {
                self.apply(event.clone());
                return Some(event);
            }
        }
    }

    /// Drive the session until a terminal workflow status or the channel
    /// closes, then close the channel.
    ///
    /// A channel that closes before a terminal event is surfaced as a
    /// diagnostic; the run stays `Running` until the caller resets - the
    /// only authoritative end-of-run signal is `workflow_completed`.
    pub async fn pump(&mut self) {
        while self.session.is_running() {
            if self.step().await.is_none() {
                if self.session.is_running() {
                    log::warn!("Event channel closed before the run finished");
                    self.session.error = Some("event channel closed".to_string());
                    self.publish();
                }
                break;
            }
        }
        self.close_channel().await;
    }

    /// Ask the server to cancel the run. Cooperative: the session is not
    /// touched here - the terminal state arrives as a
    /// `workflow_completed` event with status `cancelled`.
    pub async fn cancel(&mut self) -> Result<(), ChannelError> {
        let execution_id = match &self.session.execution_id {
            Some(id) if self.session.is_running() => id.clone(),
            _ => return Err(ChannelError::Closed),
        };

        let channel = self.channel.as_mut().ok_or(ChannelError::Closed)?;
        channel.send_cancel(CancelRequest::new(execution_id)).await
    }

    /// Discard the session and return to idle. Valid from any state.
    pub async fn reset(&mut self) {
        self.close_channel().await;
        self.session = RunSession::idle();
        self.publish();
    }
}

impl Default for ExecutionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
