// SPDX-License-Identifier: MIT

//! Typed error handling for flowdeck-rs
//!
//! Rejected graph mutations are ordinary `Err` values, never panics:
//! the caller decides whether to surface them as a UI warning.

use thiserror::Error;

/// Top-level error type for flowdeck-rs
#[derive(Debug, Error)]
pub enum FlowdeckError {
    /// Graph mutation rejected or graph invariant violated
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Event channel transport failure
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Non-2xx response from the workflow API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Configuration errors (bad base URL, missing settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Graph-specific errors: every variant is a rejected mutation or a
/// structural diagnostic, and the graph is unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Edge from a node to itself
    #[error("Cannot connect node '{0}' to itself")]
    SelfLoop(String),

    /// Proposed edge would close a directed cycle
    ///
    /// Field names avoid `source`, which thiserror reserves for the
    /// error cause.
    #[error("Edge {from} -> {to} would create a cycle")]
    WouldCreateCycle { from: String, to: String },

    /// A workflow may hold at most one input node
    #[error("Workflow already has an input node")]
    DuplicateInputNode,

    /// Cycle found while computing the execution order
    #[error("Workflow contains a cycle involving nodes: {0:?}")]
    CycleDetected(Vec<String>),

    /// Edge endpoint does not name a known node
    #[error("Unknown node: {0}")]
    UnknownNode(String),
}

/// Event channel errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Channel is closed or was never opened
    #[error("Event channel is closed")]
    Closed,

    /// Underlying transport failure (connect, send, protocol)
    #[error("Transport error: {0}")]
    Transport(String),
}

impl FlowdeckError {
    /// Create an API error from a response status and body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<String> for FlowdeckError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for FlowdeckError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
