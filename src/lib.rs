// SPDX-License-Identifier: MIT

//! flowdeck-rs - client core for a visual AI-agent workflow builder
//!
//! The crate has two real subsystems:
//! - `graph` - the workflow graph model with structural invariants
//!   (acyclicity, single input node, no dangling edges)
//! - `run` - execution state driven by the ordered event stream a
//!   workflow run produces server-side
//!
//! `channel` and `client` adapt the two external collaborators: the
//! WebSocket event stream and the workflow REST API.

pub mod channel;
pub mod client;
pub mod error;
pub mod graph;
pub mod run;
