// SPDX-License-Identifier: MIT

//! Execution state synchronization
//!
//! A workflow run happens server-side; this module tracks it locally
//! from the ordered event stream the server emits:
//! - `state` - per-run and per-agent status (`RunSession`, `AgentRun`)
//! - `event` - the wire event records and their boundary decoding
//! - `coordinator` - drives the session from an `EventChannel`

pub mod coordinator;
pub mod event;
pub mod state;

pub use coordinator::ExecutionCoordinator;
pub use event::{decode, CancelRequest, ExecutionEvent};
pub use state::{AgentRun, AgentStatus, RunSession, WorkflowStatus};
