// SPDX-License-Identifier: MIT

//! Run state: per-workflow and per-agent status tracking
//!
//! State machines:
//!     Workflow: Idle -> Running -> Completed | Failed | Cancelled
//!     Agent:    Idle/Waiting -> Running -> Completed | Failed,
//!               Skipped reachable from Waiting
//!
//! `RunSession::apply` is the single transition function; it consumes
//! events strictly in arrival order and never reorders or batches, so
//! agent output is exactly the arrival-order concatenation of chunks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::run::event::ExecutionEvent;

/// Workflow-level execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    /// Terminal states accept no further events (only a local reset).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Individual agent execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Waiting,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl AgentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

/// Status and streamed output of one agent node during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRun {
    pub agent_id: String,
    pub status: AgentStatus,
    /// Append-only accumulator of streamed output chunks
    pub output: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

impl AgentRun {
    pub fn new(agent_id: impl Into<String>, status: AgentStatus) -> Self {
        Self {
            agent_id: agent_id.into(),
            status,
            output: String::new(),
            tokens_used: 0,
            latency_ms: 0,
        }
    }
}

/// State of the one live execution attempt
///
/// Exactly one session is live at a time; starting a new run replaces
/// the session wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSession {
    /// Assigned by the trigger API; `None` while idle
    pub execution_id: Option<String>,
    pub workflow_status: WorkflowStatus,
    /// One record per graph node present when the run started
    pub agents: HashMap<String, AgentRun>,
    pub total_tokens: u64,
    /// Most recent diagnostic surfaced by an `error` event or a channel
    /// failure. Informational only: it never changes the workflow status.
    pub error: Option<String>,
}

impl RunSession {
    /// The idle session: no execution, no agents.
    pub fn idle() -> Self {
        Self {
            execution_id: None,
            workflow_status: WorkflowStatus::Idle,
            agents: HashMap::new(),
            total_tokens: 0,
            error: None,
        }
    }

    /// A freshly started session: `Running`, one `Waiting` agent run per
    /// node, zero counters.
    pub fn started(execution_id: impl Into<String>, node_ids: &[String]) -> Self {
        let agents = node_ids
            .iter()
            .map(|id| (id.clone(), AgentRun::new(id.clone(), AgentStatus::Waiting)))
            .collect();

        Self {
            execution_id: Some(execution_id.into()),
            workflow_status: WorkflowStatus::Running,
            agents,
            total_tokens: 0,
            error: None,
        }
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentRun> {
        self.agents.get(agent_id)
    }

    pub fn is_running(&self) -> bool {
        self.workflow_status == WorkflowStatus::Running
    }

    /// Apply one event, in arrival order.
    ///
    /// After a terminal workflow status every event is ignored; the only
    /// way back is replacing or resetting the session. Events naming an
    /// unknown agent id are ignored except `agent_status`, which
    /// synthesizes a default record first - an output chunk alone never
    /// creates a phantom agent run.
    pub fn apply(&mut self, event: ExecutionEvent) {
        if self.workflow_status.is_terminal() {
            log::debug!("Ignoring event after terminal state: {:?}", event);
            return;
        }

        match event {
            ExecutionEvent::WorkflowStatus { status } => {
                // Idle is only reachable through a local reset, never
                // from the wire
                if status == WorkflowStatus::Idle {
                    log::debug!("Ignoring workflow_status event carrying idle");
                    return;
                }
                self.workflow_status = status;
            }
            ExecutionEvent::AgentStatus { agent_id, status } => {
                self.agents
                    .entry(agent_id.clone())
                    .or_insert_with(|| AgentRun::new(agent_id, AgentStatus::Idle))
                    .status = status;
            }
            ExecutionEvent::AgentOutputChunk { agent_id, chunk } => {
                match self.agents.get_mut(&agent_id) {
                    Some(run) => run.output.push_str(&chunk),
                    None => log::debug!("Output chunk for unknown agent {}, dropped", agent_id),
                }
            }
            ExecutionEvent::AgentCompleted {
                agent_id,
                tokens_used,
                latency_ms,
            } => match self.agents.get_mut(&agent_id) {
                Some(run) => {
                    run.status = AgentStatus::Completed;
                    run.tokens_used = tokens_used;
                    run.latency_ms = latency_ms;
                }
                None => log::debug!("Completion for unknown agent {}, dropped", agent_id),
            },
            ExecutionEvent::WorkflowCompleted {
                status,
                total_tokens,
            } => {
                self.workflow_status = status;
                self.total_tokens = total_tokens;
            }
            ExecutionEvent::Error { message, agent_id } => {
                if let Some(agent_id) = agent_id {
                    if let Some(run) = self.agents.get_mut(&agent_id) {
                        run.status = AgentStatus::Failed;
                    }
                }
                self.error = Some(message);
            }
        }
    }
}

impl Default for RunSession {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> RunSession {
        RunSession::started("exec-1", &["a".to_string(), "b".to_string()])
    }

    #[test]
    fn test_started_session_initializes_waiting_agents() {
        let session = started();
        assert_eq!(session.workflow_status, WorkflowStatus::Running);
        assert_eq!(session.execution_id.as_deref(), Some("exec-1"));
        assert_eq!(session.agents.len(), 2);

        let run = session.agent("a").unwrap();
        assert_eq!(run.status, AgentStatus::Waiting);
        assert!(run.output.is_empty());
        assert_eq!(run.tokens_used, 0);
        assert_eq!(run.latency_ms, 0);
    }

    #[test]
    fn test_output_chunks_concatenate_in_arrival_order() {
        let mut session = started();
        session.apply(ExecutionEvent::AgentOutputChunk {
            agent_id: "a".to_string(),
            chunk: "Hel".to_string(),
        });
        session.apply(ExecutionEvent::AgentOutputChunk {
            agent_id: "a".to_string(),
            chunk: "lo".to_string(),
        });

        assert_eq!(session.agent("a").unwrap().output, "Hello");
    }

    #[test]
    fn test_chunk_for_unknown_agent_leaves_state_unchanged() {
        let mut session = started();
        let before = session.clone();

        session.apply(ExecutionEvent::AgentOutputChunk {
            agent_id: "ghost".to_string(),
            chunk: "boo".to_string(),
        });

        assert_eq!(session, before);
    }

    #[test]
    fn test_agent_completed_sets_counters_and_keeps_output() {
        let mut session = started();
        session.apply(ExecutionEvent::AgentOutputChunk {
            agent_id: "a".to_string(),
            chunk: "Hello".to_string(),
        });
        session.apply(ExecutionEvent::AgentCompleted {
            agent_id: "a".to_string(),
            tokens_used: 120,
            latency_ms: 800,
        });

        let run = session.agent("a").unwrap();
        assert_eq!(run.status, AgentStatus::Completed);
        assert_eq!(run.tokens_used, 120);
        assert_eq!(run.latency_ms, 800);
        assert_eq!(run.output, "Hello");
    }

    #[test]
    fn test_agent_status_synthesizes_missing_record() {
        let mut session = started();
        session.apply(ExecutionEvent::AgentStatus {
            agent_id: "late".to_string(),
            status: AgentStatus::Running,
        });

        let run = session.agent("late").unwrap();
        assert_eq!(run.status, AgentStatus::Running);
        assert!(run.output.is_empty());
    }

    #[test]
    fn test_workflow_completed_overrides_running_agents() {
        let mut session = started();
        session.apply(ExecutionEvent::AgentStatus {
            agent_id: "a".to_string(),
            status: AgentStatus::Running,
        });
        session.apply(ExecutionEvent::WorkflowCompleted {
            status: WorkflowStatus::Cancelled,
            total_tokens: 500,
        });

        assert_eq!(session.workflow_status, WorkflowStatus::Cancelled);
        assert_eq!(session.total_tokens, 500);
        // The agent record itself is untouched
        assert_eq!(session.agent("a").unwrap().status, AgentStatus::Running);
    }

    #[test]
    fn test_events_after_terminal_state_are_ignored() {
        let mut session = started();
        session.apply(ExecutionEvent::WorkflowCompleted {
            status: WorkflowStatus::Completed,
            total_tokens: 42,
        });

        session.apply(ExecutionEvent::AgentOutputChunk {
            agent_id: "a".to_string(),
            chunk: "late".to_string(),
        });
        session.apply(ExecutionEvent::WorkflowStatus {
            status: WorkflowStatus::Running,
        });

        assert_eq!(session.workflow_status, WorkflowStatus::Completed);
        assert!(session.agent("a").unwrap().output.is_empty());
    }

    #[test]
    fn test_idle_status_event_does_not_regress_running_session() {
        let mut session = started();
        session.apply(ExecutionEvent::WorkflowStatus {
            status: WorkflowStatus::Idle,
        });

        assert_eq!(session.workflow_status, WorkflowStatus::Running);
    }

    #[test]
    fn test_error_event_forces_named_agent_to_failed() {
        let mut session = started();
        session.apply(ExecutionEvent::Error {
            message: "provider timeout".to_string(),
            agent_id: Some("b".to_string()),
        });

        assert_eq!(session.agent("b").unwrap().status, AgentStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("provider timeout"));
        // Workflow status only changes on workflow_completed
        assert_eq!(session.workflow_status, WorkflowStatus::Running);
    }

    #[test]
    fn test_error_event_without_agent_is_diagnostic_only() {
        let mut session = started();
        let agents_before = session.agents.clone();

        session.apply(ExecutionEvent::Error {
            message: "redis hiccup".to_string(),
            agent_id: None,
        });

        assert_eq!(session.agents, agents_before);
        assert_eq!(session.error.as_deref(), Some("redis hiccup"));
    }

    #[test]
    fn test_error_for_unknown_agent_records_diagnostic_only() {
        let mut session = started();
        session.apply(ExecutionEvent::Error {
            message: "boom".to_string(),
            agent_id: Some("ghost".to_string()),
        });

        assert!(session.agent("ghost").is_none());
        assert_eq!(session.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_status_serialization_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(
            serde_json::to_string(&AgentStatus::Skipped).unwrap(),
            "\"skipped\""
        );
    }
}
