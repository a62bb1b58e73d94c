//! Execution event records
//!
//! The wire format is a JSON object discriminated by a `type` field.
//! The string discriminant is a boundary detail only: frames are decoded
//! once into `ExecutionEvent` and handled by exhaustive match from there.
//! Unknown extra fields (timestamps, truncated output previews) are
//! ignored; unknown record types and malformed frames are dropped with a
//! warning, never an error.

use serde::{Deserialize, Serialize};

use crate::run::state::{AgentStatus, WorkflowStatus};

/// One inbound record from the execution event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Workflow-level status change (emitted when the run enters `running`)
    WorkflowStatus { status: WorkflowStatus },
    /// An agent moved to a new status
    AgentStatus {
        agent_id: String,
        status: AgentStatus,
    },
    /// A piece of streamed agent output, in arrival order
    AgentOutputChunk { agent_id: String, chunk: String },
    /// An agent finished, with its usage counters
    AgentCompleted {
        agent_id: String,
        #[serde(default)]
        tokens_used: u64,
        #[serde(default)]
        latency_ms: u64,
    },
    /// The run reached a terminal status
    WorkflowCompleted {
        status: WorkflowStatus,
        #[serde(default)]
        total_tokens: u64,
    },
    /// A non-fatal diagnostic; names an agent when one is at fault
    Error {
        message: String,
        #[serde(default)]
        agent_id: Option<String>,
    },
}

/// Decode a raw frame into an event.
///
/// Returns `None` for malformed or unrecognized records; the stream
/// continues either way.
pub fn decode(frame: &str) -> Option<ExecutionEvent> {
    match serde_json::from_str(frame) {
        Ok(event) => Some(event),
        Err(err) => {
            log::warn!("Dropping malformed event frame: {}", err);
            None
        }
    }
}

/// The single outbound record: ask the server to cancel the run.
///
/// Cancellation is cooperative - the run stays `Running` locally until
/// the corresponding `workflow_completed` event arrives.
#[derive(Debug, Clone, Serialize)]
pub struct CancelRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    pub execution_id: String,
}

impl CancelRequest {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            kind: "cancel",
            execution_id: execution_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_agent_status() {
        let event = decode(r#"{"type": "agent_status", "agent_id": "n1", "status": "running"}"#);
        assert_eq!(
            event,
            Some(ExecutionEvent::AgentStatus {
                agent_id: "n1".to_string(),
                status: AgentStatus::Running,
            })
        );
    }

    #[test]
    fn test_decode_output_chunk() {
        let event = decode(r#"{"type": "agent_output_chunk", "agent_id": "n1", "chunk": "Hel"}"#);
        assert_eq!(
            event,
            Some(ExecutionEvent::AgentOutputChunk {
                agent_id: "n1".to_string(),
                chunk: "Hel".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_agent_completed_with_extra_fields() {
        // The server includes a truncated output preview and a timestamp;
        // both are boundary noise and must not break decoding.
        let frame = r#"{
            "type": "agent_completed",
            "agent_id": "n1",
            "output": "Hello wor...",
            "tokens_used": 120,
            "latency_ms": 800,
            "timestamp": "2025-06-01T12:00:00+00:00"
        }"#;

        assert_eq!(
            decode(frame),
            Some(ExecutionEvent::AgentCompleted {
                agent_id: "n1".to_string(),
                tokens_used: 120,
                latency_ms: 800,
            })
        );
    }

    #[test]
    fn test_decode_workflow_completed_defaults_total_tokens() {
        // Cancelled/failed completions omit total_tokens
        let event = decode(r#"{"type": "workflow_completed", "status": "cancelled"}"#);
        assert_eq!(
            event,
            Some(ExecutionEvent::WorkflowCompleted {
                status: WorkflowStatus::Cancelled,
                total_tokens: 0,
            })
        );
    }

    #[test]
    fn test_decode_error_with_and_without_agent() {
        let with = decode(r#"{"type": "error", "message": "boom", "agent_id": "n1"}"#).unwrap();
        let without =
            decode(r#"{"type": "error", "message": "boom", "agent_id": null, "code": "EXECUTION_ERROR"}"#)
                .unwrap();

        assert_eq!(
            with,
            ExecutionEvent::Error {
                message: "boom".to_string(),
                agent_id: Some("n1".to_string()),
            }
        );
        assert_eq!(
            without,
            ExecutionEvent::Error {
                message: "boom".to_string(),
                agent_id: None,
            }
        );
    }

    #[test]
    fn test_decode_unknown_type_is_dropped() {
        assert_eq!(decode(r#"{"type": "heartbeat"}"#), None);
    }

    #[test]
    fn test_decode_garbage_is_dropped() {
        assert_eq!(decode("not json at all"), None);
        assert_eq!(decode(r#"{"agent_id": "n1"}"#), None);
    }

    #[test]
    fn test_cancel_request_wire_shape() {
        let request = CancelRequest::new("exec-9");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "cancel");
        assert_eq!(value["execution_id"], "exec-9");
    }
}
