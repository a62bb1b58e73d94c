//! Persisted workflow schema
//!
//! Serde types matching the workflow API contract. A `Workflow` carries
//! the full canvas state (nodes, edges, viewport) as `canvas_data`;
//! `GraphModel` round-trips through `CanvasData`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::graph::types::{Edge, Node};

/// The canvas portion of a workflow: what `GraphModel` loads and saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Pan/zoom state, opaque to the graph logic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Value>,
}

/// A stored workflow as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub canvas_data: CanvasData,
    #[serde(default)]
    pub is_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a workflow
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowCreate {
    pub name: String,
    pub description: String,
    pub canvas_data: CanvasData,
    pub is_template: bool,
}

/// Request body for updating a workflow. Only `Some` fields are sent,
/// and only those are updated server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas_data: Option<CanvasData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
}

/// Response body for listing workflows
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowList {
    pub workflows: Vec<Workflow>,
    pub total: u64,
}
