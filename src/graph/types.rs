//! Graph type definitions
//!
//! Wire-compatible node and edge types for the workflow canvas. Field
//! names follow the persisted snapshot format (`type`, `sourceHandle`,
//! `systemPrompt`, ...), so these round-trip unchanged through the API.

use serde::{Deserialize, Serialize};

/// Node kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An agent step backed by an LLM provider
    Agent,
    /// The unique entry point supplying the trigger input
    Input,
}

/// Canvas position. Opaque to the graph logic, carried for round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable identifier
    pub id: String,
    pub position: Position,
    /// Kind-specific payload, serialized as `{"type": ..., "data": ...}`
    #[serde(flatten)]
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Kind-specific node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NodeData {
    #[serde(rename = "agent")]
    Agent(AgentData),
    #[serde(rename = "inputNode")]
    Input(InputData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Agent(_) => NodeKind::Agent,
            NodeData::Input(_) => NodeKind::Input,
        }
    }
}

/// Configuration of an agent step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
    #[serde(default)]
    pub name: String,
    /// LLM provider key, e.g. "openai" or "anthropic"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, rename = "systemPrompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens", rename = "maxTokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for AgentData {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: default_provider(),
            model: default_model(),
            system_prompt: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Label and description of the input node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// A directed edge between two nodes
///
/// Multiple edges between the same ordered pair are allowed; self-loops
/// are not (enforced by `GraphModel::connect`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Port discriminator on the source node, if it has several
    #[serde(
        default,
        rename = "sourceHandle",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_handle: Option<String>,
    #[serde(
        default,
        rename = "targetHandle",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}
