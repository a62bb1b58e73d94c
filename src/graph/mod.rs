// SPDX-License-Identifier: MIT

//! Workflow graph model
//!
//! This module owns the canvas-side representation of a workflow:
//! - `types` - nodes, edges and their kind-specific data
//! - `dag` - pure graph algorithms (cycle guard, execution order)
//! - `patch` - explicit field-level partial updates to node data
//! - `model` - the mutation surface enforcing structural invariants
//! - `snapshot` - the persisted wire schema

pub mod dag;
pub mod model;
pub mod patch;
pub mod snapshot;
pub mod types;

pub use dag::{dependencies_of, execution_order, would_create_cycle};
pub use model::GraphModel;
pub use patch::{AgentPatch, InputPatch, NodePatch};
pub use snapshot::{CanvasData, Workflow, WorkflowCreate, WorkflowList, WorkflowUpdate};
pub use types::{AgentData, Edge, InputData, Node, NodeData, NodeKind, Position};
