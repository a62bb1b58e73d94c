// SPDX-License-Identifier: MIT

//! The workflow graph model
//!
//! `GraphModel` is the single mutation surface for a workflow canvas.
//! Every operation either fully applies or fully rejects: a rejected
//! mutation returns an error and leaves the graph exactly as it was.
//!
//! Invariants held at all times:
//! - the directed graph over node ids is acyclic
//! - at most one input node exists
//! - no edge refers to a missing node

use serde_json::Value;
use uuid::Uuid;

use crate::error::GraphError;
use crate::graph::dag;
use crate::graph::patch::NodePatch;
use crate::graph::snapshot::CanvasData;
use crate::graph::types::{Edge, Node, NodeData, NodeKind, Position};

/// Mutable workflow graph with structural invariant enforcement
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Currently selected node, if any. Not persisted.
    selected: Option<String>,
    /// Canvas viewport, opaque to the model, preserved across save/load.
    viewport: Option<Value>,
    /// Set by every mutation that changes the graph, cleared by a
    /// successful save or a fresh load.
    dirty: bool,
}

impl GraphModel {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph from a persisted canvas snapshot. The result is
    /// clean (no unsaved changes).
    pub fn from_canvas(canvas: CanvasData) -> Self {
        Self {
            nodes: canvas.nodes,
            edges: canvas.edges,
            selected: None,
            viewport: canvas.viewport,
            dirty: false,
        }
    }

    /// Serialize the graph back into the persisted snapshot format.
    pub fn to_canvas(&self) -> CanvasData {
        CanvasData {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            viewport: self.viewport.clone(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The unique input node, if one exists.
    pub fn input_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind() == NodeKind::Input)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a node (or clear the selection with `None`). Unknown ids
    /// clear the selection. Selection is UI state and never dirties the
    /// graph.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.nodes.iter().any(|n| n.id == *id))
            .map(str::to_string);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Clear the unsaved flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Insert a node with a fresh unique id and return the id.
    ///
    /// A second input node is rejected with `DuplicateInputNode` and the
    /// graph is unchanged.
    pub fn add_node(&mut self, data: NodeData, position: Position) -> Result<String, GraphError> {
        if data.kind() == NodeKind::Input && self.input_node().is_some() {
            return Err(GraphError::DuplicateInputNode);
        }

        let id = Uuid::new_v4().to_string();
        self.nodes.push(Node {
            id: id.clone(),
            position,
            data,
        });
        self.dirty = true;

        log::debug!("Added node {}", id);
        Ok(id)
    }

    /// Remove a node and every edge incident to it. Clears the
    /// selection if the removed node was selected. Silent no-op when the
    /// id is unknown.
    pub fn remove_node(&mut self, id: &str) {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return;
        }

        self.edges.retain(|e| e.source != id && e.target != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.dirty = true;

        log::debug!("Removed node {}", id);
    }

    /// Merge a field-level patch into a node's data. No-op when the id
    /// is unknown or the patch kind does not match the node kind.
    pub fn update_node_data(&mut self, id: &str, patch: NodePatch) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return;
        };

        match (&mut node.data, patch) {
            (NodeData::Agent(data), NodePatch::Agent(patch)) => data.apply(patch),
            (NodeData::Input(data), NodePatch::Input(patch)) => data.apply(patch),
            (_, _) => {
                log::warn!("Patch kind does not match node {} kind, ignoring", id);
                return;
            }
        }

        self.dirty = true;
    }

    /// Update a node's canvas position (drag end). Opaque to the graph
    /// logic but part of the persisted snapshot, so it dirties the graph.
    pub fn move_node(&mut self, id: &str, position: Position) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.position = position;
            self.dirty = true;
        }
    }

    /// Add a directed edge and return its id.
    ///
    /// Rejected (graph unchanged) when the endpoints are unknown, equal,
    /// or when the edge would close a cycle.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) -> Result<String, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(GraphError::UnknownNode(endpoint.to_string()));
            }
        }
        if dag::would_create_cycle(&self.edges, source, target) {
            return Err(GraphError::WouldCreateCycle {
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        let id = Uuid::new_v4().to_string();
        self.edges.push(Edge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.map(str::to_string),
            target_handle: target_handle.map(str::to_string),
        });
        self.dirty = true;

        log::debug!("Connected {} -> {}", source, target);
        Ok(id)
    }

    /// Remove an edge by id. Silent no-op when the id is unknown.
    pub fn remove_edge(&mut self, id: &str) {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() != before {
            self.dirty = true;
        }
    }

    /// Deterministic execution order of the current graph.
    pub fn execution_order(&self) -> Result<Vec<String>, GraphError> {
        dag::execution_order(&self.nodes, &self.edges)
    }
}
