//! Page snapshot and per-pass bookkeeping types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, NodeId};

/// Handle to one fillable field, valid for a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHandle {
    index: usize,
    node: NodeId,
    backend_node_id: i64,
}

impl FieldHandle {
    pub fn new(index: usize, node: NodeId, backend_node_id: i64) -> Self {
        Self {
            index,
            node,
            backend_node_id,
        }
    }

    /// Position in scan order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Node in the snapshot's document tree.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Browser backend node id (`0` outside a browser).
    pub fn backend_node_id(&self) -> i64 {
        self.backend_node_id
    }
}

/// Context gathered around one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub placeholder: String,
    pub nearby_text: String,
}

/// Page context gathered once per pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub title: String,
    pub meta_description: String,
    pub headings: String,
    pub fields: Vec<FieldHandle>,
    pub field_contexts: Vec<FieldContext>,
    /// Document the snapshot was extracted from.
    #[serde(skip)]
    pub document: Arc<DomTree>,
}

impl PageSnapshot {
    /// Number of fillable fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// True when the page has no fillable field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Orchestrator pass state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PassState {
    Idle,
    ContextBuilt,
    Filling { index: usize },
    Done,
}

/// Counts reported at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassSummary {
    pub filled: usize,
    pub errors: usize,
    pub total: usize,
}
