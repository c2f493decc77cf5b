//! Read-only document tree captured from a page.
//!
//! [`DomTree`] is an arena of nodes in document order. It is produced once per
//! pass (from CDP `DOM.getDocument` in the browser bridge, or from
//! [`NodeSpec`] builders in tests) and never mutated afterwards; writes go
//! through the [`Page`](crate::Page) seam instead.

use serde::{Deserialize, Serialize};

/// Index of a node inside one [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// An element with a lowercase tag name and its attributes in source order.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A text node.
    Text(String),
    /// Comments, doctypes and anything else the pipeline ignores.
    Other,
}

/// A node in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Browser-side backend node id, `0` when the tree was not captured from a browser.
    pub backend_node_id: i64,
}

impl Node {
    /// Lowercase tag name if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Whether this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    /// Attribute value by case-insensitive name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// Declarative node description used to build trees.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    kind: NodeKind,
    backend_node_id: i64,
    children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// An element with the given tag (lowercased).
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.into().to_ascii_lowercase(),
                attributes: Vec::new(),
            },
            backend_node_id: 0,
            children: Vec::new(),
        }
    }

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            backend_node_id: 0,
            children: Vec::new(),
        }
    }

    /// A node the pipeline ignores (comment, doctype, ...).
    pub fn other() -> Self {
        Self {
            kind: NodeKind::Other,
            backend_node_id: 0,
            children: Vec::new(),
        }
    }

    /// Add an attribute. No effect on non-element specs.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeKind::Element { attributes, .. } = &mut self.kind {
            attributes.push((name.into(), value.into()));
        }
        self
    }

    /// Append a child spec.
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child specs.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(NodeSpec::text(text))
    }

    /// Set the browser backend node id.
    pub fn backend_id(mut self, backend_node_id: i64) -> Self {
        self.backend_node_id = backend_node_id;
        self
    }
}

/// Arena-backed document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// An empty document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                backend_node_id: 0,
            }],
        }
    }

    /// Build a document whose root has the given top-level children.
    pub fn from_specs(specs: impl IntoIterator<Item = NodeSpec>) -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        for spec in specs {
            tree.append(root, spec);
        }
        tree
    }

    /// Append a spec (recursively) under `parent` and return the new node.
    pub fn append(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: spec.kind,
            parent: Some(parent),
            children: Vec::new(),
            backend_node_id: spec.backend_node_id,
        });
        self.nodes[parent.0].children.push(id);
        for child in spec.children {
            self.append(id, child);
        }
        id
    }

    /// Set the backend id of the document root.
    pub fn set_root_backend_id(&mut self, backend_node_id: i64) {
        self.nodes[0].backend_node_id = backend_node_id;
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document has no content below the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Node lookup.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Node lookup for ids produced by this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a different tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Lowercase tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::tag)
    }

    /// Attribute value by case-insensitive name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|node| node.attribute(name))
    }

    /// Child nodes in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Parent node, including the document root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Parent if it is an element (the document root is not).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.node(*parent).is_element())
    }

    /// Element ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_element(id), move |current| {
            self.parent_element(*current)
        })
    }

    /// Nearest of `id` itself or its element ancestors whose tag is in `tags`.
    pub fn closest(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|candidate| self.tag(*candidate).is_some_and(|tag| tags.contains(&tag)))
    }

    /// All descendants of `id` in document (pre-) order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `id` whose tag is in `tags`, in document order.
    pub fn descendant_elements(&self, id: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.tag(*node).is_some_and(|tag| tags.contains(&tag)))
            .collect()
    }

    /// Every element in the document whose tag is in `tags`, in document order.
    pub fn elements_by_tag(&self, tags: &[&str]) -> Vec<NodeId> {
        self.descendant_elements(self.root(), tags)
    }

    /// Preceding element siblings, nearest first. Non-element siblings are skipped.
    pub fn previous_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings = self.parent(id).map(|parent| self.children(parent)).unwrap_or(&[]);
        let position = siblings.iter().position(|sibling| *sibling == id).unwrap_or(0);
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .filter(move |sibling| self.node(*sibling).is_element())
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(Node { kind: NodeKind::Text(text), .. }) = self.get(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.node(node).kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Document title: text of the first `title` element with whitespace collapsed.
    pub fn title(&self) -> String {
        self.elements_by_tag(&["title"])
            .first()
            .map(|title| {
                self.text_content(*title)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// `content` of the first `meta` element whose `name` equals `name`.
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.elements_by_tag(&["meta"])
            .into_iter()
            .find(|meta| self.attribute(*meta, "name") == Some(name))
            .and_then(|meta| self.attribute(meta, "content"))
    }

    /// Value a form control carries in the captured markup.
    ///
    /// Text areas hold their value as text content; inputs in the `value` attribute.
    pub fn form_value(&self, id: NodeId) -> String {
        match self.tag(id) {
            Some("textarea") => self.text_content(id),
            _ => self.attribute(id, "value").unwrap_or_default().to_string(),
        }
    }

    /// Node carrying the given browser backend id.
    pub fn find_by_backend_id(&self, backend_node_id: i64) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.backend_node_id == backend_node_id)
            .map(NodeId)
    }
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
