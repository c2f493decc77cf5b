//! Conversion of CDP DOM nodes into a [`DomTree`].

use pagefill_protocols::{DomTree, NodeSpec};

use crate::cdp::{DOCUMENT_NODE, DomNode, ELEMENT_NODE, TEXT_NODE};

/// Build a document tree from the root returned by `DOM.getDocument`.
///
/// Nested frame documents are not descended into; only the top document's
/// fields take part in a pass.
pub fn dom_tree_from_cdp(root: &DomNode) -> DomTree {
    let mut tree = DomTree::new();
    let top = tree.root();
    if root.node_type == DOCUMENT_NODE {
        tree.set_root_backend_id(root.backend_node_id);
        for child in root.children.iter().flatten() {
            tree.append(top, node_spec(child));
        }
    } else {
        tree.append(top, node_spec(root));
    }
    tree
}

fn node_spec(node: &DomNode) -> NodeSpec {
    let spec = match node.node_type {
        ELEMENT_NODE => {
            let tag = node
                .local_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(node.node_name.as_str());
            node.attributes
                .iter()
                .flatten()
                .collect::<Vec<_>>()
                .chunks(2)
                .fold(NodeSpec::element(tag), |spec, pair| match pair {
                    [name, value] => spec.attr(name.as_str(), value.as_str()),
                    _ => spec,
                })
        }
        TEXT_NODE => NodeSpec::text(node.node_value.clone().unwrap_or_default()),
        _ => NodeSpec::other(),
    };

    let children: Vec<NodeSpec> = match node.node_type {
        ELEMENT_NODE => node.children.iter().flatten().map(node_spec).collect(),
        _ => Vec::new(),
    };
    spec.backend_id(node.backend_node_id).children(children)
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
