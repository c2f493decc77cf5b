//! Page context extraction.

use std::sync::Arc;

use tracing::debug;

use pagefill_protocols::{DomTree, FieldContext, FieldHandle, NodeId, PageSnapshot};

/// Maximum length, in characters, of a field's nearby text.
pub const MAX_NEARBY_TEXT_CHARS: usize = 300;

const SEPARATOR: &str = " | ";
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3"];
const CONTAINER_TAGS: &[&str] = &["div", "form", "section"];
const CONTEXT_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "label", "div"];

/// Builds a [`PageSnapshot`] from a document.
pub struct PageContextExtractor;

impl PageContextExtractor {
    /// Scan `document` for fillable fields and gather page context.
    ///
    /// Read-only and idempotent: the same document always yields the same snapshot.
    pub fn extract(document: impl Into<Arc<DomTree>>) -> PageSnapshot {
        let document = document.into();

        let title = document.title();
        let meta_description = document
            .meta_content("description")
            .unwrap_or_default()
            .to_string();
        let headings = document
            .elements_by_tag(HEADING_TAGS)
            .into_iter()
            .map(|heading| document.text_content(heading).trim().to_string())
            .collect::<Vec<_>>()
            .join(SEPARATOR);

        let nodes = Self::fields(&document);
        let mut fields = Vec::with_capacity(nodes.len());
        let mut field_contexts = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.into_iter().enumerate() {
            let attr = |name: &str| document.attribute(node, name).unwrap_or_default().to_string();
            fields.push(FieldHandle::new(index, node, document.node(node).backend_node_id));
            field_contexts.push(FieldContext {
                index,
                id: attr("id"),
                name: attr("name"),
                placeholder: attr("placeholder"),
                nearby_text: Self::nearby_text(&document, node),
            });
        }

        debug!(
            "Extracted page context: title={:?}, fields={}",
            title,
            fields.len()
        );

        PageSnapshot {
            title,
            meta_description,
            headings,
            fields,
            field_contexts,
            document,
        }
    }

    /// Fillable fields in document order.
    pub fn fields(document: &DomTree) -> Vec<NodeId> {
        document
            .elements_by_tag(&["input", "textarea"])
            .into_iter()
            .filter(|node| Self::is_fillable(document, *node))
            .collect()
    }

    /// Text areas and single-line text inputs (`type` absent, empty or `text`).
    pub fn is_fillable(document: &DomTree, node: NodeId) -> bool {
        match document.tag(node) {
            Some("textarea") => true,
            Some("input") => document
                .attribute(node, "type")
                .map(str::trim)
                .is_none_or(|kind| kind.is_empty() || kind.eq_ignore_ascii_case("text")),
            _ => false,
        }
    }

    /// Text around a field: context elements inside its nearest block container.
    fn nearby_text(document: &DomTree, field: NodeId) -> String {
        let Some(container) = document
            .closest(field, CONTAINER_TAGS)
            .or_else(|| document.parent_element(field))
        else {
            return String::new();
        };

        document
            .descendant_elements(container, CONTEXT_TAGS)
            .into_iter()
            .map(|element| document.text_content(element).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
            .chars()
            .take(MAX_NEARBY_TEXT_CHARS)
            .collect()
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
