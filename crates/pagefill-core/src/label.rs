//! Field label discovery.

use pagefill_protocols::{DomTree, NodeId};

const SIBLING_LABEL_TAGS: &[&str] = &["label", "div", "span"];

/// Finds the most likely human-readable label of a field.
///
/// Explicit associations win over positional guesses; the first heuristic
/// that matches decides, even when the matched text is empty.
pub struct LabelResolver;

impl LabelResolver {
    /// Resolve the label of `field`. `current_value` is the field's live value,
    /// removed from a wrapping label's text so the input is not echoed back.
    pub fn resolve(document: &DomTree, field: NodeId, current_value: &str) -> String {
        Self::for_label(document, field)
            .or_else(|| Self::wrapping_label(document, field, current_value))
            .or_else(|| Self::preceding_sibling(document, field))
            .or_else(|| Self::aria_label(document, field))
            .unwrap_or_default()
    }

    /// `<label for="...">` matching the field id.
    fn for_label(document: &DomTree, field: NodeId) -> Option<String> {
        let id = document.attribute(field, "id").filter(|id| !id.is_empty())?;
        document
            .elements_by_tag(&["label"])
            .into_iter()
            .find(|label| document.attribute(*label, "for") == Some(id))
            .map(|label| document.text_content(label).trim().to_string())
    }

    fn wrapping_label(document: &DomTree, field: NodeId, current_value: &str) -> Option<String> {
        let label = document
            .ancestors(field)
            .find(|ancestor| document.tag(*ancestor) == Some("label"))?;
        let text = document.text_content(label);
        let text = text.trim();
        let text = if current_value.is_empty() {
            text.to_string()
        } else {
            text.replacen(current_value, "", 1)
        };
        Some(text.trim().to_string())
    }

    fn preceding_sibling(document: &DomTree, field: NodeId) -> Option<String> {
        document
            .previous_element_siblings(field)
            .find(|sibling| {
                document
                    .tag(*sibling)
                    .is_some_and(|tag| SIBLING_LABEL_TAGS.contains(&tag))
            })
            .map(|sibling| document.text_content(sibling).trim().to_string())
    }

    fn aria_label(document: &DomTree, field: NodeId) -> Option<String> {
        document
            .attribute(field, "aria-label")
            .filter(|label| !label.is_empty())
            .map(str::to_string)
    }
}
