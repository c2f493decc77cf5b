//! Prompt composition.

use pagefill_protocols::FieldContext;

/// Longest value, in characters, included for any single field detail.
const MAX_DETAIL_CHARS: usize = 300;

/// Fixed instruction suffix appended to every prompt.
pub const INSTRUCTIONS: &str = "Based on this information, generate appropriate text to fill in this input field. \
Be concise, relevant, and match the expected format and tone. \
If it looks like a question or prompt requires a personal response, provide a generic but thoughtful answer that a user might give. \
If it seems like a form field (name, email, etc.), provide a generic placeholder instead.";

/// Field details gathered at fill time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMetadata {
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub label: String,
    pub existing_value: String,
}

pub struct PromptBuilder;

impl PromptBuilder {
    /// Compose the generation prompt for one field.
    pub fn build(page_title: &str, field: &FieldMetadata, context: &FieldContext) -> String {
        let details = [
            ("Name", &field.name),
            ("ID", &field.id),
            ("Placeholder", &field.placeholder),
            ("Label", &field.label),
            ("Current value", &field.existing_value),
        ];

        let mut prompt = format!("Page: \"{}\"\n\nInput field details:\n", bounded(page_title));
        for (name, value) in details {
            if !value.is_empty() {
                prompt.push_str(&format!("- {}: \"{}\"\n", name, bounded(value)));
            }
        }
        prompt.push_str(&format!(
            "\nContext around input:\n\"{}\"\n\n{}",
            context.nearby_text, INSTRUCTIONS
        ));
        prompt
    }
}

fn bounded(value: &str) -> String {
    value.chars().take(MAX_DETAIL_CHARS).collect()
}
