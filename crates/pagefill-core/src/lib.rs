//! # PageFill Core
//!
//! Page context extraction, label discovery, prompt composition and the
//! sequential autofill pass.

pub mod extractor;
pub mod label;
pub mod orchestrator;
pub mod prompt;

pub use extractor::PageContextExtractor;
pub use label::LabelResolver;
pub use orchestrator::AutofillOrchestrator;
pub use prompt::{FieldMetadata, PromptBuilder};
