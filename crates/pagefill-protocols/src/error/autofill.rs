//! Orchestrator errors.

use thiserror::Error;

use super::PageError;

/// Conditions that abort a pass before any field is processed.
#[derive(Debug, Error)]
pub enum AutofillError {
    #[error("Missing API credential")]
    MissingCredential,

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}
