//! Host bridge errors.

use thiserror::Error;

use pagefill_protocols::{AutofillError, StorageError};

use crate::cdp::CdpError;

/// Reasons a host request ends before or during a pass.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("An autofill pass is already running on this page.")]
    PassInProgress,

    #[error("Cannot run on this page: {0}")]
    UnsupportedPage(String),

    #[error("Please enter and save your Gemini API key.")]
    MissingCredential,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Browser error: {0}")]
    Cdp(#[from] CdpError),

    #[error("Autofill failed: {0}")]
    Autofill(AutofillError),
}

impl From<AutofillError> for BridgeError {
    fn from(e: AutofillError) -> Self {
        match e {
            AutofillError::MissingCredential => BridgeError::MissingCredential,
            other => BridgeError::Autofill(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefill_protocols::PageError;

    #[test]
    fn test_missing_credential_collapses() {
        assert!(matches!(
            BridgeError::from(AutofillError::MissingCredential),
            BridgeError::MissingCredential
        ));
    }

    #[test]
    fn test_page_failure_wrapped() {
        let err = BridgeError::from(AutofillError::Page(PageError::Transport("closed".to_string())));
        assert!(matches!(err, BridgeError::Autofill(_)));
        assert!(err.to_string().starts_with("Autofill failed:"));
    }

    #[test]
    fn test_unsupported_page_display() {
        let err = BridgeError::UnsupportedPage("chrome://newtab/".to_string());
        assert_eq!(err.to_string(), "Cannot run on this page: chrome://newtab/");
    }
}
