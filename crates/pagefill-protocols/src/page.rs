//! Page access trait.

use async_trait::async_trait;

use crate::dom::DomTree;
use crate::error::PageError;
use crate::snapshot::FieldHandle;

/// A live page the autofill pass reads from and writes into.
#[async_trait]
pub trait Page: Send + Sync {
    /// Capture the current document.
    async fn document(&self) -> Result<DomTree, PageError>;

    /// Current value of a field as the page sees it.
    async fn read_value(&self, field: &FieldHandle) -> Result<String, PageError>;

    /// Assign `value` to a field and dispatch bubbling `input` and `change` events.
    async fn fill(&self, field: &FieldHandle, value: &str) -> Result<(), PageError>;

    /// URL of the page, if known.
    fn url(&self) -> Option<String> {
        None
    }
}
