//! [`Page`] backed by a CDP page session.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use pagefill_protocols::{DomTree, FieldHandle, Page, PageError};

use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::convert::dom_tree_from_cdp;

const READ_VALUE_FUNCTION: &str = "function() { return this.value ?? ''; }";

const FILL_FUNCTION: &str = "function(value) {
    this.value = value;
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}";

/// A live browser tab.
pub struct CdpPage {
    session: PageSession,
    /// Owns the browser connection the session runs on.
    _client: CdpClient,
}

impl CdpPage {
    /// Connect to the browser at `endpoint` and attach to the first tab whose
    /// URL or title contains `target` (any tab when `None`).
    pub async fn attach(endpoint: &str, target: Option<&str>) -> Result<Self, CdpError> {
        let client = CdpClient::connect(endpoint).await?;
        let session = client.attach_matching(target).await?;
        info!("Attached to {}", session.url());
        Ok(Self {
            session,
            _client: client,
        })
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Run `function` on the element behind `field`.
    async fn call_on_field(
        &self,
        field: &FieldHandle,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, CdpError> {
        if field.backend_node_id() == 0 {
            return Err(CdpError::ElementNotFound(format!(
                "field {} has no browser node",
                field.index()
            )));
        }
        let object = self.session.resolve_backend_node(field.backend_node_id()).await?;
        let object_id = object.object_id.ok_or_else(|| {
            CdpError::ElementNotFound(format!("backend node {}", field.backend_node_id()))
        })?;

        let result = self.session.call_function_on(&object_id, function, args).await;
        if let Err(e) = self.session.release_object(&object_id).await {
            debug!("Failed to release {}: {}", object_id, e);
        }
        result
    }
}

#[async_trait]
impl Page for CdpPage {
    async fn document(&self) -> Result<DomTree, PageError> {
        let root = self.session.get_document().await?;
        Ok(dom_tree_from_cdp(&root))
    }

    async fn read_value(&self, field: &FieldHandle) -> Result<String, PageError> {
        let value = self.call_on_field(field, READ_VALUE_FUNCTION, Vec::new()).await?;
        Ok(match value {
            Value::String(value) => value,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn fill(&self, field: &FieldHandle, value: &str) -> Result<(), PageError> {
        self.call_on_field(field, FILL_FUNCTION, vec![Value::String(value.to_string())])
            .await?;
        Ok(())
    }

    fn url(&self) -> Option<String> {
        Some(self.session.url().to_string())
    }
}
