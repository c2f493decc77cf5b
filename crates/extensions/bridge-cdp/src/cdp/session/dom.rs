//! DOM operations for CDP page session.

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{DomNode, RemoteObject};

use super::core::PageSession;

impl PageSession {
    /// Full document tree, piercing shadow roots and frames.
    pub async fn get_document(&self) -> Result<DomNode, CdpError> {
        let result = self
            .call(
                "DOM.getDocument",
                Some(json!({"depth": -1, "pierce": true})),
            )
            .await?;

        let root: DomNode = serde_json::from_value(result["root"].clone())?;
        Ok(root)
    }

    /// Resolve a backend node to a runtime object.
    ///
    /// Backend ids outlive `DOM.getDocument` node ids, so handles taken from a
    /// snapshot stay resolvable until the element is removed.
    pub async fn resolve_backend_node(&self, backend_node_id: i64) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "DOM.resolveNode",
                Some(json!({"backendNodeId": backend_node_id})),
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { message, .. } => {
                    CdpError::ElementNotFound(format!("backend node {}: {}", backend_node_id, message))
                }
                other => other,
            })?;

        let obj: RemoteObject = serde_json::from_value(result["object"].clone())?;
        Ok(obj)
    }
}
