//! Core session struct and CDP command dispatch.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cdp::client::Connection;
use crate::cdp::error::CdpError;

/// A session attached to a single page target.
pub struct PageSession {
    target_id: String,
    url: String,
    session_id: String,
    /// Browser connection shared with the client.
    connection: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        url: String,
        session_id: String,
        connection: Arc<Connection>,
    ) -> Self {
        Self {
            target_id,
            url,
            session_id,
            connection,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// URL of the page when the session was attached.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.connection
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the domains the autofill pass uses.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}
