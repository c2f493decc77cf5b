//! Messages exchanged between the host surface and the autofill core.

use serde::{Deserialize, Serialize};

use crate::snapshot::{PageSnapshot, PassSummary};

/// Host-to-core requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostRequest {
    /// Extract page context and report the number of fields.
    GetPageInfo,
    /// Run an autofill pass with the given credential.
    Autofill {
        #[serde(rename = "apiKey")]
        api_key: String,
    },
}

/// Core-to-host notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostNotification {
    ShowAlert { message: String },
}

/// Page context summary returned by `getPageInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContextSummary {
    pub page_title: String,
    pub input_count: usize,
}

/// Response to `getPageInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoResponse {
    pub success: bool,
    pub input_count: usize,
    pub page_context: PageContextSummary,
}

impl PageInfoResponse {
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        Self {
            success: true,
            input_count: snapshot.field_count(),
            page_context: PageContextSummary {
                page_title: snapshot.title.clone(),
                input_count: snapshot.field_count(),
            },
        }
    }

    /// Status line shown after a successful page check.
    pub fn status_message(&self) -> String {
        format!("Ready to autofill {} input fields on this page.", self.input_count)
    }
}

/// Core response to a [`HostRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostResponse {
    PageInfo(PageInfoResponse),
    Autofill(PassSummary),
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dom::DomTree;
    use crate::snapshot::{FieldContext, FieldHandle};

    #[test]
    fn test_request_deserialize() {
        let req: HostRequest = serde_json::from_str(r#"{"action": "getPageInfo"}"#).unwrap();
        assert_eq!(req, HostRequest::GetPageInfo);

        let req: HostRequest =
            serde_json::from_str(r#"{"action": "autofill", "apiKey": "KEY123"}"#).unwrap();
        assert_eq!(
            req,
            HostRequest::Autofill {
                api_key: "KEY123".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = serde_json::from_str::<HostRequest>(r#"{"action": "reload"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_info_from_snapshot() {
        let tree = DomTree::new();
        let snapshot = PageSnapshot {
            title: "Contact Us".to_string(),
            meta_description: String::new(),
            headings: String::new(),
            fields: vec![FieldHandle::new(0, tree.root(), 0)],
            field_contexts: vec![FieldContext::default()],
            document: Arc::new(tree),
        };

        let info = PageInfoResponse::from_snapshot(&snapshot);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["inputCount"], 1);
        assert_eq!(json["pageContext"]["pageTitle"], "Contact Us");
        assert_eq!(info.status_message(), "Ready to autofill 1 input fields on this page.");
    }

    #[test]
    fn test_response_untagged() {
        let response = HostResponse::Autofill(PassSummary {
            filled: 1,
            errors: 0,
            total: 1,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["filled"], 1);
    }
}
