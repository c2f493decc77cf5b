//! JavaScript execution operations for CDP page session.

use serde_json::{Value, json};

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Call `function` with `this` bound to a remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, CdpError> {
        let arguments: Vec<Value> = args.into_iter().map(|v| json!({"value": v})).collect();
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": arguments,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Release a remote object.
    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }
}

fn check_exception(result: &Value) -> Result<(), CdpError> {
    match result.get("exceptionDetails") {
        Some(exception) => {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            Err(CdpError::JavaScript(text.to_string()))
        }
        None => Ok(()),
    }
}
