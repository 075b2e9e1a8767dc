//! Session attached to a single tab.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::client::Transport;
use crate::error::CdpError;
use crate::protocol::RemoteObject;

pub struct PageSession {
    session_id: String,
    transport: Arc<Transport>,
}

impl PageSession {
    pub(crate) fn new(session_id: String, transport: Arc<Transport>) -> Self {
        Self {
            session_id,
            transport,
        }
    }

    /// Send a command scoped to this tab.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Evaluate an expression and return its value by value.
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
        unwrap_remote_value(result)
    }

    /// Call `function` with `this` bound to a remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
    ) -> Result<Value, CdpError> {
        let arguments: Vec<Value> = args.iter().map(|v| json!({ "value": v })).collect();
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
        unwrap_remote_value(result)
    }

    /// Node id of the document root.
    pub async fn document_root(&self) -> Result<i64, CdpError> {
        let result = self
            .call("DOM.getDocument", Some(json!({ "depth": 0 })))
            .await?;
        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("missing root nodeId".to_string()))
    }

    /// Node ids matching `selector` under `root`, in document order.
    pub async fn query_selector_all(&self, root: i64, selector: &str) -> Result<Vec<i64>, CdpError> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({ "nodeId": root, "selector": selector })),
            )
            .await?;
        let ids = result["nodeIds"]
            .as_array()
            .ok_or_else(|| CdpError::InvalidResponse("missing nodeIds".to_string()))?;
        Ok(ids.iter().filter_map(Value::as_i64).collect())
    }

    pub async fn resolve_node(&self, node_id: i64) -> Result<RemoteObject, CdpError> {
        let result = self
            .call("DOM.resolveNode", Some(json!({ "nodeId": node_id })))
            .await?;
        Ok(serde_json::from_value(result["object"].clone())?)
    }

    /// Resolve `node_id` and call `function` on it.
    pub async fn call_on_node(
        &self,
        node_id: i64,
        function: &str,
        args: &[Value],
    ) -> Result<Value, CdpError> {
        let object = self.resolve_node(node_id).await?;
        let object_id = object
            .object_id
            .ok_or_else(|| CdpError::InvalidResponse(format!("node {} has no object id", node_id)))?;
        self.call_function_on(&object_id, function, args).await
    }

    pub async fn remove_node(&self, node_id: i64) -> Result<(), CdpError> {
        self.call("DOM.removeNode", Some(json!({ "nodeId": node_id })))
            .await?;
        Ok(())
    }

    pub async fn set_attribute_value(
        &self,
        node_id: i64,
        name: &str,
        value: &str,
    ) -> Result<(), CdpError> {
        self.call(
            "DOM.setAttributeValue",
            Some(json!({ "nodeId": node_id, "name": name, "value": value })),
        )
        .await?;
        Ok(())
    }

    /// Cookies visible to the current page URL.
    pub async fn cookies(&self) -> Result<Value, CdpError> {
        let result = self.call("Network.getCookies", None).await?;
        Ok(result["cookies"].clone())
    }
}

/// Extract `result.value`, turning a thrown exception into an error.
fn unwrap_remote_value(result: Value) -> Result<Value, CdpError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let text = exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error");
        return Err(CdpError::JavaScript(text.to_string()));
    }
    Ok(result["result"]["value"].clone())
}
