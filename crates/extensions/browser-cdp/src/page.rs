//! Page traits over a DevTools session.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use pagesmith_protocols::context::{Cookie, PageMetrics, SelectionInfo, Viewport};
use pagesmith_protocols::{DomTarget, ElementId, NoticeKind, PageDriver, PageError, PageSource};

use crate::error::CdpError;
use crate::scripts;
use crate::session::PageSession;

/// A live tab. Element handles are DOM node ids of this session.
pub struct CdpPage {
    session: PageSession,
}

impl CdpPage {
    pub fn new(session: PageSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    async fn read<T: DeserializeOwned>(&self, expression: &str) -> Result<T, PageError> {
        let value = self
            .session
            .evaluate(expression)
            .await
            .map_err(CdpError::into_read)?;
        serde_json::from_value(value).map_err(|e| PageError::Read(e.to_string()))
    }

    async fn run(&self, expression: &str) -> Result<(), PageError> {
        self.session
            .evaluate(expression)
            .await
            .map(|_| ())
            .map_err(CdpError::into_mutation)
    }

    async fn call_on(
        &self,
        element: ElementId,
        function: &str,
        args: &[Value],
    ) -> Result<Value, PageError> {
        self.session
            .call_on_node(element.0, function, args)
            .await
            .map_err(|e| node_error(element, e))
    }
}

/// Map a failure on a specific node, recognising stale handles.
fn node_error(element: ElementId, error: CdpError) -> PageError {
    match error {
        CdpError::Protocol { ref message, .. } if message.contains("find node") => {
            PageError::ElementNotFound(element.0)
        }
        other => other.into_mutation(),
    }
}

#[async_trait]
impl PageSource for CdpPage {
    async fn url(&self) -> Result<String, PageError> {
        self.read(scripts::URL).await
    }

    async fn title(&self) -> Result<String, PageError> {
        self.read(scripts::TITLE).await
    }

    async fn html(&self) -> Result<String, PageError> {
        self.read(scripts::HTML).await
    }

    async fn selection(&self) -> Result<Option<SelectionInfo>, PageError> {
        self.read(scripts::SELECTION).await
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        let value = self.session.cookies().await.map_err(CdpError::into_read)?;
        serde_json::from_value(value).map_err(|e| PageError::Read(e.to_string()))
    }

    async fn local_storage(&self) -> Result<BTreeMap<String, String>, PageError> {
        self.read(&scripts::storage("localStorage")).await
    }

    async fn session_storage(&self) -> Result<BTreeMap<String, String>, PageError> {
        self.read(&scripts::storage("sessionStorage")).await
    }

    async fn user_agent(&self) -> Result<String, PageError> {
        self.read(scripts::USER_AGENT).await
    }

    async fn viewport(&self) -> Result<Viewport, PageError> {
        self.read(scripts::VIEWPORT).await
    }

    async fn metrics(&self) -> Result<PageMetrics, PageError> {
        self.read(scripts::METRICS).await
    }
}

#[async_trait]
impl DomTarget for CdpPage {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementId>, PageError> {
        let root = self
            .session
            .document_root()
            .await
            .map_err(CdpError::into_read)?;
        let nodes = self
            .session
            .query_selector_all(root, selector)
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => PageError::InvalidSelector(selector.to_string()),
                other => other.into_read(),
            })?;
        Ok(nodes.into_iter().map(ElementId).collect())
    }

    async fn inner_html(&self, element: ElementId) -> Result<String, PageError> {
        let value = self.call_on(element, scripts::GET_INNER_HTML, &[]).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn set_inner_html(&self, element: ElementId, html: &str) -> Result<(), PageError> {
        self.call_on(element, scripts::SET_INNER_HTML, &[json!(html)])
            .await
            .map(|_| ())
    }

    async fn remove(&self, element: ElementId) -> Result<(), PageError> {
        self.session
            .remove_node(element.0)
            .await
            .map_err(|e| node_error(element, e))
    }

    async fn set_style(
        &self,
        element: ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), PageError> {
        self.call_on(element, scripts::SET_STYLE, &[json!(property), json!(value)])
            .await
            .map(|_| ())
    }

    async fn set_attribute(
        &self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), PageError> {
        self.session
            .set_attribute_value(element.0, name, value)
            .await
            .map_err(|e| node_error(element, e))
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn install_styles(&self, css: &str) -> Result<(), PageError> {
        self.run(&scripts::install_styles(css)).await
    }

    async fn notify(&self, message: &str, kind: NoticeKind) -> Result<(), PageError> {
        self.run(&scripts::notice(message, kind)).await
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
