//! Page access traits.
//!
//! [`PageSource`] is the read side used by the context extractor,
//! [`DomTarget`] the write side used by the modification applier. A live
//! browser tab implements both through [`PageDriver`].

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::context::{Cookie, PageMetrics, SelectionInfo, Viewport};
use crate::error::PageError;

/// Opaque handle to an element resolved in the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub i64);

/// Severity of a toast shown on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Read access to the current document and its browser state.
///
/// Every read is independent so a caller can keep going after one fails.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn url(&self) -> Result<String, PageError>;

    async fn title(&self) -> Result<String, PageError>;

    /// Serialized `document.documentElement`.
    async fn html(&self) -> Result<String, PageError>;

    /// Current selection, `None` when nothing is selected.
    async fn selection(&self) -> Result<Option<SelectionInfo>, PageError>;

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError>;

    async fn local_storage(&self) -> Result<BTreeMap<String, String>, PageError>;

    async fn session_storage(&self) -> Result<BTreeMap<String, String>, PageError>;

    async fn user_agent(&self) -> Result<String, PageError>;

    async fn viewport(&self) -> Result<Viewport, PageError>;

    async fn metrics(&self) -> Result<PageMetrics, PageError>;
}

/// Mutation access to the current document.
#[async_trait]
pub trait DomTarget: Send + Sync {
    /// All elements matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementId>, PageError>;

    async fn inner_html(&self, element: ElementId) -> Result<String, PageError>;

    async fn set_inner_html(&self, element: ElementId, html: &str) -> Result<(), PageError>;

    async fn remove(&self, element: ElementId) -> Result<(), PageError>;

    /// Set one inline style property, leaving the others intact.
    async fn set_style(&self, element: ElementId, property: &str, value: &str)
        -> Result<(), PageError>;

    async fn set_attribute(&self, element: ElementId, name: &str, value: &str)
        -> Result<(), PageError>;
}

/// A tab the page agent can attach to.
#[async_trait]
pub trait PageDriver: PageSource + DomTarget {
    /// Insert the agent's stylesheet into the document.
    async fn install_styles(&self, css: &str) -> Result<(), PageError>;

    /// Show a transient notice on the page.
    async fn notify(&self, message: &str, kind: NoticeKind) -> Result<(), PageError>;
}
