//! In-memory page for tests.
//!
//! Elements form a flat list matched by simple selectors: `tag`, `#id`,
//! `.class` and `*`. Selectors starting with `!` are rejected as invalid.
//! Reads named in [`MemoryPage::fail_read`] return an error.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use pagesmith_protocols::context::{Cookie, PageMetrics, SelectionInfo, Viewport};
use pagesmith_protocols::{DomTarget, ElementId, NoticeKind, PageDriver, PageError, PageSource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub inner_html: String,
    pub styles: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
    pub removed: bool,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    fn matches(&self, selector: &str) -> bool {
        if self.removed {
            return false;
        }
        if selector == "*" {
            return true;
        }
        if let Some(id) = selector.strip_prefix('#') {
            return self.id.as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.classes.iter().any(|c| c == class);
        }
        self.tag.eq_ignore_ascii_case(selector)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPage {
    pub url: String,
    pub title: String,
    pub html: String,
    pub selection: Mutex<Option<SelectionInfo>>,
    pub cookies: Vec<Cookie>,
    pub local_storage: BTreeMap<String, String>,
    pub elements: Mutex<Vec<MemoryElement>>,
    pub notices: Mutex<Vec<(String, NoticeKind)>>,
    pub installed_styles: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn with_elements(self, elements: Vec<MemoryElement>) -> Self {
        *self.elements.lock() = elements;
        self
    }

    pub fn select_text(&self, text: impl Into<String>) {
        *self.selection.lock() = Some(SelectionInfo {
            text: text.into(),
            element: None,
        });
    }

    /// Make the named read (`"cookies"`, `"viewport"`, ...) fail.
    pub fn fail_read(&self, name: &'static str) {
        self.failing.lock().insert(name);
    }

    /// Snapshot of the element at `index`.
    pub fn element(&self, index: usize) -> Option<MemoryElement> {
        self.elements.lock().get(index).cloned()
    }

    fn check(&self, name: &'static str) -> Result<(), PageError> {
        if self.failing.lock().contains(name) {
            return Err(PageError::Read(format!("{} unavailable", name)));
        }
        Ok(())
    }

    fn with_element<T>(
        &self,
        element: ElementId,
        f: impl FnOnce(&mut MemoryElement) -> T,
    ) -> Result<T, PageError> {
        let mut elements = self.elements.lock();
        let slot = usize::try_from(element.0)
            .ok()
            .and_then(|index| elements.get_mut(index))
            .filter(|el| !el.removed)
            .ok_or(PageError::ElementNotFound(element.0))?;
        Ok(f(slot))
    }
}

#[async_trait]
impl PageSource for MemoryPage {
    async fn url(&self) -> Result<String, PageError> {
        self.check("url")?;
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String, PageError> {
        self.check("title")?;
        Ok(self.title.clone())
    }

    async fn html(&self) -> Result<String, PageError> {
        self.check("html")?;
        Ok(self.html.clone())
    }

    async fn selection(&self) -> Result<Option<SelectionInfo>, PageError> {
        self.check("selection")?;
        Ok(self.selection.lock().clone())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        self.check("cookies")?;
        Ok(self.cookies.clone())
    }

    async fn local_storage(&self) -> Result<BTreeMap<String, String>, PageError> {
        self.check("local_storage")?;
        Ok(self.local_storage.clone())
    }

    async fn session_storage(&self) -> Result<BTreeMap<String, String>, PageError> {
        self.check("session_storage")?;
        Ok(BTreeMap::new())
    }

    async fn user_agent(&self) -> Result<String, PageError> {
        self.check("user_agent")?;
        Ok("pagesmith-test".to_string())
    }

    async fn viewport(&self) -> Result<Viewport, PageError> {
        self.check("viewport")?;
        Ok(Viewport {
            width: 1280,
            height: 720,
        })
    }

    async fn metrics(&self) -> Result<PageMetrics, PageError> {
        self.check("metrics")?;
        Ok(PageMetrics::default())
    }
}

#[async_trait]
impl DomTarget for MemoryPage {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementId>, PageError> {
        let selector = selector.trim();
        if selector.is_empty() || selector.starts_with('!') {
            return Err(PageError::InvalidSelector(selector.to_string()));
        }
        let elements = self.elements.lock();
        Ok(elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(selector))
            .map(|(index, _)| ElementId(index as i64))
            .collect())
    }

    async fn inner_html(&self, element: ElementId) -> Result<String, PageError> {
        self.with_element(element, |el| el.inner_html.clone())
    }

    async fn set_inner_html(&self, element: ElementId, html: &str) -> Result<(), PageError> {
        self.with_element(element, |el| el.inner_html = html.to_string())
    }

    async fn remove(&self, element: ElementId) -> Result<(), PageError> {
        self.with_element(element, |el| el.removed = true)
    }

    async fn set_style(
        &self,
        element: ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), PageError> {
        self.with_element(element, |el| {
            el.styles.insert(property.to_string(), value.to_string());
        })
    }

    async fn set_attribute(
        &self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), PageError> {
        self.with_element(element, |el| {
            el.attributes.insert(name.to_string(), value.to_string());
        })
    }
}

#[async_trait]
impl PageDriver for MemoryPage {
    async fn install_styles(&self, css: &str) -> Result<(), PageError> {
        self.installed_styles.lock().push(css.to_string());
        Ok(())
    }

    async fn notify(&self, message: &str, kind: NoticeKind) -> Result<(), PageError> {
        self.notices.lock().push((message.to_string(), kind));
        Ok(())
    }
}
