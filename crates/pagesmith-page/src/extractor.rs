//! Page context capture.

use tracing::{debug, warn};

use pagesmith_protocols::{PageContext, PageError, PageSource};

use crate::html::analyze_html;

/// Builds a [`PageContext`] from a live page.
pub struct ContextExtractor;

impl ContextExtractor {
    /// Capture a snapshot of the page.
    ///
    /// Every read is independent: a failing read is logged and leaves its
    /// field empty, it never aborts the capture.
    pub async fn capture<S: PageSource + ?Sized>(source: &S) -> PageContext {
        let (
            url,
            title,
            html,
            selection,
            cookies,
            local_storage,
            session_storage,
            user_agent,
            viewport,
            metrics,
        ) = futures::join!(
            source.url(),
            source.title(),
            source.html(),
            source.selection(),
            source.cookies(),
            source.local_storage(),
            source.session_storage(),
            source.user_agent(),
            source.viewport(),
            source.metrics(),
        );

        let mut context = PageContext::new(
            read("url", url).unwrap_or_default(),
            read("title", title).unwrap_or_default(),
            read("html", html).unwrap_or_default(),
        );

        if let Some(selection) = read("selection", selection).flatten() {
            let text = selection.text.trim();
            if !text.is_empty() {
                context.selected_text = Some(text.to_string());
            }
            context.selected_element = selection.element;
        }

        context.cookies = read("cookies", cookies);
        context.local_storage = read("local_storage", local_storage);
        context.session_storage = read("session_storage", session_storage);
        context.user_agent = read("user_agent", user_agent);
        context.viewport = read("viewport", viewport);
        context.page_metrics = read("metrics", metrics);

        let summary = analyze_html(&context.html);
        context.meta_tags = Some(summary.meta_tags);
        context.forms = Some(summary.forms);
        context.links = Some(summary.links);
        context.images = Some(summary.images);
        context.scripts = Some(summary.scripts);
        context.stylesheets = Some(summary.stylesheets);

        debug!(
            "Captured context for {} ({} bytes of HTML)",
            context.url,
            context.html.len()
        );
        context
    }
}

fn read<T>(field: &str, result: Result<T, PageError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to read {}: {}", field, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;
    use pagesmith_protocols::context::{SelectedElement, SelectionInfo};

    const HTML: &str = r#"<html><head><meta name="description" content="d"></head>
        <body><a href="/x">X</a><form><input name="q"></form></body></html>"#;

    #[tokio::test]
    async fn test_capture_full_context() {
        let page = MemoryPage::new("https://example.com", "Example", HTML);
        let context = ContextExtractor::capture(&page).await;

        assert_eq!(context.url, "https://example.com");
        assert_eq!(context.title, "Example");
        assert_eq!(context.meta_tags.unwrap()["description"], "d");
        assert_eq!(context.links.unwrap().len(), 1);
        assert_eq!(context.forms.unwrap()[0].fields.len(), 1);
        assert_eq!(context.viewport.unwrap().width, 1280);
        assert_eq!(context.cookies.unwrap().len(), 0);
        assert!(context.selected_text.is_none());
    }

    #[tokio::test]
    async fn test_failed_read_leaves_field_empty() {
        let page = MemoryPage::new("https://example.com", "Example", HTML);
        page.fail_read("cookies");
        page.fail_read("viewport");

        let context = ContextExtractor::capture(&page).await;
        assert!(context.cookies.is_none());
        assert!(context.viewport.is_none());
        assert!(context.local_storage.is_some());
        assert_eq!(context.links.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_html_read_still_captures() {
        let page = MemoryPage::new("https://example.com", "Example", HTML);
        page.fail_read("html");

        let context = ContextExtractor::capture(&page).await;
        assert_eq!(context.url, "https://example.com");
        assert!(context.html.is_empty());
        assert!(context.links.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selection_trimmed_with_element() {
        let page = MemoryPage::new("https://example.com", "Example", HTML);
        *page.selection.lock() = Some(SelectionInfo {
            text: "  picked words \n".to_string(),
            element: Some(SelectedElement {
                tag_name: "P".to_string(),
                ..Default::default()
            }),
        });

        let context = ContextExtractor::capture(&page).await;
        assert_eq!(context.selected_text.as_deref(), Some("picked words"));
        assert_eq!(context.selected_element.unwrap().tag_name, "P");
    }

    #[tokio::test]
    async fn test_blank_selection_ignored() {
        let page = MemoryPage::new("https://example.com", "Example", HTML);
        page.select_text("   ");
        let context = ContextExtractor::capture(&page).await;
        assert!(context.selected_text.is_none());
    }
}
