//! Prompt construction.

use std::borrow::Cow;
use std::fmt::Write as _;

use pagesmith_protocols::context::truncate_chars;
use pagesmith_protocols::{LlmRequest, PageContext};

/// Maximum characters of page HTML embedded in a prompt.
pub const HTML_TRUNCATION_LIMIT: usize = 50_000;

/// Appended to HTML that was cut short.
pub const TRUNCATION_MARKER: &str = "\n\n[HTML content truncated due to size]";

const PREAMBLE: &str = r#"You are a web development assistant that can modify web pages.
You will receive HTML content and user requests, and you should respond with specific DOM modifications in JSON format.

Available actions:
- modify: Change the webpage content or styling
- explain: Explain selected text or elements
- analyze: Analyze the webpage structure

Response format for modifications:
{
  "modifications": [
    {
      "selector": "CSS selector",
      "action": "replace|append|prepend|remove|style",
      "content": "new content (for replace/append/prepend)",
      "styles": {"property": "value"} (for style action),
      "attributes": {"attr": "value"} (for attribute changes)
    }
  ]
}"#;

/// Full prompt text sent as the single user message.
pub fn build_prompt(request: &LlmRequest) -> String {
    let html = truncate_html(&request.context.html, HTML_TRUNCATION_LIMIT);
    let mut prompt = String::with_capacity(PREAMBLE.len() + html.len() + 1024);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");
    write_context_summary(&mut prompt, &request.context);
    prompt.push_str("\n\n");
    prompt.push_str(request.action.instruction());
    let _ = write!(
        prompt,
        "\n\nUser request: {}\n\nHTML content:\n{}",
        request.prompt, html
    );
    prompt
}

fn write_context_summary(out: &mut String, context: &PageContext) {
    let selected_element = context
        .selected_element
        .as_ref()
        .and_then(|element| serde_json::to_string(element).ok());

    let _ = writeln!(out, "Current webpage context:");
    let _ = writeln!(out, "- URL: {}", context.url);
    let _ = writeln!(out, "- Title: {}", context.title);
    let _ = writeln!(out, "- Selected text: {}", context.selection().unwrap_or("None"));
    let _ = writeln!(
        out,
        "- Selected element: {}",
        selected_element.as_deref().unwrap_or("None")
    );
    let _ = writeln!(out, "- Cookies: {}", count(context.cookies.as_ref().map(Vec::len), "cookies found"));
    let _ = writeln!(
        out,
        "- Local Storage: {}",
        count(context.local_storage.as_ref().map(|m| m.len()), "items")
    );
    let _ = writeln!(out, "- Forms: {}", count(context.forms.as_ref().map(Vec::len), "forms found"));
    let _ = writeln!(out, "- Links: {}", count(context.links.as_ref().map(Vec::len), "links found"));
    let _ = writeln!(out, "- Images: {}", count(context.images.as_ref().map(Vec::len), "images found"));
    let _ = writeln!(
        out,
        "- Meta Tags: {}",
        count(context.meta_tags.as_ref().map(|m| m.len()), "meta tags")
    );
    let _ = write!(
        out,
        "- Viewport: {}",
        context
            .viewport
            .map(|v| format!("{}x{}", v.width, v.height))
            .unwrap_or_else(|| "Unknown".to_string())
    );
}

fn count(len: Option<usize>, noun: &str) -> String {
    match len {
        Some(n) => format!("{} {}", n, noun),
        None => "None".to_string(),
    }
}

/// Bound `html` to `max` characters.
///
/// When cut, the text ends at the last `>` inside the limit if that tag
/// boundary lies in the final 20% of it, and [`TRUNCATION_MARKER`] is added.
pub fn truncate_html(html: &str, max: usize) -> Cow<'_, str> {
    let cut = truncate_chars(html, max);
    if cut.len() == html.len() {
        return Cow::Borrowed(html);
    }

    let cut = match cut.rfind('>') {
        Some(idx) if cut[..idx].chars().count() * 5 > max * 4 => &cut[..=idx],
        _ => cut,
    };
    Cow::Owned(format!("{}{}", cut, TRUNCATION_MARKER))
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
