use std::collections::BTreeMap;

use super::*;
use pagesmith_protocols::context::{Cookie, SelectedElement, Viewport};
use pagesmith_protocols::RequestAction;

fn request(html: &str, action: RequestAction) -> LlmRequest {
    LlmRequest::new(
        "Make it blue",
        PageContext::new("https://example.com", "Example", html),
        action,
    )
}

#[test]
fn test_short_html_untouched() {
    let html = "<html><body>hi</body></html>";
    assert!(matches!(truncate_html(html, 100), Cow::Borrowed(s) if s == html));
}

#[test]
fn test_exact_limit_untouched() {
    let html = "a".repeat(100);
    assert_eq!(truncate_html(&html, 100), html.as_str());
}

#[test]
fn test_truncates_at_late_tag_boundary() {
    // '>' at char index 89, past 80% of 100.
    let html = format!("{}>{}", "a".repeat(89), "b".repeat(50));
    let out = truncate_html(&html, 100);
    let expected = format!("{}>{}", "a".repeat(89), TRUNCATION_MARKER);
    assert_eq!(out, expected.as_str());
}

#[test]
fn test_hard_cut_when_tag_boundary_too_early() {
    // '>' at char index 10, well before 80% of 100.
    let html = format!("{}>{}", "a".repeat(10), "b".repeat(200));
    let out = truncate_html(&html, 100);
    assert_eq!(out.chars().count(), 100 + TRUNCATION_MARKER.chars().count());
    assert!(out.ends_with(TRUNCATION_MARKER));
}

#[test]
fn test_hard_cut_without_any_tag() {
    let html = "x".repeat(300);
    let out = truncate_html(&html, 100);
    assert_eq!(out, format!("{}{}", "x".repeat(100), TRUNCATION_MARKER).as_str());
}

#[test]
fn test_truncated_length_bounded_by_cap_plus_marker() {
    let html = "<div>".repeat(20_000);
    let out = truncate_html(&html, HTML_TRUNCATION_LIMIT);
    assert!(out.chars().count() <= HTML_TRUNCATION_LIMIT + TRUNCATION_MARKER.chars().count());
    let body = out.trim_end_matches(TRUNCATION_MARKER);
    assert!(body.ends_with('>'));
}

#[test]
fn test_truncate_multibyte_safe() {
    let html = "é".repeat(120);
    let out = truncate_html(&html, 100);
    assert!(out.starts_with(&"é".repeat(100)));
}

#[test]
fn test_prompt_sections_in_order() {
    let prompt = build_prompt(&request("<p>x</p>", RequestAction::Modify));
    let preamble = prompt.find("web development assistant").unwrap();
    let url = prompt.find("- URL: https://example.com").unwrap();
    let instruction = prompt.find("Please modify the webpage").unwrap();
    let user = prompt.find("User request: Make it blue").unwrap();
    let html = prompt.find("HTML content:\n<p>x</p>").unwrap();
    assert!(preamble < url && url < instruction && instruction < user && user < html);
}

#[test]
fn test_prompt_empty_context_says_none() {
    let prompt = build_prompt(&request("", RequestAction::Explain));
    assert!(prompt.contains("- Selected text: None"));
    assert!(prompt.contains("- Selected element: None"));
    assert!(prompt.contains("- Cookies: None"));
    assert!(prompt.contains("- Viewport: Unknown"));
    assert!(prompt.contains("Please explain the selected text"));
}

#[test]
fn test_prompt_context_counts() {
    let mut req = request("", RequestAction::Analyze);
    req.context.selected_text = Some("hello".to_string());
    req.context.selected_element = Some(SelectedElement {
        tag_name: "P".to_string(),
        ..Default::default()
    });
    req.context.cookies = Some(vec![Cookie::default(), Cookie::default()]);
    req.context.local_storage = Some(BTreeMap::from([("k".to_string(), "v".to_string())]));
    req.context.viewport = Some(Viewport { width: 1280, height: 720 });

    let prompt = build_prompt(&req);
    assert!(prompt.contains("- Selected text: hello"));
    assert!(prompt.contains("\"tagName\":\"P\""));
    assert!(prompt.contains("- Cookies: 2 cookies found"));
    assert!(prompt.contains("- Local Storage: 1 items"));
    assert!(prompt.contains("- Viewport: 1280x720"));
    assert!(prompt.contains("Please analyze the webpage structure"));
}

#[test]
fn test_prompt_embeds_truncated_html() {
    let html = "y".repeat(HTML_TRUNCATION_LIMIT + 10);
    let prompt = build_prompt(&request(&html, RequestAction::Modify));
    assert!(prompt.ends_with(TRUNCATION_MARKER));
    assert!(!prompt.contains(&"y".repeat(HTML_TRUNCATION_LIMIT + 1)));
}
