//! Page-side JavaScript snippets.

use pagesmith_protocols::NoticeKind;

/// Id of the `<style>` element holding the agent stylesheet.
pub(crate) const STYLE_ELEMENT_ID: &str = "pagesmith-styles";

/// How long a notice stays on the page.
pub(crate) const NOTICE_DURATION_MS: u32 = 3000;

pub(crate) const URL: &str = "location.href";

pub(crate) const TITLE: &str = "document.title";

pub(crate) const HTML: &str = "document.documentElement.outerHTML";

pub(crate) const USER_AGENT: &str = "navigator.userAgent";

pub(crate) const VIEWPORT: &str = "({ width: window.innerWidth, height: window.innerHeight })";

pub(crate) const SELECTION: &str = r#"(() => {
  const selection = window.getSelection();
  if (!selection) return null;
  const anchor = selection.anchorNode && selection.anchorNode.parentElement;
  const element = anchor ? {
    tagName: anchor.tagName,
    className: typeof anchor.className === "string" ? anchor.className : "",
    id: anchor.id,
    textContent: anchor.textContent || "",
    outerHTML: anchor.outerHTML,
  } : null;
  return { text: selection.toString(), element };
})()"#;

pub(crate) const METRICS: &str = r#"(() => {
  const metrics = { loadTime: performance.now(), domContentLoaded: 0 };
  const nav = performance.getEntriesByType("navigation")[0];
  if (nav) {
    metrics.domContentLoaded = nav.domContentLoadedEventEnd - nav.domContentLoadedEventStart;
    metrics.firstPaint = nav.loadEventEnd - nav.loadEventStart;
  }
  return metrics;
})()"#;

pub(crate) const GET_INNER_HTML: &str = "function() { return this.innerHTML; }";

pub(crate) const SET_INNER_HTML: &str = "function(html) { this.innerHTML = html; }";

pub(crate) const SET_STYLE: &str = "function(name, value) { this.style.setProperty(name, value); }";

/// Dump one of the Web Storage areas as a plain object.
pub(crate) fn storage(area: &str) -> String {
    format!(
        r#"(() => {{
  const out = {{}};
  for (let i = 0; i < {area}.length; i++) {{
    const key = {area}.key(i);
    out[key] = {area}.getItem(key);
  }}
  return out;
}})()"#
    )
}

/// Insert or replace the agent stylesheet.
pub(crate) fn install_styles(css: &str) -> String {
    format!(
        r#"(() => {{
  let style = document.getElementById({id});
  if (!style) {{
    style = document.createElement("style");
    style.id = {id};
    (document.head || document.documentElement).appendChild(style);
  }}
  style.textContent = {css};
}})()"#,
        id = js_string(STYLE_ELEMENT_ID),
        css = js_string(css),
    )
}

/// Show a toast at the top of the page.
pub(crate) fn notice(message: &str, kind: NoticeKind) -> String {
    let background = match kind {
        NoticeKind::Success => "#28a745",
        NoticeKind::Error => "#dc3545",
    };
    format!(
        r#"(() => {{
  const notice = document.createElement("div");
  notice.className = "pagesmith-notice pagesmith-notice-{kind}";
  notice.style.cssText = "position:fixed;top:20px;left:50%;transform:translateX(-50%);background:{background};color:white;padding:12px 20px;border-radius:4px;z-index:10003;font-family:Arial,sans-serif;font-size:14px;box-shadow:0 2px 10px rgba(0,0,0,0.3);";
  notice.textContent = {message};
  document.body.appendChild(notice);
  setTimeout(() => notice.remove(), {duration});
}})()"#,
        kind = kind.as_str(),
        message = js_string(message),
        duration = NOTICE_DURATION_MS,
    )
}

/// Quote `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    // JSON strings are valid JS literals apart from the two line separators.
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
