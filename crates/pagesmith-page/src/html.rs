//! Structural analysis of captured page HTML.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use pagesmith_protocols::context::{
    truncate_chars, FormField, FormInfo, ImageInfo, LinkInfo, ScriptInfo, StylesheetInfo,
    INLINE_CONTENT_LIMIT,
};

/// Structural parts of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSummary {
    pub meta_tags: BTreeMap<String, String>,
    pub forms: Vec<FormInfo>,
    pub links: Vec<LinkInfo>,
    pub images: Vec<ImageInfo>,
    pub scripts: Vec<ScriptInfo>,
    pub stylesheets: Vec<StylesheetInfo>,
}

/// Parse `html` and collect meta tags, forms, links, images, scripts and
/// stylesheets in document order.
pub fn analyze_html(html: &str) -> DocumentSummary {
    let document = Html::parse_document(html);
    DocumentSummary {
        meta_tags: meta_tags(&document),
        forms: forms(&document),
        links: links(&document),
        images: images(&document),
        scripts: scripts(&document),
        stylesheets: stylesheets(&document),
    }
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            warn!("Bad selector {:?}: {:?}", css, e);
            Vec::new()
        }
    }
}

/// Attribute value, treating an empty value as absent.
fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn inline_text(element: &ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = truncate_chars(&text, INLINE_CONTENT_LIMIT);
    (!text.is_empty()).then(|| text.to_string())
}

fn meta_tags(document: &Html) -> BTreeMap<String, String> {
    select(document, "meta")
        .iter()
        .filter_map(|meta| {
            let name = attr(meta, "name")
                .or_else(|| attr(meta, "property"))
                .or_else(|| attr(meta, "http-equiv"))?;
            let content = attr(meta, "content")?;
            Some((name, content))
        })
        .collect()
}

fn forms(document: &Html) -> Vec<FormInfo> {
    let Ok(fields) = Selector::parse("input, textarea, select") else {
        return Vec::new();
    };
    select(document, "form")
        .iter()
        .map(|form| FormInfo {
            id: attr(form, "id"),
            class_name: attr(form, "class"),
            action: attr(form, "action"),
            method: attr(form, "method"),
            fields: form.select(&fields).map(|field| form_field(&field)).collect(),
        })
        .collect()
}

fn form_field(field: &ElementRef<'_>) -> FormField {
    let tag = field.value().name().to_ascii_lowercase();
    FormField {
        name: attr(field, "name"),
        field_type: attr(field, "type").or(Some(tag)),
        value: attr(field, "value"),
        placeholder: attr(field, "placeholder"),
        required: field.value().attr("required").is_some(),
    }
}

fn links(document: &Html) -> Vec<LinkInfo> {
    select(document, "a[href]")
        .iter()
        .map(|link| LinkInfo {
            href: link.value().attr("href").unwrap_or_default().to_string(),
            text: link.text().collect::<String>().trim().to_string(),
            target: attr(link, "target"),
            rel: attr(link, "rel"),
        })
        .collect()
}

fn images(document: &Html) -> Vec<ImageInfo> {
    select(document, "img")
        .iter()
        .map(|img| ImageInfo {
            src: img.value().attr("src").unwrap_or_default().to_string(),
            alt: attr(img, "alt"),
            width: attr(img, "width").and_then(|w| w.trim().parse().ok()),
            height: attr(img, "height").and_then(|h| h.trim().parse().ok()),
        })
        .collect()
}

fn scripts(document: &Html) -> Vec<ScriptInfo> {
    select(document, "script")
        .iter()
        .map(|script| {
            let src = attr(script, "src");
            let content = if src.is_some() {
                None
            } else {
                inline_text(script)
            };
            ScriptInfo {
                src,
                script_type: attr(script, "type"),
                content,
            }
        })
        .collect()
}

fn stylesheets(document: &Html) -> Vec<StylesheetInfo> {
    let linked = select(document, r#"link[rel="stylesheet"]"#)
        .into_iter()
        .map(|link| StylesheetInfo {
            href: attr(&link, "href"),
            media: attr(&link, "media"),
            content: None,
        });
    let inline = select(document, "style")
        .into_iter()
        .map(|style| StylesheetInfo {
            href: None,
            media: None,
            content: inline_text(&style),
        });
    linked.chain(inline).collect()
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
