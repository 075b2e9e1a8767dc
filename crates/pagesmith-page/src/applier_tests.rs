use super::*;
use crate::memory::{MemoryElement, MemoryPage};

fn page() -> MemoryPage {
    MemoryPage::new("https://example.com", "Example", "").with_elements(vec![
        MemoryElement::new("body"),
        MemoryElement::new("h1").with_id("title").with_html("Old"),
        MemoryElement::new("p").with_class("note").with_html("one"),
        MemoryElement::new("p").with_class("note").with_html("two"),
        MemoryElement::new("div").with_id("ad"),
    ])
}

#[tokio::test]
async fn test_body_color_red() {
    let page = page();
    let modification = DomModification::new("body", ModificationAction::Style).with_style("color", "red");

    let report = ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(report.applied, 1);
    assert_eq!(page.element(0).unwrap().styles["color"], "red");
}

#[tokio::test]
async fn test_zero_matches_skipped_without_side_effects() {
    let page = page();
    let before = page.elements.lock().clone();
    let modification =
        DomModification::new("#missing", ModificationAction::Replace).with_content("x");

    let report = ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(report, ApplyReport { applied: 0, skipped: 1, failed: 0 });
    assert_eq!(*page.elements.lock(), before);
}

#[tokio::test]
async fn test_matching_and_non_matching_in_one_batch() {
    let page = page();
    let batch = vec![
        DomModification::new("#nothing-here", ModificationAction::Remove),
        DomModification::new("#title", ModificationAction::Replace).with_content("New"),
    ];

    let report = ModificationApplier::apply(&page, &batch).await;
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(page.element(1).unwrap().inner_html, "New");
    assert!(page.elements.lock().iter().all(|el| !el.removed));
}

#[tokio::test]
async fn test_every_match_mutated() {
    let page = page();
    let modification = DomModification::new(".note", ModificationAction::Append).with_content("!");

    ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(page.element(2).unwrap().inner_html, "one!");
    assert_eq!(page.element(3).unwrap().inner_html, "two!");
}

#[tokio::test]
async fn test_prepend() {
    let page = page();
    let modification = DomModification::new("h1", ModificationAction::Prepend).with_content(">> ");

    ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(page.element(1).unwrap().inner_html, ">> Old");
}

#[tokio::test]
async fn test_replace_without_content_is_noop() {
    let page = page();
    let modification = DomModification::new("h1", ModificationAction::Replace);

    let report = ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(report.applied, 1);
    assert_eq!(page.element(1).unwrap().inner_html, "Old");
}

#[tokio::test]
async fn test_remove() {
    let page = page();
    let modification = DomModification::new("#ad", ModificationAction::Remove);

    ModificationApplier::apply(&page, &[modification]).await;
    assert!(page.element(4).unwrap().removed);
}

#[tokio::test]
async fn test_style_sets_attributes_too() {
    let page = page();
    let modification = DomModification::new("h1", ModificationAction::Style)
        .with_style("font-size", "3em")
        .with_attribute("data-theme", "dark");

    ModificationApplier::apply(&page, &[modification]).await;
    let h1 = page.element(1).unwrap();
    assert_eq!(h1.styles["font-size"], "3em");
    assert_eq!(h1.attributes["data-theme"], "dark");
}

#[tokio::test]
async fn test_style_merges_with_existing() {
    let page = page();
    let first = DomModification::new("body", ModificationAction::Style).with_style("color", "red");
    let second =
        DomModification::new("body", ModificationAction::Style).with_style("background", "black");

    ModificationApplier::apply(&page, &[first, second]).await;
    let body = page.element(0).unwrap();
    assert_eq!(body.styles.len(), 2);
    assert_eq!(body.styles["color"], "red");
}

#[tokio::test]
async fn test_invalid_selector_does_not_stop_batch() {
    let page = page();
    let batch = vec![
        DomModification::new("!!bad", ModificationAction::Remove),
        DomModification::new("body", ModificationAction::Style).with_style("color", "red"),
    ];

    let report = ModificationApplier::apply(&page, &batch).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.applied, 1);
    assert_eq!(report.total(), 2);
    assert_eq!(page.element(0).unwrap().styles["color"], "red");
}

#[tokio::test]
async fn test_empty_batch() {
    let report = ModificationApplier::apply(&page(), &[]).await;
    assert_eq!(report, ApplyReport::default());
}
