use super::*;
use crate::client::CdpClient;
use crate::fake_browser::{FakeBrowser, example_page};
use pagesmith_page::{ContextExtractor, ModificationApplier};
use pagesmith_protocols::{DomModification, ModificationAction};

async fn open() -> (FakeBrowser, CdpClient, CdpPage) {
    let browser = FakeBrowser::start(example_page()).await;
    let client = CdpClient::connect(&browser.endpoint()).await.unwrap();
    let session = client.attach_page("T1").await.unwrap();
    (browser, client, CdpPage::new(session))
}

#[tokio::test]
async fn test_basic_reads() {
    let (_browser, _client, page) = open().await;
    assert_eq!(page.url().await.unwrap(), "https://example.com/");
    assert_eq!(page.title().await.unwrap(), "Example");
    assert_eq!(page.user_agent().await.unwrap(), "FakeChrome/1.0");
    assert_eq!(page.viewport().await.unwrap(), Viewport { width: 800, height: 600 });
    assert_eq!(page.local_storage().await.unwrap()["theme"], "dark");
}

#[tokio::test]
async fn test_cookies_from_network_domain() {
    let (_browser, _client, page) = open().await;
    let cookies = page.cookies().await.unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "sid");
    assert!(cookies[0].http_only);
    assert_eq!(cookies[0].same_site.as_deref(), Some("Lax"));
}

#[tokio::test]
async fn test_script_exception_is_read_error() {
    let (_browser, _client, page) = open().await;
    let err = page.session_storage().await.unwrap_err();
    assert!(matches!(err, PageError::Read(ref m) if m.contains("SecurityError")));
}

#[tokio::test]
async fn test_capture_through_extractor() {
    let (_browser, _client, page) = open().await;
    let context = ContextExtractor::capture(&page).await;

    assert_eq!(context.url, "https://example.com/");
    assert_eq!(context.selected_text.as_deref(), Some("chosen"));
    assert_eq!(context.selected_element.unwrap().class_name, "lead");
    assert!(context.session_storage.is_none());
    assert_eq!(context.meta_tags.unwrap()["description"], "demo");
    assert_eq!(context.links.unwrap()[0].href, "/a");
    assert_eq!(context.page_metrics.unwrap().first_paint, Some(1.0));
}

#[tokio::test]
async fn test_query_all_returns_node_ids() {
    let (_browser, _client, page) = open().await;
    assert_eq!(page.query_all("body").await.unwrap(), vec![ElementId(5)]);
    assert!(page.query_all("#nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_all_invalid_selector() {
    let (_browser, _client, page) = open().await;
    let err = page.query_all("!!bad").await.unwrap_err();
    assert!(matches!(err, PageError::InvalidSelector(ref s) if s == "!!bad"));
}

#[tokio::test]
async fn test_style_through_applier() {
    let (browser, _client, page) = open().await;
    let modification =
        DomModification::new("body", ModificationAction::Style).with_style("color", "red");

    let report = ModificationApplier::apply(&page, &[modification]).await;
    assert_eq!(report.applied, 1);

    let call = &browser.params_of("Runtime.callFunctionOn")[0];
    assert_eq!(call["objectId"], "obj-5");
    assert!(call["functionDeclaration"].as_str().unwrap().contains("setProperty"));
    assert_eq!(call["arguments"][0]["value"], "color");
    assert_eq!(call["arguments"][1]["value"], "red");
}

#[tokio::test]
async fn test_append_reads_then_writes() {
    let (browser, _client, page) = open().await;
    let modification =
        DomModification::new("body", ModificationAction::Append).with_content(" world");

    ModificationApplier::apply(&page, &[modification]).await;

    let calls = browser.params_of("Runtime.callFunctionOn");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1]["arguments"][0]["value"], "Hello world");
}

#[tokio::test]
async fn test_remove_and_attribute_use_dom_domain() {
    let (browser, _client, page) = open().await;
    page.set_attribute(ElementId(5), "data-theme", "dark").await.unwrap();
    page.remove(ElementId(5)).await.unwrap();

    assert_eq!(browser.params_of("DOM.setAttributeValue")[0]["name"], "data-theme");
    assert_eq!(browser.params_of("DOM.removeNode")[0]["nodeId"], 5);
}

#[tokio::test]
async fn test_stale_node_is_element_not_found() {
    let (_browser, _client, page) = open().await;
    let err = page.remove(ElementId(99)).await.unwrap_err();
    assert!(matches!(err, PageError::ElementNotFound(99)));

    let err = page.set_inner_html(ElementId(99), "x").await.unwrap_err();
    assert!(matches!(err, PageError::ElementNotFound(99)));
}

#[tokio::test]
async fn test_install_styles_and_notify_evaluate_scripts() {
    let (browser, _client, page) = open().await;
    page.install_styles(".pagesmith-notice { opacity: 1; }").await.unwrap();
    page.notify("Page modified successfully!", NoticeKind::Success).await.unwrap();

    let scripts: Vec<String> = browser
        .params_of("Runtime.evaluate")
        .iter()
        .map(|p| p["expression"].as_str().unwrap().to_string())
        .collect();
    assert!(scripts.iter().any(|s| s.contains("pagesmith-styles")));
    assert!(scripts.iter().any(|s| s.contains("Page modified successfully!")));
}
