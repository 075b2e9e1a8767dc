//! Request subcommands: drive the active browser tab.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use pagesmith_browser_cdp::{CdpClient, CdpError, CdpPage};
use pagesmith_config::{ConfigStore, ConfigWatcher};
use pagesmith_protocols::{Envelope, LlmResponse, PageDriver, RouterError};
use pagesmith_router::{
    AgentLauncher, ControlSurface, Coordinator, LocalTabs, Outcome, QuickAction, TabInfo,
};

/// Opens a DevTools session on the tab and serves it as a page driver.
struct CdpLauncher {
    client: CdpClient,
}

#[async_trait]
impl AgentLauncher for CdpLauncher {
    async fn launch(&self, tab: &TabInfo) -> Result<Arc<dyn PageDriver>, RouterError> {
        let session = self
            .client
            .attach_page(&tab.target)
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;
        let page: Arc<dyn PageDriver> = Arc::new(CdpPage::new(session));
        Ok(page)
    }
}

/// Browser endpoint and tab a request command drives.
pub(crate) struct Target {
    pub cdp: String,
    /// 1-based position in the browser's tab listing; the first tab if unset.
    pub tab: Option<i64>,
}

/// A connected control surface plus what keeps it alive.
struct Session {
    control: ControlSurface,
    _watcher: Option<ConfigWatcher>,
}

async fn connect(target: &Target, store: ConfigStore) -> Result<Session, Box<dyn std::error::Error>> {
    let initial = store.load()?;
    let (watcher, updates) = match ConfigWatcher::spawn(store.clone(), initial.clone()) {
        Ok((watcher, rx)) => (Some(watcher), Some(rx)),
        Err(e) => {
            warn!("Config changes will not be picked up: {}", e);
            (None, None)
        }
    };
    let coordinator = Coordinator::new(initial).spawn(updates);

    let client = CdpClient::connect(&target.cdp).await?;
    let pages = client.list_pages().await?;
    if pages.is_empty() {
        return Err(CdpError::NoPage.into());
    }
    info!("Connected to {} ({} tab(s))", client.endpoint(), pages.len());

    let tabs = Arc::new(LocalTabs::new(
        Arc::new(CdpLauncher { client }),
        coordinator.address.clone(),
    ));
    // Opened last is active, so the first listed tab wins.
    for (index, page) in pages.into_iter().enumerate().rev() {
        tabs.open(TabInfo {
            id: index as i64 + 1,
            target: page.id,
            url: page.url,
            title: page.title,
        });
    }
    if let Some(tab_id) = target.tab {
        tabs.activate(tab_id)?;
    }

    Ok(Session {
        control: ControlSurface::new(tabs, coordinator, store),
        _watcher: watcher,
    })
}

/// Send a free-form prompt.
pub(crate) async fn run_prompt(
    target: &Target,
    store: ConfigStore,
    prompt: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = connect(target, store).await?;
    let result = session.control.send_custom(prompt).await;
    finish(&session.control, result, json)
}

/// Run a quick action. The tab's current selection feeds `explain-text`.
pub(crate) async fn run_action(
    target: &Target,
    store: ConfigStore,
    action: QuickAction,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = connect(target, store).await?;
    if let Some(preview) = session.control.refresh_selection().await {
        println!("Selected: {}", preview);
    }
    let result = session.control.quick_action(action).await;
    finish(&session.control, result, json)
}

pub(crate) async fn test_connection(
    target: &Target,
    store: ConfigStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = connect(target, store).await?;
    let result = session.control.test_connection().await;
    print_status(&session.control);
    let response = result?;
    if let Some(content) = response.content {
        println!("{}", content);
    }
    Ok(())
}

/// Deliver one raw message to whichever role answers it.
pub(crate) async fn send_message(
    target: &Target,
    store: ConfigStore,
    json: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let envelope = Envelope::from_json(json)?;
    let session = connect(target, store).await?;
    let reply = session.control.relay(envelope).await?;
    println!("{}", serde_json::to_string_pretty(&reply.to_json())?);
    Ok(())
}

fn finish(
    control: &ControlSurface,
    result: Result<Outcome, RouterError>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            print_status(control);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.response)?);
        return Ok(());
    }
    print_response(&outcome.response, outcome.modifications);
    print_status(control);
    Ok(())
}

fn print_response(response: &LlmResponse, modifications: usize) {
    if modifications > 0 {
        println!("Applied {} modification(s)", modifications);
    } else if let Some(content) = &response.content {
        println!("{}", content);
    }
}

fn print_status(control: &ControlSurface) {
    if let Some(status) = control.status() {
        eprintln!("{}", status);
    }
}
