//! Browser tabs as seen by the control surface.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use pagesmith_protocols::{Envelope, PageDriver, Reply, RouterError};

use crate::agent::{PageAgent, AGENT_STYLESHEET};
use crate::mailbox::Address;

/// A browser tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    /// Numeric id used in message envelopes.
    pub id: i64,
    /// Browser-side target identifier.
    pub target: String,
    pub url: String,
    pub title: String,
}

impl TabInfo {
    /// Browser-internal pages refuse page agents.
    pub fn is_restricted(&self) -> bool {
        self.url.starts_with("chrome://")
    }
}

/// Tab lookup, messaging and agent injection.
#[async_trait]
pub trait TabHost: Send + Sync {
    async fn active_tab(&self) -> Result<TabInfo, RouterError>;

    /// Deliver to the tab's page agent. Fails with
    /// [`RouterError::Unreachable`] when no agent is attached.
    async fn send_to_tab(&self, tab_id: i64, envelope: Envelope) -> Result<Reply, RouterError>;

    /// Attach a fresh page agent to the tab and install its stylesheet.
    async fn inject(&self, tab_id: i64) -> Result<(), RouterError>;
}

/// Opens a page driver for a tab.
#[async_trait]
pub trait AgentLauncher: Send + Sync {
    async fn launch(&self, tab: &TabInfo) -> Result<Arc<dyn PageDriver>, RouterError>;
}

struct TabSlot {
    info: TabInfo,
    agent: Option<Address>,
}

/// In-process tab registry that runs page agents as local tasks.
pub struct LocalTabs {
    tabs: Mutex<BTreeMap<i64, TabSlot>>,
    active: Mutex<Option<i64>>,
    launcher: Arc<dyn AgentLauncher>,
    coordinator: Address,
}

impl LocalTabs {
    pub fn new(launcher: Arc<dyn AgentLauncher>, coordinator: Address) -> Self {
        Self {
            tabs: Mutex::new(BTreeMap::new()),
            active: Mutex::new(None),
            launcher,
            coordinator,
        }
    }

    /// Register a tab without an agent and make it active.
    pub fn open(&self, info: TabInfo) {
        let id = info.id;
        debug!("Tab {} opened: {}", id, info.url);
        self.tabs.lock().insert(id, TabSlot { info, agent: None });
        *self.active.lock() = Some(id);
    }

    /// Make a registered tab the active one.
    pub fn activate(&self, tab_id: i64) -> Result<(), RouterError> {
        if !self.tabs.lock().contains_key(&tab_id) {
            return Err(RouterError::NoActiveTab);
        }
        *self.active.lock() = Some(tab_id);
        Ok(())
    }

    fn tab(&self, tab_id: i64) -> Result<TabInfo, RouterError> {
        self.tabs
            .lock()
            .get(&tab_id)
            .map(|slot| slot.info.clone())
            .ok_or(RouterError::NoActiveTab)
    }
}

#[async_trait]
impl TabHost for LocalTabs {
    async fn active_tab(&self) -> Result<TabInfo, RouterError> {
        let id = (*self.active.lock()).ok_or(RouterError::NoActiveTab)?;
        self.tab(id)
    }

    async fn send_to_tab(&self, tab_id: i64, envelope: Envelope) -> Result<Reply, RouterError> {
        let agent = self
            .tabs
            .lock()
            .get(&tab_id)
            .ok_or(RouterError::NoActiveTab)?
            .agent
            .clone()
            .filter(Address::is_open)
            .ok_or_else(|| RouterError::Unreachable(format!("tab {} has no page agent", tab_id)))?;
        agent.send(envelope).await
    }

    async fn inject(&self, tab_id: i64) -> Result<(), RouterError> {
        let info = self.tab(tab_id)?;
        let driver = self.launcher.launch(&info).await?;
        driver
            .install_styles(AGENT_STYLESHEET)
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;

        let agent = PageAgent::new(driver, tab_id)
            .with_coordinator(self.coordinator.clone())
            .spawn();
        if let Some(slot) = self.tabs.lock().get_mut(&tab_id) {
            slot.agent = Some(agent);
        }
        info!("Injected page agent into tab {} ({})", tab_id, info.url);
        Ok(())
    }
}
