//! Page agent: the role attached to one tab.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pagesmith_page::{ContextExtractor, ModificationApplier};
use pagesmith_protocols::{
    Envelope, Message, NoticeKind, PageDriver, Reply, SelectionInfo,
};

use crate::mailbox::{mailbox, Address, Dispatch, Handler, Request};

/// Stylesheet installed into a tab when an agent is injected.
pub const AGENT_STYLESHEET: &str = r#".pagesmith-notice {
  pointer-events: none;
  transition: opacity 0.3s ease;
}
.pagesmith-highlight {
  outline: 2px solid #007bff;
  outline-offset: 2px;
}
"#;

/// Notice shown after a batch of modifications.
pub const MODIFIED_NOTICE: &str = "Page modified successfully!";

/// Serves page requests for one tab.
pub struct PageAgent {
    driver: Arc<dyn PageDriver>,
    tab_id: i64,
    coordinator: Option<Address>,
}

impl PageAgent {
    pub fn new(driver: Arc<dyn PageDriver>, tab_id: i64) -> Self {
        Self {
            driver,
            tab_id,
            coordinator: None,
        }
    }

    /// Announce selections to the coordinator.
    pub fn with_coordinator(mut self, coordinator: Address) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Run the agent on its own task and return its address.
    pub fn spawn(self) -> Address {
        let (address, mailbox) = mailbox(format!("page-agent:{}", self.tab_id));
        info!("Page agent started for tab {}", self.tab_id);
        tokio::spawn(mailbox.serve(self));
        address
    }
}

impl Handler for PageAgent {
    fn handle(&mut self, request: Request) -> Dispatch {
        let Request {
            envelope,
            responder,
        } = request;

        match envelope.message {
            Message::PageContext => {
                let driver = self.driver.clone();
                tokio::spawn(async move {
                    let context = ContextExtractor::capture(driver.as_ref()).await;
                    responder.send(Reply::Context(Box::new(context)));
                });
                Dispatch::Pending
            }
            Message::DomModify(modifications) => {
                let driver = self.driver.clone();
                tokio::spawn(async move {
                    let report = ModificationApplier::apply(driver.as_ref(), &modifications).await;
                    debug!("Applied {} of {} modifications", report.applied, report.total());
                    if let Err(e) = driver.notify(MODIFIED_NOTICE, NoticeKind::Success).await {
                        warn!("Failed to show notice: {}", e);
                    }
                    responder.send(Reply::Ack { success: true });
                });
                Dispatch::Pending
            }
            Message::GetSelection => {
                let driver = self.driver.clone();
                let coordinator = self.coordinator.clone();
                let tab_id = self.tab_id;
                tokio::spawn(async move {
                    let selection = match driver.selection().await {
                        Ok(selection) => selection,
                        Err(e) => {
                            warn!("Failed to read selection: {}", e);
                            None
                        }
                    };
                    let text = selection
                        .as_ref()
                        .map(|s| s.text.trim().to_string())
                        .unwrap_or_default();
                    if let (Some(coordinator), Some(selection)) = (coordinator, selection) {
                        if !text.is_empty() {
                            announce(&coordinator, tab_id, selection, &text).await;
                        }
                    }
                    responder.send(Reply::Selection { text });
                });
                Dispatch::Pending
            }
            other => {
                debug!("Page agent ignoring {}", other.type_name());
                responder.send(Reply::error(format!(
                    "Unknown message type: {}",
                    other.type_name()
                )));
                Dispatch::Done
            }
        }
    }
}

async fn announce(coordinator: &Address, tab_id: i64, selection: SelectionInfo, text: &str) {
    let selection = SelectionInfo {
        text: text.to_string(),
        element: selection.element,
    };
    let envelope = Envelope::for_tab(Message::SelectionMade(selection), tab_id);
    if let Err(e) = coordinator.post(envelope).await {
        warn!("Failed to announce selection: {}", e);
    }
}
