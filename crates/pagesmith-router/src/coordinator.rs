//! Coordinator: the long-lived role that owns the LLM client.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use pagesmith_client::LlmClient;
use pagesmith_config::{ConfigPatch, LlmConfig};
use pagesmith_protocols::{LlmResponse, Message, Reply};

use crate::mailbox::{mailbox, Address, Dispatch, Handler, Mailbox, Request};

/// Error answered to `LLM_REQUEST` while no usable config is loaded.
pub const NOT_CONFIGURED: &str =
    "LLM service not configured. Please set up your API key in the extension popup.";

/// The coordinator's view of the LLM client.
///
/// Replaced wholesale on every config change; requests already in flight
/// keep the `Arc` they started with.
pub enum ClientState {
    Unconfigured,
    Ready(Arc<LlmClient>),
    /// A config was loaded but the client could not be built from it.
    Invalid(String),
}

impl ClientState {
    pub fn from_config(config: Option<LlmConfig>) -> Self {
        let Some(config) = config.filter(LlmConfig::is_complete) else {
            return Self::Unconfigured;
        };
        match LlmClient::new(config) {
            Ok(client) => Self::Ready(Arc::new(client)),
            Err(e) => {
                error!("Failed to build LLM client: {}", e);
                Self::Invalid(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Most recent selection announced by a page agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSelection {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub tab_id: Option<i64>,
}

/// Handle to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    pub address: Address,
    last_selection: watch::Receiver<Option<LastSelection>>,
}

impl CoordinatorHandle {
    pub fn last_selection(&self) -> Option<LastSelection> {
        self.last_selection.borrow().clone()
    }
}

pub struct Coordinator {
    client: ClientState,
    last_selection: watch::Sender<Option<LastSelection>>,
}

impl Coordinator {
    pub fn new(config: Option<LlmConfig>) -> Self {
        let (last_selection, _) = watch::channel(None);
        Self {
            client: ClientState::from_config(config),
            last_selection,
        }
    }

    pub fn client(&self) -> &ClientState {
        &self.client
    }

    /// Apply a reloaded config. A ready client is reconfigured in place of
    /// its snapshot so the connection pool survives.
    pub fn reconfigure(&mut self, config: Option<LlmConfig>) {
        self.client = match (&self.client, config.filter(LlmConfig::is_complete)) {
            (_, None) => ClientState::Unconfigured,
            (ClientState::Ready(current), Some(config)) => {
                let mut next = LlmClient::clone(current);
                match next.update_config(&ConfigPatch::from(&config)) {
                    Ok(()) => ClientState::Ready(Arc::new(next)),
                    Err(e) => {
                        error!("Failed to reconfigure LLM client: {}", e);
                        ClientState::Invalid(e.to_string())
                    }
                }
            }
            (_, config) => ClientState::from_config(config),
        };
        info!("Coordinator reconfigured (ready={})", self.client.is_ready());
    }

    /// Run on a new task. Config changes published on `updates` replace the
    /// client between requests.
    pub fn spawn(self, updates: Option<watch::Receiver<Option<LlmConfig>>>) -> CoordinatorHandle {
        let (address, mailbox) = mailbox("coordinator");
        let last_selection = self.last_selection.subscribe();
        tokio::spawn(self.run(mailbox, updates));
        CoordinatorHandle {
            address,
            last_selection,
        }
    }

    async fn run(
        mut self,
        mut mailbox: Mailbox,
        mut updates: Option<watch::Receiver<Option<LlmConfig>>>,
    ) {
        info!("Coordinator started (ready={})", self.client.is_ready());
        loop {
            tokio::select! {
                request = mailbox.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    let kind = request.envelope.message.type_name().to_string();
                    let dispatch = self.handle(request);
                    debug!("Coordinator handled {} ({:?})", kind, dispatch);
                }
                config = next_config(&mut updates) => {
                    info!("Config changed, reloading LLM client");
                    self.reconfigure(config);
                }
            }
        }
        debug!("Coordinator stopped");
    }

    fn record_selection(&self, text: String, tab_id: Option<i64>) {
        debug!("Selection recorded ({} chars, tab {:?})", text.len(), tab_id);
        self.last_selection.send_replace(Some(LastSelection {
            text,
            timestamp: Utc::now(),
            tab_id,
        }));
    }
}

/// Next published config. Never resolves once the publisher is gone.
async fn next_config(
    updates: &mut Option<watch::Receiver<Option<LlmConfig>>>,
) -> Option<LlmConfig> {
    if let Some(rx) = updates {
        if rx.changed().await.is_ok() {
            return rx.borrow_and_update().clone();
        }
        warn!("Config watcher stopped; keeping current client");
        *updates = None;
    }
    std::future::pending().await
}

impl Handler for Coordinator {
    fn handle(&mut self, request: Request) -> Dispatch {
        let Request {
            envelope,
            responder,
        } = request;

        match envelope.message {
            Message::Ping => {
                responder.send(Reply::Pong);
                Dispatch::Done
            }
            Message::LlmRequest(llm_request) => match &self.client {
                ClientState::Ready(client) => {
                    let client = client.clone();
                    tokio::spawn(async move {
                        let response = client.process_request(&llm_request).await;
                        info!("LLM request processed (success={})", response.success);
                        responder.send(Reply::Llm(response));
                    });
                    Dispatch::Pending
                }
                ClientState::Unconfigured => {
                    warn!("LLM request received but no config is loaded");
                    responder.send(Reply::Llm(LlmResponse::failure(NOT_CONFIGURED)));
                    Dispatch::Done
                }
                ClientState::Invalid(reason) => {
                    responder.send(Reply::Llm(LlmResponse::failure(reason.clone())));
                    Dispatch::Done
                }
            },
            Message::SelectionMade(selection) => {
                self.record_selection(selection.text, envelope.tab_id);
                responder.send(Reply::Ack { success: true });
                Dispatch::Done
            }
            other => {
                debug!("Unknown message type: {}", other.type_name());
                responder.send(Reply::error("Unknown message type"));
                Dispatch::Done
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
