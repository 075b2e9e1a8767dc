//! Control surface: the user-facing driver of the send-request flow.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use pagesmith_config::{ConfigStore, LlmConfig, ProviderKind};
use pagesmith_protocols::{
    Envelope, LlmRequest, LlmResponse, Message, MessageKind, PageContext, Reply, RequestAction,
    RouterError,
};

use crate::coordinator::CoordinatorHandle;
use crate::tabs::{TabHost, TabInfo};

/// Pause between injecting a page agent and asking it again.
pub const REINJECT_DELAY: Duration = Duration::from_millis(100);

/// Characters of a selection shown before it is elided.
pub const SELECTION_PREVIEW_CHARS: usize = 100;

/// Prompt sent by the connection test.
pub const CONNECTION_TEST_PROMPT: &str = "Say 'Hello, connection test successful!'";

/// Where a send-request interaction stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    Idle,
    ContextRequested,
    LlmDispatched,
    /// The model returned this many modifications and they are being applied.
    ModificationsPending(usize),
    Done,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Canned requests offered next to the free-form prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    ChangeColor,
    ExplainText,
    Summarize,
    Translate,
    AnalyzeForms,
    OptimizeSeo,
    ImproveAccessibility,
    AnalyzePerformance,
    TestConnection,
}

impl QuickAction {
    pub const ALL: [QuickAction; 9] = [
        Self::ChangeColor,
        Self::ExplainText,
        Self::Summarize,
        Self::Translate,
        Self::AnalyzeForms,
        Self::OptimizeSeo,
        Self::ImproveAccessibility,
        Self::AnalyzePerformance,
        Self::TestConnection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChangeColor => "change-color",
            Self::ExplainText => "explain-text",
            Self::Summarize => "summarize",
            Self::Translate => "translate",
            Self::AnalyzeForms => "analyze-forms",
            Self::OptimizeSeo => "optimize-seo",
            Self::ImproveAccessibility => "improve-accessibility",
            Self::AnalyzePerformance => "analyze-performance",
            Self::TestConnection => "test-connection",
        }
    }

    /// Prompt for this action. `None` for the connection test, which is not
    /// a prompt.
    pub fn prompt(&self, selected_text: Option<&str>) -> Option<String> {
        let prompt = match self {
            Self::ChangeColor => {
                "Change the color scheme of this webpage to a more modern and vibrant design"
            }
            Self::ExplainText => {
                return Some(match selected_text.filter(|t| !t.is_empty()) {
                    Some(text) => format!("Explain this selected text: \"{}\"", text),
                    None => "Explain the main content of this webpage".to_string(),
                });
            }
            Self::Summarize => "Provide a brief summary of this webpage",
            Self::Translate => "Translate the main content of this webpage to English",
            Self::AnalyzeForms => {
                "Analyze all forms on this webpage and suggest improvements for better user experience and functionality"
            }
            Self::OptimizeSeo => {
                "Analyze this webpage for SEO optimization opportunities and suggest improvements to meta tags, headings, and content structure"
            }
            Self::ImproveAccessibility => {
                "Analyze this webpage for accessibility issues and suggest improvements to make it more accessible for users with disabilities"
            }
            Self::AnalyzePerformance => {
                "Analyze this webpage for performance issues and suggest optimizations for faster loading and better user experience"
            }
            Self::TestConnection => return None,
        };
        Some(prompt.to_string())
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickAction {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| RouterError::UnknownAction(s.to_string()))
    }
}

/// Result of a completed interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: LlmResponse,
    /// Modifications handed to the page agent.
    pub modifications: usize,
}

/// Selection text as shown in the status area.
pub fn selection_preview(text: &str) -> String {
    match text.char_indices().nth(SELECTION_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub struct ControlSurface {
    tabs: Arc<dyn TabHost>,
    coordinator: CoordinatorHandle,
    store: ConfigStore,
    config: Option<LlmConfig>,
    selected_text: Option<String>,
    state: SendState,
    history: Vec<SendState>,
    status: Option<Status>,
}

impl ControlSurface {
    /// Create the surface, loading the stored config. An unreadable store
    /// is reported and treated as unconfigured.
    pub fn new(tabs: Arc<dyn TabHost>, coordinator: CoordinatorHandle, store: ConfigStore) -> Self {
        let config = match store.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config from {}: {}", store.path().display(), e);
                None
            }
        };
        Self {
            tabs,
            coordinator,
            store,
            config,
            selected_text: None,
            state: SendState::Idle,
            history: Vec::new(),
            status: None,
        }
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> &SendState {
        &self.state
    }

    /// States entered since the last interaction started.
    pub fn history(&self) -> &[SendState] {
        &self.history
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    fn transition(&mut self, state: SendState) {
        debug!("Send state: {:?} -> {:?}", self.state, state);
        self.history.push(state.clone());
        self.state = state;
    }

    fn show_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            StatusKind::Error => error!("{}", message),
            _ => info!("{}", message),
        }
        self.status = Some(Status { kind, message });
    }

    fn require_config(&mut self) -> Result<(), RouterError> {
        if self.config.as_ref().is_some_and(LlmConfig::is_complete) {
            return Ok(());
        }
        let err = RouterError::NotConfigured;
        self.show_status(StatusKind::Error, err.to_string());
        Err(err)
    }

    /// Ask the active tab for its selection and remember it.
    ///
    /// A tab without a page agent gets one injected first. If the agent still
    /// cannot answer, the last selection the tab announced is used.
    pub async fn refresh_selection(&mut self) -> Option<String> {
        let tab = match self.usable_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                debug!("No selection available: {}", e);
                return None;
            }
        };
        let envelope = Envelope::for_tab(Message::GetSelection, tab.id);
        let text = match self.ask_agent(&tab, envelope).await.and_then(Reply::into_selection) {
            Ok(text) => text,
            Err(e) => {
                debug!("Page agent gave no selection ({}), using last announced one", e);
                self.coordinator
                    .last_selection()
                    .filter(|last| last.tab_id == Some(tab.id))?
                    .text
            }
        };
        if text.is_empty() {
            return None;
        }
        let preview = selection_preview(&text);
        self.selected_text = Some(text);
        Some(preview)
    }

    /// Send a free-form prompt about the active tab.
    pub async fn send_custom(&mut self, prompt: &str) -> Result<Outcome, RouterError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            let err = RouterError::EmptyPrompt;
            self.show_status(StatusKind::Error, err.to_string());
            return Err(err);
        }
        self.require_config()?;
        self.send_request(prompt, RequestAction::Modify).await
    }

    pub async fn quick_action(&mut self, action: QuickAction) -> Result<Outcome, RouterError> {
        self.require_config()?;
        match action.prompt(self.selected_text.as_deref()) {
            Some(prompt) => self.send_request(&prompt, RequestAction::Modify).await,
            None => {
                let response = self.test_connection().await?;
                Ok(Outcome {
                    response,
                    modifications: 0,
                })
            }
        }
    }

    /// Run one request: capture context, ask the model, apply its edits.
    pub async fn send_request(
        &mut self,
        prompt: &str,
        action: RequestAction,
    ) -> Result<Outcome, RouterError> {
        self.history.clear();
        self.state = SendState::Idle;

        match self.run_request(prompt, action).await {
            Ok(outcome) => {
                self.transition(SendState::Done);
                self.show_status(StatusKind::Success, "Request processed successfully!");
                Ok(outcome)
            }
            Err(e) => {
                self.transition(SendState::Failed(e.to_string()));
                self.show_status(StatusKind::Error, format!("Error: {}", e));
                Err(e)
            }
        }
    }

    async fn run_request(
        &mut self,
        prompt: &str,
        action: RequestAction,
    ) -> Result<Outcome, RouterError> {
        let tab = self.usable_tab().await?;

        self.transition(SendState::ContextRequested);
        let context = self.request_context(&tab).await?;

        self.transition(SendState::LlmDispatched);
        let response = self.dispatch(&tab, prompt, context, action).await?;
        if !response.success {
            let message = response.error.unwrap_or_else(|| "Unknown error".to_string());
            return Err(RouterError::Remote(message));
        }

        let modifications = match response.pending_modifications() {
            Some(items) => {
                self.transition(SendState::ModificationsPending(items.len()));
                let envelope = Envelope::for_tab(Message::DomModify(items.to_vec()), tab.id);
                self.tabs.send_to_tab(tab.id, envelope).await?.into_ack()?;
                items.len()
            }
            None => 0,
        };

        Ok(Outcome {
            response,
            modifications,
        })
    }

    /// PING the coordinator, then run a fixed explain request end to end.
    pub async fn test_connection(&mut self) -> Result<LlmResponse, RouterError> {
        self.show_status(StatusKind::Info, "Testing connection...");

        match self.run_connection_test().await {
            Ok(response) => {
                self.show_status(StatusKind::Success, "Connection test successful!");
                Ok(response)
            }
            Err(e) => {
                self.show_status(StatusKind::Error, format!("Connection test failed: {}", e));
                Err(e)
            }
        }
    }

    async fn run_connection_test(&mut self) -> Result<LlmResponse, RouterError> {
        let pong = self.coordinator.address.send(Message::Ping.into()).await?;
        if !pong.is_pong() {
            warn!("Unexpected PING reply: {:?}", pong);
        }

        let tab = self.usable_tab().await?;
        let context = self.request_context(&tab).await?;
        let response = self
            .dispatch(&tab, CONNECTION_TEST_PROMPT, context, RequestAction::Explain)
            .await?;

        if response.success {
            Ok(response)
        } else {
            Err(RouterError::Remote(
                response.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    /// Validate and persist a new configuration.
    pub fn save_config(
        &mut self,
        provider: ProviderKind,
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Result<LlmConfig, RouterError> {
        let (api_key, model, base_url) = (api_key.trim(), model.trim(), base_url.trim());
        if api_key.is_empty() || model.is_empty() {
            let err = RouterError::IncompleteConfig;
            self.show_status(StatusKind::Error, err.to_string());
            return Err(err);
        }

        let config = LlmConfig::new(provider, api_key, model).with_base_url(base_url);
        if let Err(e) = self.store.save(&config) {
            let err = RouterError::SaveFailed(e.to_string());
            self.show_status(StatusKind::Error, err.to_string());
            return Err(err);
        }

        self.config = Some(config.clone());
        self.show_status(StatusKind::Success, "Configuration saved successfully!");
        Ok(config)
    }

    async fn usable_tab(&self) -> Result<TabInfo, RouterError> {
        let tab = self.tabs.active_tab().await?;
        if tab.is_restricted() {
            return Err(RouterError::RestrictedPage(tab.url));
        }
        Ok(tab)
    }

    /// Route a raw envelope to the role that answers its type. Page-agent
    /// messages go to the active tab; everything else to the coordinator.
    pub async fn relay(&self, envelope: Envelope) -> Result<Reply, RouterError> {
        if let Ok(json) = envelope.to_json() {
            debug!("Relaying {}", json);
        }
        match envelope.message.kind() {
            Some(MessageKind::PageContext | MessageKind::DomModify | MessageKind::GetSelection) => {
                let tab = self.usable_tab().await?;
                let envelope = Envelope::for_tab(envelope.message, tab.id);
                self.ask_agent(&tab, envelope).await
            }
            _ => self.coordinator.address.send(envelope).await,
        }
    }

    /// Send to the tab's page agent, injecting one once if none answers.
    async fn ask_agent(&self, tab: &TabInfo, envelope: Envelope) -> Result<Reply, RouterError> {
        match self.tabs.send_to_tab(tab.id, envelope.clone()).await {
            Err(RouterError::Unreachable(reason)) => {
                info!("Page agent not found ({}), injecting it", reason);
                self.tabs.inject(tab.id).await?;
                tokio::time::sleep(REINJECT_DELAY).await;
                self.tabs.send_to_tab(tab.id, envelope).await
            }
            other => other,
        }
    }

    async fn request_context(&self, tab: &TabInfo) -> Result<PageContext, RouterError> {
        let envelope = Envelope::for_tab(Message::PageContext, tab.id);
        self.ask_agent(tab, envelope).await?.into_context()
    }

    async fn dispatch(
        &self,
        tab: &TabInfo,
        prompt: &str,
        context: PageContext,
        action: RequestAction,
    ) -> Result<LlmResponse, RouterError> {
        let request = LlmRequest::new(prompt, context, action);
        let envelope = Envelope::for_tab(Message::LlmRequest(Box::new(request)), tab.id);
        self.coordinator.address.send(envelope).await?.into_llm()
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
