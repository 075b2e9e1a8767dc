//! # Pagesmith Router
//!
//! Typed message passing between the three Pagesmith roles:
//!
//! - [`Coordinator`] owns the LLM client and answers `PING`,
//!   `LLM_REQUEST` and `SELECTION_MADE`.
//! - [`PageAgent`] lives in a tab and answers `PAGE_CONTEXT`,
//!   `DOM_MODIFY` and `GET_SELECTION`.
//! - [`ControlSurface`] drives the send-request flow on behalf of the user.
//!
//! Each role runs as its own tokio task behind a [`Mailbox`]; callers hold an
//! [`Address`] and get exactly one [`Reply`](pagesmith_protocols::Reply)
//! per request.

mod agent;
mod control;
mod coordinator;
mod mailbox;
mod tabs;

pub use agent::{PageAgent, AGENT_STYLESHEET, MODIFIED_NOTICE};
pub use control::{
    selection_preview, ControlSurface, Outcome, QuickAction, SendState, Status, StatusKind,
    CONNECTION_TEST_PROMPT, REINJECT_DELAY, SELECTION_PREVIEW_CHARS,
};
pub use coordinator::{ClientState, Coordinator, CoordinatorHandle, LastSelection, NOT_CONFIGURED};
pub use mailbox::{mailbox, Address, Dispatch, Handler, Mailbox, Request, Responder};
pub use tabs::{AgentLauncher, LocalTabs, TabHost, TabInfo};
