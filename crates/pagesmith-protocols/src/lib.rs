//! # Pagesmith Protocols
//!
//! Shared data model and seams for Pagesmith. Contains only types and trait
//! definitions - the crates that do I/O implement them.
//!
//! ## Core Traits
//!
//! - [`ProviderStrategy`] - provider-specific request/response shape
//! - [`PageSource`] - best-effort reads of a live page
//! - [`DomTarget`] - selector resolution and element mutation
//! - [`PageDriver`] - everything a page agent needs from its tab

pub mod context;
pub mod error;
pub mod message;
pub mod modification;
pub mod page;
pub mod provider;
pub mod request;
pub mod response;

pub use context::{PageContext, SelectionInfo};
pub use error::{PageError, ProviderError, RouterError, RESTRICTED_PAGE_MESSAGE};
pub use message::{Envelope, Message, MessageKind, Reply, WireMessage};
pub use modification::{DomModification, ModificationAction};
pub use page::{DomTarget, ElementId, NoticeKind, PageDriver, PageSource};
pub use provider::{join_url, ProviderStrategy};
pub use request::{LlmRequest, RequestAction};
pub use response::{LlmResponse, ModelReply};
