//! # Pagesmith Page
//!
//! What the page agent does inside a tab: capture a [`PageContext`] and
//! apply [`DomModification`]s. Both work against the
//! [`PageSource`]/[`DomTarget`] traits so the same code drives a CDP tab or
//! an in-memory page.
//!
//! [`PageContext`]: pagesmith_protocols::PageContext
//! [`DomModification`]: pagesmith_protocols::DomModification
//! [`PageSource`]: pagesmith_protocols::PageSource
//! [`DomTarget`]: pagesmith_protocols::DomTarget

mod applier;
mod extractor;
mod html;
#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use applier::{ApplyReport, ModificationApplier};
pub use extractor::ContextExtractor;
pub use html::{analyze_html, DocumentSummary};
