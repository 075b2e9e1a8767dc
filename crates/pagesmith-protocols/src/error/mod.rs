//! Error types shared across Pagesmith crates.

mod page;
mod provider;
mod router;

pub use page::*;
pub use provider::*;
pub use router::*;
