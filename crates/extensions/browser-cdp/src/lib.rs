//! Live page driver over the Chrome DevTools Protocol.
//!
//! [`CdpClient`] connects to a browser started with
//! `--remote-debugging-port`, [`CdpClient::attach_page`] opens a
//! [`PageSession`] on one tab and [`CdpPage`] exposes that session through
//! the page traits used by the extractor and the applier.

mod client;
mod error;
mod page;
mod protocol;
mod scripts;
mod session;

pub use client::{CdpClient, DEFAULT_ENDPOINT};
pub use error::CdpError;
pub use page::CdpPage;
pub use protocol::{BrowserVersion, PageInfo, RemoteObject};
pub use session::PageSession;

#[cfg(test)]
mod fake_browser;
