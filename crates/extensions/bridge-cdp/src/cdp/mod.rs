//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium started with remote debugging:
//!
//! ```bash
//! chrome --remote-debugging-port=9222
//! ```
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let session = client.attach_matching(Some("example.com")).await?;
//! let root = session.get_document().await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
