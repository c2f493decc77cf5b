//! # PageFill Bridge - CDP
//!
//! Runs the autofill pipeline against a live Chromium tab over the Chrome
//! DevTools Protocol, with file-backed credential storage.

mod bridge;
pub mod cdp;
mod convert;
mod error;
mod page;
mod storage;

pub use bridge::{HostBridge, is_supported_url};
pub use convert::dom_tree_from_cdp;
pub use error::BridgeError;
pub use page::CdpPage;
pub use storage::{FileCredentialStore, MemoryCredentialStore};
