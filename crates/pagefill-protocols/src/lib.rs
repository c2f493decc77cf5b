//! # PageFill Protocols
//!
//! Shared data types and seam traits for the PageFill autofill pipeline.
//! Contains no browser or network code.
//!
//! ## Core Traits
//!
//! - [`Page`] - Access to a live page document (read, value read-back, fill)
//! - [`TextGenerator`] - Remote text generation for a single prompt
//! - [`CredentialStore`] - Key-value storage holding the API credential

pub mod credential;
pub mod dom;
pub mod error;
pub mod event;
pub mod generator;
pub mod message;
pub mod page;
pub mod snapshot;

pub use credential::{CredentialStore, CREDENTIAL_KEY};
pub use dom::{DomTree, Node, NodeId, NodeKind, NodeSpec};
pub use error::{AutofillError, GenerationError, PageError, StorageError};
pub use event::AutofillEvent;
pub use generator::{GenerationResult, TextGenerator};
pub use message::{HostNotification, HostRequest, HostResponse, PageContextSummary, PageInfoResponse};
pub use page::Page;
pub use snapshot::{FieldContext, FieldHandle, PageSnapshot, PassState, PassSummary};
