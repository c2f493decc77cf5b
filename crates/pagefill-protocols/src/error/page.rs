//! Page access errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Page transport error: {0}")]
    Transport(String),
}
