//! # PageFill Config
//!
//! Configuration management for PageFill.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
