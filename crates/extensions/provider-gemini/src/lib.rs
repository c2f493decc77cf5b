//! # PageFill Provider - Gemini
//!
//! Google Gemini text generation with ordered model fallback.

mod client;
mod types;

pub use client::{DEFAULT_BASE_URL, ModelClient};
pub use types::*;
