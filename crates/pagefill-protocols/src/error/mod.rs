//! Error types for the PageFill protocol layer.

mod autofill;
mod generation;
mod page;
mod storage;

pub use autofill::*;
pub use generation::*;
pub use page::*;
pub use storage::*;
