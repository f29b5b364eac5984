//! File discovery and the per-file processing loop.

mod discovery;
mod processing;

pub use discovery::*;
pub use processing::*;
