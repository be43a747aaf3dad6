//! HTML rewriting over a streaming XML reader.

mod common;
pub mod link;
mod processor;

pub use processor::rewrite_links;
