//! Utility modules for gitstamp.

pub mod css;
pub mod exec;
pub mod git;
pub mod highlight;
pub mod log;
pub mod xml;
