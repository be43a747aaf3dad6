//! Generated data modules for the build pipeline.
//!
//! Exposes git-derived creation times as a virtual module that a bundler's
//! module loader can import by a well-known id.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  import { creationTimes } from 'virtual:creation-times'              │
//! │                                                                      │
//! │  resolve_id("virtual:creation-times") ──► "\0virtual:creation-times" │
//! │                                                  │                   │
//! │  provide("\0virtual:creation-times")  ◄──────────┘                   │
//! │     │                                                                │
//! │     ├─ fresh? ──► cached source text                                 │
//! │     └─ stale  ──► content_files ──► resolve ──► snapshot ──► render  │
//! │                                                                      │
//! │  ref change (watch) ──► invalidate() ──► next provide regenerates    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Ids
//!
//! | Id | Output |
//! |----|--------|
//! | `virtual:creation-times` | `export const creationTimes = { ... };` |
//! | `virtual:creation-times.json` | JSON object, path → RFC 3339 |

mod inventory;
mod render;
mod virtual_module;

pub use render::ModuleFormat;
pub use virtual_module::{DEFAULT_MODULE_ID, ModuleProvider, VirtualModule};
