//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [git] Section Defaults
// ============================================================================

pub mod git {
    pub fn command() -> Vec<String> {
        vec!["git".into()]
    }

    pub fn timeout() -> u64 {
        30
    }
}

// ============================================================================
// [content] / [module] Section Defaults
// ============================================================================

pub mod content {
    pub fn dir() -> String {
        "src/content/blog".into()
    }
}

pub mod module {
    pub fn id() -> String {
        crate::data::DEFAULT_MODULE_ID.into()
    }
}

// ============================================================================
// [styles] Section Defaults
// ============================================================================

pub mod styles {
    pub fn import() -> String {
        "/src/styles/highlight.scss".into()
    }
}
