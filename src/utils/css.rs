//! CSS utilities: highlight stylesheet injection for Markdown modules.
//!
//! Markdown pages compile to JS modules. When a page contains highlighted
//! code samples, the highlight theme stylesheet is imported at the top of the
//! module so the bundler ships it only with pages that need it.

/// Marker a compiled `.md` module contains for each highlighted block
/// (the HTML lives inside a JS string literal, hence the escaped quotes).
const MD_HIGHLIGHT_MARKER: &str = r#"<pre><code class=\"hljs\">"#;

/// Marker a compiled `.mdx` module contains (JSX props object).
const MDX_HIGHLIGHT_MARKER: &str = r#"class: "hljs""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkdownKind {
    Md,
    Mdx,
}

impl MarkdownKind {
    fn from_id(id: &str) -> Option<Self> {
        let path = id.split(['?', '#']).next().unwrap_or(id);
        if path.ends_with(".mdx") {
            Some(Self::Mdx)
        } else if path.ends_with(".md") {
            Some(Self::Md)
        } else {
            None
        }
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Md => MD_HIGHLIGHT_MARKER,
            Self::Mdx => MDX_HIGHLIGHT_MARKER,
        }
    }
}

/// Whether a compiled Markdown module contains highlighted code.
pub fn has_code_samples(id: &str, code: &str) -> bool {
    MarkdownKind::from_id(id).is_some_and(|kind| code.contains(kind.marker()))
}

/// Transform a compiled module, prepending `import '<stylesheet>';` when needed.
///
/// Returns `None` for ids that are not Markdown, so callers can leave those
/// modules untouched.
pub fn inject_styles(code: &str, id: &str, stylesheet: &str) -> Option<String> {
    MarkdownKind::from_id(id)?;

    if !has_code_samples(id, code) {
        return Some(code.to_owned());
    }
    Some(format!("import '{stylesheet}';\n{code}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "/src/styles/highlight.scss";

    #[test]
    fn test_non_markdown_is_skipped() {
        assert_eq!(inject_styles("code", "/src/pages/index.astro", SHEET), None);
        assert_eq!(inject_styles("code", "/src/readme.markdown", SHEET), None);
    }

    #[test]
    fn test_md_with_samples() {
        let code = r#"const html = "<pre><code class=\"hljs\">fn main() {}</code></pre>";"#;
        let out = inject_styles(code, "/src/content/blog/a.md", SHEET).unwrap();
        assert_eq!(out, format!("import '{SHEET}';\n{code}"));
    }

    #[test]
    fn test_mdx_with_samples() {
        let code = r#"_jsx("code", { class: "hljs", children: "x" })"#;
        let out = inject_styles(code, "/src/content/blog/a.mdx", SHEET).unwrap();
        assert!(out.starts_with("import '/src/styles/highlight.scss';\n"));
    }

    #[test]
    fn test_marker_must_match_kind() {
        // The .mdx marker in a .md module does not count, and vice versa.
        let mdx_code = r#"{ class: "hljs" }"#;
        assert_eq!(inject_styles(mdx_code, "a.md", SHEET).as_deref(), Some(mdx_code));

        let md_code = r#"<pre><code class=\"hljs\">"#;
        assert_eq!(inject_styles(md_code, "a.mdx", SHEET).as_deref(), Some(md_code));
    }

    #[test]
    fn test_query_suffix_in_id() {
        assert!(has_code_samples("a.mdx?astroPropagatedAssets", r#"class: "hljs""#));
    }
}
