//! Code block highlighting for Markdown sources.
//!
//! Every fenced block becomes `<pre><code class="hljs">...</code></pre>` with
//! class-based token spans (`hljs-*`). That wrapper is the marker
//! [`super::css`] looks for in compiled pages.
//!
//! | Fence info | Grammar |
//! |------------|---------|
//! | `rust`, `py`, `go`, ... | matching grammar |
//! | `vue`, `svelte` | HTML |
//! | `ts`, `tsx`, `jsx` | JavaScript |
//! | unknown | plain text, with a warning |
//! | (none) | detected from the first line, else plain text |

use crate::log;
use anyhow::{Context, Result};
use std::sync::OnceLock;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Map fence names the grammar set does not know by that token.
fn alias(lang: &str) -> &str {
    match lang {
        "vue" | "svelte" => "html",
        "plaintext" | "text" | "plain" => "txt",
        "shell" | "console" => "sh",
        "ts" | "typescript" | "tsx" | "jsx" | "mjs" => "js",
        _ => lang,
    }
}

fn find_syntax<'a>(set: &'a SyntaxSet, code: &str, lang: Option<&str>) -> &'a SyntaxReference {
    let Some(lang) = lang else {
        let first_line = code.lines().next().unwrap_or_default();
        return set
            .find_syntax_by_first_line(first_line)
            .unwrap_or_else(|| set.find_syntax_plain_text());
    };

    let token = lang.to_ascii_lowercase();
    set.find_syntax_by_token(alias(&token)).unwrap_or_else(|| {
        log!("highlight"; "couldn't find language `{lang}`, using plaintext");
        set.find_syntax_plain_text()
    })
}

/// Highlight one code sample into an `hljs` block.
pub fn highlight_code(code: &str, lang: Option<&str>) -> Result<String> {
    let set = syntax_set();
    let syntax = find_syntax(set, code, lang);

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, set, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .with_context(|| format!("Failed to highlight {} code", syntax.name))?;
    }

    Ok(format!(r#"<pre><code class="hljs">{}</code></pre>"#, generator.finalize()))
}

// =============================================================================
// Markdown fences
// =============================================================================

/// An open fenced block and the lines collected so far.
struct Fence {
    marker: char,
    len: usize,
    lang: Option<String>,
    body: String,
}

impl Fence {
    /// Parse an opening fence line: up to three spaces, then three or more
    /// backticks or tildes, then an optional info string.
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if line.len() - trimmed.len() > 3 {
            return None;
        }

        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }

        let info = trimmed[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }
        let lang = info
            .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_owned);

        Some(Self {
            marker,
            len,
            lang,
            body: String::new(),
        })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.len() >= self.len && trimmed.chars().all(|c| c == self.marker)
    }

    fn render(&self) -> Result<String> {
        let code = self.body.strip_suffix('\n').unwrap_or(&self.body);
        let code = code.strip_suffix('\r').unwrap_or(code);
        highlight_code(code, self.lang.as_deref())
    }
}

/// Replace every fenced code block in a Markdown source with highlighted HTML.
///
/// Text outside fences is copied unchanged. An unclosed fence runs to the end
/// of the document.
pub fn highlight_markdown(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len() * 2);
    let mut open: Option<Fence> = None;

    for line in source.split_inclusive('\n') {
        match open.take() {
            Some(fence) if fence.closes(line) => {
                out.push_str(&fence.render()?);
                out.push('\n');
            }
            Some(mut fence) => {
                fence.body.push_str(line);
                open = Some(fence);
            }
            None => match Fence::open(line) {
                Some(fence) => open = Some(fence),
                None => out.push_str(line),
            },
        }
    }

    if let Some(fence) = open {
        out.push_str(&fence.render()?);
        out.push('\n');
    }
    Ok(out)
}
