//! Anchor rewriting rules.
//!
//! | Input `href` | Output |
//! |--------------|--------|
//! | `github://src/main.rs` | `<github_base>src/main.rs`, opens in new tab |
//! | `github:///dfidalg0` | `https://github.com/dfidalg0`, opens in new tab |
//! | `https://example.com` | unchanged, opens in new tab |
//! | `/about`, `#top`, `../x` | unchanged |
//! | (missing) | `""` |

use super::common::rebuild_elem;
use crate::log;
use anyhow::{Context, Result};
use quick_xml::events::BytesStart;
use regex::Regex;
use std::{borrow::Cow, path::Path, str, sync::OnceLock};

/// Pseudo-scheme for links into the site's own repository.
pub const GITHUB_PROTO: &str = "github://";

/// Whether `href` leaves the site over http(s).
pub fn is_web_link(href: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^https?://").unwrap());
    re.is_match(href)
}

/// Expand a `github://` link against `base`; other links are returned as-is.
///
/// A path starting with `/` resolves against the origin of `base` rather
/// than its path.
pub fn resolve_github_link<'a>(href: &'a str, base: &str) -> Cow<'a, str> {
    let Some(path) = href.strip_prefix(GITHUB_PROTO) else {
        return Cow::Borrowed(href);
    };

    if path.starts_with('/') {
        return Cow::Owned(format!("{}{path}", origin(base)));
    }
    Cow::Owned(format!("{base}{path}"))
}

/// `https://github.com/o/r/blob/main/` → `https://github.com`
fn origin(base: &str) -> &str {
    let after_scheme = base.find("://").map_or(0, |i| i + 3);
    match base[after_scheme..].find('/') {
        Some(i) => &base[..after_scheme + i],
        None => base,
    }
}

/// Repository blob URL for a file under `root`.
pub fn github_link(root: &Path, file: &Path, base: &str) -> Result<String> {
    let rel = file
        .strip_prefix(root)
        .with_context(|| format!("{} is not under {}", file.display(), root.display()))?;
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Ok(format!("{base}{rel}"))
}

/// Rewrite one `<a>` element.
///
/// External anchors get `target="_blank" rel="noopener"`, replacing any
/// existing values. An anchor without `href` gets an empty one.
pub fn rewrite_anchor(elem: &BytesStart<'_>, github_base: Option<&str>) -> Result<BytesStart<'static>> {
    let mut raw_href = Vec::new();
    for attr in elem.html_attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"href" {
            raw_href = attr.value.into_owned();
            break;
        }
    }
    let raw_href = str::from_utf8(&raw_href).context("non UTF-8 href")?;

    let href = match github_base {
        Some(base) => resolve_github_link(raw_href, base),
        None => {
            if raw_href.starts_with(GITHUB_PROTO) {
                log!("links"; "no [links].github_base configured, leaving {raw_href}");
            }
            Cow::Borrowed(raw_href)
        }
    };
    let external = is_web_link(&href);

    let mut has_href = false;
    let mut rebuilt = rebuild_elem(elem, |key, value| match key {
        b"href" => {
            has_href = true;
            Some(Cow::Owned(href.as_bytes().to_vec()))
        }
        b"target" | b"rel" if external => None,
        _ => Some(Cow::Owned(value.into_owned())),
    })?;

    if !has_href {
        rebuilt.push_attribute((b"href".as_slice(), href.as_bytes()));
    }
    if external {
        rebuilt.push_attribute(("target", "_blank"));
        rebuilt.push_attribute(("rel", "noopener"));
    }
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://github.com/owner/blog/blob/main/";

    #[test]
    fn test_is_web_link() {
        assert!(is_web_link("https://example.com"));
        assert!(is_web_link("http://example.com/a"));
        assert!(!is_web_link("mailto:me@example.com"));
        assert!(!is_web_link("/about"));
        assert!(!is_web_link("//cdn.example.com"));
        assert!(!is_web_link("see https://example.com"));
    }

    #[test]
    fn test_resolve_github_link() {
        assert_eq!(
            resolve_github_link("github://plugins/vite/git/index.ts", BASE),
            "https://github.com/owner/blog/blob/main/plugins/vite/git/index.ts"
        );
        assert_eq!(
            resolve_github_link("github:///owner", BASE),
            "https://github.com/owner"
        );
        assert_eq!(resolve_github_link("/about", BASE), "/about");
    }

    #[test]
    fn test_origin() {
        assert_eq!(origin(BASE), "https://github.com");
        assert_eq!(origin("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_github_link() {
        let link = github_link(
            Path::new("/repo"),
            Path::new("/repo/src/utils/git.ts"),
            BASE,
        )
        .unwrap();
        assert_eq!(link, "https://github.com/owner/blog/blob/main/src/utils/git.ts");

        assert!(github_link(Path::new("/repo"), Path::new("/elsewhere/a.ts"), BASE).is_err());
    }
}
