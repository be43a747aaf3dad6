use anyhow::Result;
use quick_xml::{Writer, events::Event};
use std::io::Cursor;

use super::common::{XmlWriter, create_xml_reader};
use super::link::rewrite_anchor;

/// Rewrite every anchor in an HTML document or fragment.
///
/// Everything other than `<a>` start/empty tags is copied through unchanged.
pub fn rewrite_links(content: &[u8], github_base: Option<&str>) -> Result<Vec<u8>> {
    let mut writer: XmlWriter = Writer::new(Cursor::new(Vec::with_capacity(content.len())));
    let mut reader = create_xml_reader(content);

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"a" => {
                writer.write_event(Event::Start(rewrite_anchor(&elem, github_base)?))?;
            }
            Ok(Event::Empty(elem)) if elem.name().as_ref() == b"a" => {
                writer.write_event(Event::Empty(rewrite_anchor(&elem, github_base)?))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => anyhow::bail!(
                "XML parse error at position {}: {:?}",
                reader.error_position(),
                e
            ),
        }
    }

    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://github.com/owner/blog/blob/main/";

    fn rewrite(html: &str) -> String {
        String::from_utf8(rewrite_links(html.as_bytes(), Some(BASE)).unwrap()).unwrap()
    }

    #[test]
    fn test_github_link_becomes_external() {
        assert_eq!(
            rewrite(r#"<p>See <a href="github://src/utils/git.ts">the code</a>.</p>"#),
            r#"<p>See <a href="https://github.com/owner/blog/blob/main/src/utils/git.ts" target="_blank" rel="noopener">the code</a>.</p>"#
        );
    }

    #[test]
    fn test_external_link_replaces_target_and_rel() {
        assert_eq!(
            rewrite(r#"<a class="x" target="_self" href="https://example.com" rel="me">x</a>"#),
            r#"<a class="x" href="https://example.com" target="_blank" rel="noopener">x</a>"#
        );
    }

    #[test]
    fn test_internal_links_unchanged() {
        let html = r##"<a href="/about">a</a><a href="#top" target="_self">b</a>"##;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn test_missing_href_becomes_empty() {
        assert_eq!(rewrite(r#"<a name="x">x</a>"#), r#"<a name="x" href="">x</a>"#);
    }

    #[test]
    fn test_self_closing_anchor() {
        assert_eq!(
            rewrite(r#"<a href="http://example.com"/>"#),
            r#"<a href="http://example.com" target="_blank" rel="noopener"/>"#
        );
    }

    #[test]
    fn test_other_markup_passes_through() {
        let html = r#"<div class="post"><h1 id="t">Title</h1><img src="/a.png"/><br>text</div>"#;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn test_boolean_attribute_anchor() {
        assert_eq!(
            rewrite(r#"<a download href="https://x.com">x</a>"#),
            r#"<a download="" href="https://x.com" target="_blank" rel="noopener">x</a>"#
        );
    }

    #[test]
    fn test_unquoted_href_anchor() {
        assert_eq!(
            rewrite("<a href=https://x.com>x</a>"),
            r#"<a href="https://x.com" target="_blank" rel="noopener">x</a>"#
        );
        assert_eq!(rewrite("<a href=/about>a</a>"), r#"<a href="/about">a</a>"#);
    }

    #[test]
    fn test_without_base_github_links_are_kept() {
        let html = r#"<a href="github://src/a.ts">a</a>"#;
        let out = rewrite_links(html.as_bytes(), None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), html);
    }
}
