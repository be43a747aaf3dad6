use quick_xml::{
    Reader, Writer,
    events::{BytesStart, attributes::AttrError},
};
use std::borrow::Cow;
use std::io::Cursor;

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Reader tuned for HTML fragments: no text trimming, no end-tag checks
/// (void elements like `<br>` never close).
#[inline]
pub fn create_xml_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Rebuild an element, letting `transform` rewrite or drop each attribute.
///
/// Attributes are read with HTML rules (`download`, `href=/x`). Values are
/// raw (still escaped) bytes and are written back quoted.
pub fn rebuild_elem<F>(elem: &BytesStart<'_>, mut transform: F) -> Result<BytesStart<'static>, AttrError>
where
    F: FnMut(&[u8], Cow<'_, [u8]>) -> Option<Cow<'static, [u8]>>,
{
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut new_elem = BytesStart::new(tag);

    for attr in elem.html_attributes() {
        let attr = attr?;
        let key = attr.key;
        if let Some(value) = transform(key.as_ref(), attr.value) {
            new_elem.push_attribute((key.as_ref(), value.as_ref()));
        }
    }
    Ok(new_elem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_elem_drops_and_rewrites() {
        let elem = BytesStart::from_content(r#"a href="x" class="c" id="i""#, 1);
        let rebuilt = rebuild_elem(&elem, |key, value| match key {
            b"class" => None,
            b"href" => Some(Cow::Owned(b"y".to_vec())),
            _ => Some(Cow::Owned(value.into_owned())),
        })
        .unwrap();

        let attrs: Vec<_> = rebuilt
            .attributes()
            .flatten()
            .map(|a| (a.key.as_ref().to_vec(), a.value.into_owned()))
            .collect();
        assert_eq!(
            attrs,
            vec![(b"href".to_vec(), b"y".to_vec()), (b"id".to_vec(), b"i".to_vec())]
        );
        assert_eq!(rebuilt.name().as_ref(), b"a");
    }

    #[test]
    fn test_rebuild_elem_html_attributes() {
        let elem = BytesStart::from_content("a download href=/x", 1);
        let rebuilt = rebuild_elem(&elem, |_, value| Some(Cow::Owned(value.into_owned()))).unwrap();

        let attrs: Vec<_> = rebuilt
            .attributes()
            .map(|a| a.map(|a| (a.key.as_ref().to_vec(), a.value.into_owned())))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            attrs,
            vec![(b"download".to_vec(), Vec::new()), (b"href".to_vec(), b"/x".to_vec())]
        );
    }

    #[test]
    fn test_rebuild_elem_reports_bad_attribute() {
        let elem = BytesStart::from_content(r#"a href="x" href="y""#, 1);
        assert!(rebuild_elem(&elem, |_, v| Some(Cow::Owned(v.into_owned()))).is_err());
    }
}
