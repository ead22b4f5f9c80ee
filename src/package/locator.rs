//! Locates the package document via the container bootstrap entry.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::archive::EpubArchive;

/// The fixed bootstrap entry every conforming EPUB carries.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Conventional package path used when the bootstrap entry is missing
/// or unparsable.
pub const DEFAULT_PACKAGE_PATH: &str = "content.opf";

/// Find the package-document path declared in `META-INF/container.xml`.
///
/// Best effort by contract: a missing or malformed bootstrap entry falls
/// back to [`DEFAULT_PACKAGE_PATH`]. Never fails.
pub fn locate_package_document(archive: &mut EpubArchive) -> String {
    match archive.read_text(CONTAINER_PATH) {
        Ok(content) => scan_rootfile(&content).unwrap_or_else(|| {
            debug!("container.xml has no usable rootfile, assuming default package path");
            DEFAULT_PACKAGE_PATH.to_string()
        }),
        Err(_) => {
            debug!("container.xml missing or unreadable, assuming default package path");
            DEFAULT_PACKAGE_PATH.to_string()
        }
    }
}

/// Extract the first `full-path` attribute of a `rootfile` element.
///
/// Tolerant of attribute order, whitespace, and namespace prefixes; any
/// XML error simply ends the scan.
fn scan_rootfile(content: &str) -> Option<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path"
                        && let Ok(path) = String::from_utf8(attr.value.to_vec())
                        && !path.is_empty()
                    {
                        return Some(path);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Extract local name from a namespaced XML name (e.g. "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_rootfile() {
        let container = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
        assert_eq!(scan_rootfile(container).as_deref(), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_scan_rootfile_attribute_order() {
        let container =
            r#"<rootfiles><rootfile media-type="x" full-path="book/package.opf"/></rootfiles>"#;
        assert_eq!(scan_rootfile(container).as_deref(), Some("book/package.opf"));
    }

    #[test]
    fn test_scan_rootfile_first_wins() {
        let container = r#"<rootfiles>
            <rootfile full-path="first.opf"/>
            <rootfile full-path="second.opf"/>
        </rootfiles>"#;
        assert_eq!(scan_rootfile(container).as_deref(), Some("first.opf"));
    }

    #[test]
    fn test_scan_rootfile_missing() {
        assert_eq!(scan_rootfile("<container></container>"), None);
        assert_eq!(scan_rootfile("not xml at <<< all"), None);
        assert_eq!(scan_rootfile(r#"<rootfile media-type="x"/>"#), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"dc:title"), b"title");
        assert_eq!(local_name(b"title"), b"title");
        assert_eq!(local_name(b""), b"");
    }
}
