//! OPF package-document parsing: metadata, manifest, spine, cover.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::locator::local_name;
use crate::archive::EpubArchive;

/// Everything the engine needs from one package document.
///
/// `manifest` maps resource id to its archive path, already resolved
/// against the package document's directory and percent-decoded.
#[derive(Debug, Clone, Default)]
pub struct PackageDoc {
    pub title: String,
    pub author: String,
    pub manifest: HashMap<String, String>,
    pub spine: Vec<String>,
    pub cover_href: Option<String>,
}

/// Parse the package document at `opf_path`.
///
/// Never fails: an unreadable or unparsable document yields an empty
/// [`PackageDoc`] ("metadata unavailable", not fatal). Partial documents
/// yield whatever was recovered before the first XML error.
pub fn parse_package(archive: &mut EpubArchive, opf_path: &str) -> PackageDoc {
    let content = match archive.read_text(opf_path) {
        Ok(content) => content,
        Err(_) => {
            debug!(opf_path = %opf_path, "package document unreadable, using empty metadata");
            return PackageDoc::default();
        }
    };
    parse_package_str(&content, package_dir(opf_path))
}

/// Directory portion of an archive-internal package path ("" at root).
fn package_dir(opf_path: &str) -> &str {
    opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn parse_package_str(content: &str, opf_dir: &str) -> PackageDoc {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut doc = PackageDoc::default();
    // Cover candidates, strongest declaration first:
    // EPUB3 properties="cover-image", EPUB2 <meta name="cover">, id "cover".
    let mut property_cover: Option<String> = None;
    let mut meta_cover_id: Option<String> = None;
    let mut id_cover: Option<String> = None;

    let mut in_metadata = false;
    let mut capturing: Option<&'static str> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_ascii_lowercase();
                match local.as_slice() {
                    b"metadata" => in_metadata = true,
                    b"title" if in_metadata && doc.title.is_empty() => {
                        capturing = Some("title");
                        buf_text.clear();
                    }
                    b"creator" if in_metadata && doc.author.is_empty() => {
                        capturing = Some("creator");
                        buf_text.clear();
                    }
                    _ => handle_structural(
                        &e,
                        &local,
                        opf_dir,
                        &mut doc,
                        &mut property_cover,
                        &mut meta_cover_id,
                        &mut id_cover,
                    ),
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_ascii_lowercase();
                handle_structural(
                    &e,
                    &local,
                    opf_dir,
                    &mut doc,
                    &mut property_cover,
                    &mut meta_cover_id,
                    &mut id_cover,
                );
            }
            Ok(Event::Text(e)) => {
                if capturing.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if capturing.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_ascii_lowercase();
                if local == b"metadata" {
                    in_metadata = false;
                }
                if let Some(elem) = capturing.take() {
                    let text = buf_text.trim().to_string();
                    match elem {
                        "title" => doc.title = text,
                        "creator" => doc.author = text,
                        _ => {}
                    }
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            // Tolerant by contract: keep whatever was recovered so far.
            Err(_) => {
                debug!("package document malformed, keeping partially parsed content");
                break;
            }
            _ => {}
        }
    }

    doc.cover_href = property_cover
        .or_else(|| meta_cover_id.and_then(|id| doc.manifest.get(&id).cloned()))
        .or(id_cover);

    doc
}

/// Manifest `item`, spine `itemref`, and cover `meta` elements; shared
/// between self-closing and open-tag forms.
fn handle_structural(
    e: &BytesStart<'_>,
    local: &[u8],
    opf_dir: &str,
    doc: &mut PackageDoc,
    property_cover: &mut Option<String>,
    meta_cover_id: &mut Option<String>,
    id_cover: &mut Option<String>,
) {
    match local {
        b"item" => {
            let mut id: Option<String> = None;
            let mut href: Option<String> = None;
            let mut properties: Option<String> = None;

            for attr in e.attributes().flatten() {
                let value = || String::from_utf8_lossy(&attr.value).into_owned();
                match attr.key.as_ref() {
                    b"id" => id = Some(value()),
                    b"href" => href = Some(value()),
                    b"properties" => properties = Some(value()),
                    _ => {}
                }
            }

            // Items missing either attribute are unusable and skipped.
            let (Some(id), Some(href)) = (id, href) else {
                return;
            };
            let path = resolve_href(opf_dir, &href);

            let is_property_cover = properties
                .as_deref()
                .is_some_and(|p| p.split_ascii_whitespace().any(|p| p == "cover-image"));
            if is_property_cover && property_cover.is_none() {
                *property_cover = Some(path.clone());
            }
            if id == "cover" && id_cover.is_none() {
                *id_cover = Some(path.clone());
            }

            doc.manifest.insert(id, path);
        }
        b"itemref" => {
            for attr in e.attributes().flatten() {
                if attr.key.as_ref() == b"idref" {
                    let idref = String::from_utf8_lossy(&attr.value).into_owned();
                    if !idref.is_empty() {
                        doc.spine.push(idref);
                    }
                }
            }
        }
        b"meta" => {
            let mut is_cover = false;
            let mut content = String::new();
            for attr in e.attributes().flatten() {
                match attr.key.as_ref() {
                    b"name" if attr.value.as_ref() == b"cover" => is_cover = true,
                    b"content" => content = String::from_utf8_lossy(&attr.value).into_owned(),
                    _ => {}
                }
            }
            if is_cover && !content.is_empty() && meta_cover_id.is_none() {
                *meta_cover_id = Some(content);
            }
        }
        _ => {}
    }
}

/// Resolve a manifest href to an archive path.
///
/// A leading '/' means archive-root-relative; anything else is relative
/// to the package document's directory. Percent escapes are decoded so
/// manifest paths compare equal to archive entry names.
fn resolve_href(opf_dir: &str, href: &str) -> String {
    let decoded = percent_encoding::percent_decode_str(href)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| href.to_string());

    if let Some(rooted) = decoded.strip_prefix('/') {
        rooted.to_string()
    } else if opf_dir.is_empty() {
        decoded
    } else {
        format!("{}/{}", opf_dir, decoded)
    }
}

/// Resolve XML entity references, named and numeric.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
