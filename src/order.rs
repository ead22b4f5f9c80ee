//! Reading-order reconstruction from manifest + spine.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::archive::Entry;
use crate::util::is_image_path;

/// One slot of the reconstructed reading order.
///
/// `index` is the structural order: 0-based, assigned in declaration
/// order, stable only within one [`build_reading_order`] call. It is the
/// single ordering signal the page sequencer falls back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedEntry {
    pub path: String,
    pub index: usize,
    pub is_image: bool,
}

/// Compose spine and manifest into an ordered entry list.
///
/// Spine ids resolve through the manifest in declared order; ids missing
/// from the manifest or pointing at entries absent from the archive are
/// silently dropped. Image-typed archive entries not referenced by the
/// spine are appended afterwards in archive enumeration order, so books
/// that carry their pages as bare images still produce a usable order.
pub fn build_reading_order(
    spine: &[String],
    manifest: &HashMap<String, String>,
    entries: &[Entry],
) -> Vec<OrderedEntry> {
    let present: HashSet<&str> = entries
        .iter()
        .filter(|e| !e.is_dir)
        .map(|e| e.path.as_str())
        .collect();

    let mut ordered = Vec::new();
    let mut included: HashSet<&str> = HashSet::new();

    for id in spine {
        let Some(path) = manifest.get(id) else {
            debug!(id = %id, "spine id missing from manifest, dropping");
            continue;
        };
        if !present.contains(path.as_str()) {
            debug!(path = %path, "spine entry missing from archive, dropping");
            continue;
        }
        if !included.insert(path.as_str()) {
            continue;
        }
        ordered.push(OrderedEntry {
            path: path.clone(),
            index: ordered.len(),
            is_image: is_image_path(path),
        });
    }

    // Orphan images: comics and fixed-layout books often leave page
    // images out of the spine entirely.
    for entry in entries {
        if entry.is_dir || !is_image_path(&entry.path) {
            continue;
        }
        if included.contains(entry.path.as_str()) {
            continue;
        }
        ordered.push(OrderedEntry {
            path: entry.path.clone(),
            index: ordered.len(),
            is_image: true,
        });
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> Entry {
        Entry {
            path: path.to_string(),
            size: 0,
            is_dir: false,
        }
    }

    fn manifest(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, path)| (id.to_string(), path.to_string()))
            .collect()
    }

    #[test]
    fn test_spine_order_preserved() {
        let spine = vec!["b".to_string(), "a".to_string()];
        let manifest = manifest(&[("a", "a.xhtml"), ("b", "b.xhtml")]);
        let entries = vec![entry("a.xhtml"), entry("b.xhtml")];

        let order = build_reading_order(&spine, &manifest, &entries);
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].path, "b.xhtml");
        assert_eq!(order[0].index, 0);
        assert!(!order[0].is_image);
        assert_eq!(order[1].path, "a.xhtml");
        assert_eq!(order[1].index, 1);
    }

    #[test]
    fn test_unresolvable_spine_ids_dropped() {
        let spine = vec![
            "ch1".to_string(),
            "ghost".to_string(),
            "missing-file".to_string(),
        ];
        let manifest = manifest(&[("ch1", "ch1.xhtml"), ("missing-file", "gone.xhtml")]);
        let entries = vec![entry("ch1.xhtml")];

        let order = build_reading_order(&spine, &manifest, &entries);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].path, "ch1.xhtml");
    }

    #[test]
    fn test_orphan_images_appended_in_enumeration_order() {
        let spine = vec!["ch1".to_string()];
        let manifest = manifest(&[("ch1", "ch1.xhtml")]);
        let entries = vec![
            entry("img/p2.png"),
            entry("ch1.xhtml"),
            entry("img/p1.png"),
            entry("style.css"),
        ];

        let order = build_reading_order(&spine, &manifest, &entries);
        let paths: Vec<_> = order.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["ch1.xhtml", "img/p2.png", "img/p1.png"]);
        assert!(order[1].is_image);
        assert_eq!(order[2].index, 2);
    }

    #[test]
    fn test_spine_image_not_appended_twice() {
        let spine = vec!["p1".to_string()];
        let manifest = manifest(&[("p1", "img/p1.png")]);
        let entries = vec![entry("img/p1.png"), entry("img/p2.png")];

        let order = build_reading_order(&spine, &manifest, &entries);
        let paths: Vec<_> = order.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["img/p1.png", "img/p2.png"]);
        assert!(order[0].is_image);
    }

    #[test]
    fn test_empty_spine_yields_only_images() {
        let order = build_reading_order(
            &[],
            &HashMap::new(),
            &[entry("a.xhtml"), entry("b.png")],
        );
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].path, "b.png");
        assert_eq!(order[0].index, 0);
    }
}
