//! Final page sequencing: merging heuristic labels with structural order.

use tracing::warn;

use crate::label::{extract_number_from_path, extract_page_number, extract_title};
use crate::order::OrderedEntry;

/// What a page carries for the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// `content` is an HTML body.
    Text,
    /// `content` is an archive path to an image (the synthesized cover).
    Image,
}

/// One unit of the final reading sequence.
///
/// Page numbers are 1-based and contiguous; exactly one page has
/// `is_first` and one has `is_last` (the same page when the sequence has
/// a single entry). Consumed read-only by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub kind: PageKind,
    pub content: String,
    pub number: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub title: Option<String>,
}

impl Page {
    /// Minimal HTML wrapper for an image page, for surfaces that render
    /// everything through HTML.
    pub fn cover_html(&self) -> String {
        format!(
            "<html><body style=\"margin:0\"><img src=\"{}\" style=\"width:100%\"/></body></html>",
            self.content
        )
    }
}

/// Intermediate unit between label extraction and final ordering.
#[derive(Debug, Clone)]
pub struct PageCandidate {
    pub source_path: String,
    pub structural_order: usize,
    pub label: Option<u32>,
    pub title: Option<String>,
    pub html: String,
}

impl PageCandidate {
    /// Primary sort key: an extracted label when positive, otherwise a
    /// sentinel that sorts after every real label.
    fn label_key(&self) -> u64 {
        match self.label {
            Some(n) if n > 0 => u64::from(n),
            _ => u64::MAX,
        }
    }
}

/// Reconcile heuristic page labels with structural order and emit the
/// final page list.
///
/// Text entries are read through `read_doc` (a miss is warned and
/// skipped); each becomes a [`PageCandidate`] labeled from its title, or
/// from its path when the title yields nothing. Candidates sort by
/// (label, structural order): explicit in-content page numbers outrank
/// raw document order, and document order settles everything else. A
/// declared cover is held out of the sort and always becomes page 1.
///
/// No text documents and no cover yields an empty sequence — the book is
/// un-orderable, not an error. Deterministic for identical inputs.
pub fn sequence_pages<F>(
    entries: &[OrderedEntry],
    mut read_doc: F,
    cover_href: Option<&str>,
) -> Vec<Page>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut candidates: Vec<PageCandidate> = Vec::new();

    for entry in entries {
        if entry.is_image {
            continue;
        }
        let Some(html) = read_doc(&entry.path) else {
            warn!(path = %entry.path, "content document unreadable, skipping page");
            continue;
        };
        let title = extract_title(&html);
        let label = title
            .as_deref()
            .and_then(extract_page_number)
            .or_else(|| extract_number_from_path(&entry.path));
        candidates.push(PageCandidate {
            source_path: entry.path.clone(),
            structural_order: entry.index,
            label,
            title,
            html,
        });
    }

    candidates.sort_by_key(|c| (c.label_key(), c.structural_order));

    let mut pages: Vec<Page> = Vec::with_capacity(candidates.len() + 1);

    if let Some(href) = cover_href {
        pages.push(Page {
            kind: PageKind::Image,
            content: href.to_string(),
            number: 0,
            is_first: false,
            is_last: false,
            title: None,
        });
    }

    for candidate in candidates {
        pages.push(Page {
            kind: PageKind::Text,
            content: candidate.html,
            number: 0,
            is_first: false,
            is_last: false,
            title: candidate.title,
        });
    }

    let count = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.number = i + 1;
        page.is_first = i == 0;
        page.is_last = i + 1 == count;
    }

    pages
}
