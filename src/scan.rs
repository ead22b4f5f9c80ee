//! Recursive folder scanning for EPUB archives, streamed as lazy events.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::import::{BookImporter, BookMetadata};

/// One progress report from a folder scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// 0..=100, monotonically non-decreasing within one scan.
    pub progress: u8,
    /// File currently being processed; empty on the terminal event.
    pub current_file: String,
    /// All books successfully imported so far.
    pub books: Vec<BookMetadata>,
    pub is_complete: bool,
}

/// Walk `root` recursively and import every `.epub` file found.
///
/// The returned iterator is pull-based: each `next()` advances the scan
/// by one archive, so a consumer that stops pulling halts further work.
/// One event is emitted per discovered file (before it is parsed),
/// followed by exactly one terminal event with `is_complete` — even for
/// an empty or non-existent root. A single archive's failure is warned
/// and omitted from `books`, never aborting the scan.
pub fn scan_folder<'a>(importer: &'a BookImporter, root: &Path) -> FolderScan<'a> {
    let mut files = Vec::new();
    collect_epub_files(root, &mut files);
    FolderScan {
        importer,
        files,
        next_index: 0,
        pending: None,
        books: Vec::new(),
        done: false,
    }
}

/// Lazy scan state; see [`scan_folder`].
pub struct FolderScan<'a> {
    importer: &'a BookImporter,
    files: Vec<PathBuf>,
    next_index: usize,
    pending: Option<PathBuf>,
    books: Vec<BookMetadata>,
    done: bool,
}

impl Iterator for FolderScan<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        if self.done {
            return None;
        }

        // Parse the file announced by the previous event, if any.
        if let Some(path) = self.pending.take() {
            match self.importer.import(&path) {
                Ok(book) => self.books.push(book),
                Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable archive"),
            }
        }

        if self.next_index < self.files.len() {
            let path = self.files[self.next_index].clone();
            let event = ScanEvent {
                progress: (self.next_index * 100 / self.files.len()) as u8,
                current_file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                books: self.books.clone(),
                is_complete: false,
            };
            self.pending = Some(path);
            self.next_index += 1;
            Some(event)
        } else {
            self.done = true;
            Some(ScanEvent {
                progress: 100,
                current_file: String::new(),
                books: self.books.clone(),
                is_complete: true,
            })
        }
    }
}

/// Depth-first `.epub` discovery, sorted per directory so the scan order
/// is deterministic across platforms.
fn collect_epub_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_epub_files(&path, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
        {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_epub_files_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.epub"), b"").unwrap();
        std::fs::write(dir.path().join("a.EPUB"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join("sub/c.epub"), b"").unwrap();

        let mut files = Vec::new();
        collect_epub_files(dir.path(), &mut files);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.EPUB", "b.epub", "c.epub"]);
    }

    #[test]
    fn test_collect_from_missing_root() {
        let mut files = Vec::new();
        collect_epub_files(Path::new("/no/such/dir"), &mut files);
        assert!(files.is_empty());
    }
}
