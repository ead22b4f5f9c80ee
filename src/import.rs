//! High-level book import: the full pipeline from archive to metadata
//! and staged pages.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::archive::{EpubArchive, archive_stem};
use crate::error::Result;
use crate::extract::extract_single;
use crate::order::build_reading_order;
use crate::package::{locate_package_document, parse_package};
use crate::page::{Page, sequence_pages};

/// Metadata record handed to the storage collaborator.
///
/// `total_pages` always equals the length of the page sequence the
/// engine would produce for the same archive; stores holding a stale
/// count must overwrite it with this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    /// Local path of the extracted cover image; empty when the book
    /// declares no cover or extraction failed.
    pub cover_path: String,
    pub file_path: String,
    pub file_size: u64,
    pub total_pages: usize,
}

/// A fully opened book, ready for the rendering surface.
#[derive(Debug)]
pub struct OpenBook {
    pub pages: Vec<Page>,
    /// Base directory under which relative resource references in text
    /// pages resolve.
    pub resource_root: PathBuf,
}

/// Imports archives and stages their resources under app-owned
/// directories.
///
/// Layout: `<data>/covers/<stem>_cover.jpg` for covers,
/// `<data>/epub_resources/<stem>/…` mirroring archive paths, and
/// `<cache>/epub_images/<nanos>_<name>` for ad-hoc image extraction.
/// Directories are ensured once at construction; all later operations
/// assume they exist.
pub struct BookImporter {
    covers_dir: PathBuf,
    resources_dir: PathBuf,
    images_dir: PathBuf,
}

impl BookImporter {
    pub fn new(data_dir: &Path, cache_dir: &Path) -> Result<Self> {
        let covers_dir = data_dir.join("covers");
        let resources_dir = data_dir.join("epub_resources");
        let images_dir = cache_dir.join("epub_images");
        std::fs::create_dir_all(&covers_dir)?;
        std::fs::create_dir_all(&resources_dir)?;
        std::fs::create_dir_all(&images_dir)?;
        Ok(Self {
            covers_dir,
            resources_dir,
            images_dir,
        })
    }

    /// Parse one archive into a [`BookMetadata`] record.
    ///
    /// Runs the full pipeline (locate, parse, order, sequence) so the
    /// reported page count matches what [`Self::open_book`] will
    /// produce. Archive-open failures propagate; everything past that
    /// degrades to defaults.
    pub fn import(&self, path: &Path) -> Result<BookMetadata> {
        let mut archive = EpubArchive::open(path)?;
        let file_size = std::fs::metadata(path)?.len();

        let opf_path = locate_package_document(&mut archive);
        let doc = parse_package(&mut archive, &opf_path);
        let entries = archive.entries();
        let order = build_reading_order(&doc.spine, &doc.manifest, &entries);

        let pages = sequence_pages(
            &order,
            |entry_path| archive.read_text(entry_path).ok(),
            doc.cover_href.as_deref(),
        );

        let cover_path = match &doc.cover_href {
            Some(href) => self.extract_cover(&mut archive, path, href),
            None => String::new(),
        };

        Ok(BookMetadata {
            title: doc.title,
            author: doc.author,
            cover_path,
            file_path: path.to_string_lossy().into_owned(),
            file_size,
            total_pages: pages.len(),
        })
    }

    /// Open an archive for reading: stage its resources and build the
    /// final page sequence.
    ///
    /// The per-book resource directory is cleared and repopulated, so
    /// repeated opens of the same book are idempotent. Relative
    /// references inside text pages resolve under `resource_root`.
    pub fn open_book(&self, path: &Path) -> Result<OpenBook> {
        let mut archive = EpubArchive::open(path)?;

        let resource_root = self.resources_dir.join(archive_stem(path));
        if resource_root.exists() {
            std::fs::remove_dir_all(&resource_root)?;
        }
        archive.extract_all(&resource_root)?;

        let opf_path = locate_package_document(&mut archive);
        let doc = parse_package(&mut archive, &opf_path);
        let entries = archive.entries();
        let order = build_reading_order(&doc.spine, &doc.manifest, &entries);

        let pages = sequence_pages(
            &order,
            |entry_path| archive.read_text(entry_path).ok(),
            doc.cover_href.as_deref(),
        );

        Ok(OpenBook {
            pages,
            resource_root,
        })
    }

    /// Stage a single image entry into the shared image cache.
    pub fn extract_image(&self, archive_path: &Path, entry_path: &str) -> Option<PathBuf> {
        extract_single(archive_path, entry_path, &self.images_dir)
    }

    fn extract_cover(&self, archive: &mut EpubArchive, path: &Path, href: &str) -> String {
        let bytes = match archive.read(href) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(cover = %href, error = %e, "declared cover unreadable");
                return String::new();
            }
        };
        let out = self
            .covers_dir
            .join(format!("{}_cover.jpg", archive_stem(path)));
        match std::fs::write(&out, bytes) {
            Ok(()) => out.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(path = %out.display(), error = %e, "cannot write cover");
                String::new()
            }
        }
    }
}
