//! # folio
//!
//! An EPUB container engine: archive introspection, package-document
//! (OPF) parsing, reading-order reconstruction, and the page-sequencing
//! heuristics that merge in-content page labels with structural order
//! into a final, deterministic page list.
//!
//! The engine is deliberately tolerant: malformed bootstrap entries,
//! package documents, and metadata degrade to defaults instead of
//! failing, so a shelf scan survives whatever archives it encounters.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use folio::{BookImporter, scan_folder};
//!
//! let importer = BookImporter::new(Path::new("/data/app"), Path::new("/data/cache"))?;
//!
//! // Import a single book
//! let meta = importer.import(Path::new("book.epub"))?;
//! println!("{} by {} ({} pages)", meta.title, meta.author, meta.total_pages);
//!
//! // Or stream a whole folder
//! for event in scan_folder(&importer, Path::new("/books")) {
//!     println!("{}% {}", event.progress, event.current_file);
//! }
//! # Ok::<(), folio::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! [`EpubArchive`] gives random access to the container;
//! [`locate_package_document`] and [`parse_package`] recover manifest,
//! spine, and metadata; [`build_reading_order`] composes them into
//! ordered entries; [`sequence_pages`] reconciles extracted page labels
//! with structural order and emits the final [`Page`] list.

pub mod archive;
pub mod error;
pub mod extract;
pub mod import;
pub mod label;
pub mod order;
pub mod package;
pub mod page;
pub mod scan;
pub(crate) mod util;

pub use archive::{Entry, EpubArchive};
pub use error::{Error, Result};
pub use extract::{
    MAX_SINGLE_EXTRACT_BYTES, extract_archive, extract_single, extract_single_with_limit,
};
pub use import::{BookImporter, BookMetadata, OpenBook};
pub use label::{extract_number_from_path, extract_page_number, extract_title};
pub use order::{OrderedEntry, build_reading_order};
pub use package::{PackageDoc, locate_package_document, parse_package};
pub use page::{Page, PageCandidate, PageKind, sequence_pages};
pub use scan::{FolderScan, ScanEvent, scan_folder};
