//! Random access to an EPUB's ZIP container.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::warn;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::util::decode_text;

/// One entry of an opened container.
///
/// Paths are archive-internal and '/'-separated. Immutable once listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
}

/// An opened, seekable EPUB container.
///
/// Handles are cheap and per-operation: open, read what you need, drop.
/// Nothing is cached across opens.
#[derive(Debug)]
pub struct EpubArchive {
    zip: ZipArchive<File>,
}

impl EpubArchive {
    /// Open the container at `path`.
    ///
    /// A missing file is [`Error::NotFound`]; a file that is not a valid
    /// ZIP archive is [`Error::Corrupt`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let zip = ZipArchive::new(file)?;
        Ok(Self { zip })
    }

    /// List all entries in archive enumeration order.
    pub fn entries(&mut self) -> Vec<Entry> {
        let mut out = Vec::with_capacity(self.zip.len());
        for i in 0..self.zip.len() {
            if let Ok(file) = self.zip.by_index(i) {
                out.push(Entry {
                    path: file.name().to_string(),
                    size: file.size(),
                    is_dir: file.is_dir(),
                });
            }
        }
        out
    }

    /// Size in bytes of a single entry, without reading it.
    pub fn entry_size(&mut self, path: &str) -> Result<u64> {
        match self.zip.by_name(path) {
            Ok(file) => Ok(file.size()),
            Err(zip::result::ZipError::FileNotFound) => {
                Err(Error::EntryNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a single entry into memory.
    ///
    /// Falls back to the percent-decoded entry name, which recovers hrefs
    /// from packages that URL-encode their manifest paths.
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        match self.zip.by_name(path) {
            Ok(mut file) => {
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                return Ok(contents);
            }
            Err(zip::result::ZipError::FileNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let decoded = percent_encoding::percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| Error::EntryNotFound(path.to_string()))?;

        match self.zip.by_name(&decoded) {
            Ok(mut file) => {
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                Ok(contents)
            }
            Err(zip::result::ZipError::FileNotFound) => {
                Err(Error::EntryNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a single entry and decode it to text (UTF-8 with BOM handling,
    /// declared-encoding and Windows-1252 fallbacks).
    pub fn read_text(&mut self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        Ok(decode_text(&bytes).into_owned())
    }

    /// Extract every entry under `dest`, recreating the archive's internal
    /// directory structure. Existing files are overwritten; callers wanting
    /// idempotence clear `dest` first.
    ///
    /// Entries whose normalized path would escape `dest` (absolute paths,
    /// `..` segments) are skipped with a warning, never written.
    ///
    /// Returns the number of files written.
    pub fn extract_all(&mut self, dest: &Path) -> Result<usize> {
        std::fs::create_dir_all(dest)?;

        let mut written = 0;
        for i in 0..self.zip.len() {
            let mut file = self.zip.by_index(i)?;

            let Some(rel) = file.enclosed_name() else {
                warn!(entry = %file.name(), "skipping entry that escapes the extraction root");
                continue;
            };
            let out_path = dest.join(rel);

            if file.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            std::io::copy(&mut file, &mut out)?;
            written += 1;
        }
        Ok(written)
    }
}

/// The archive's stem (file name without the `.epub` extension), used to
/// key per-book extraction directories and cover files.
pub(crate) fn archive_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string())
}
