//! Materializing archive entries onto local storage.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::archive::EpubArchive;
use crate::error::Result;
use crate::util::base_name;

/// Default per-entry cap for ad-hoc single extractions.
pub const MAX_SINGLE_EXTRACT_BYTES: u64 = 10 * 1024 * 1024;

/// Open the archive at `archive_path` and extract every entry under
/// `dest`, mirroring the archive's internal structure.
///
/// Overwrites prior files for the same destination; callers wanting
/// idempotence clear `dest` first. Returns the number of files written.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize> {
    let mut archive = EpubArchive::open(archive_path)?;
    archive.extract_all(dest)
}

/// Extract one entry into `cache_dir` under a collision-free name.
///
/// Uses the default [`MAX_SINGLE_EXTRACT_BYTES`] size cap; see
/// [`extract_single_with_limit`].
pub fn extract_single(archive_path: &Path, entry_path: &str, cache_dir: &Path) -> Option<PathBuf> {
    extract_single_with_limit(archive_path, entry_path, cache_dir, MAX_SINGLE_EXTRACT_BYTES)
}

/// Extract one entry into `cache_dir`, refusing entries larger than
/// `max_bytes`.
///
/// The output name is `<nanos>_<basename>` with a bump-on-collision
/// loop, so same-named entries extracted from different archives never
/// overwrite one another. All failures (missing archive, missing entry,
/// oversized resource, write error) are warned and reported as `None`;
/// an oversized entry performs no filesystem write at all.
pub fn extract_single_with_limit(
    archive_path: &Path,
    entry_path: &str,
    cache_dir: &Path,
    max_bytes: u64,
) -> Option<PathBuf> {
    let mut archive = match EpubArchive::open(archive_path) {
        Ok(archive) => archive,
        Err(e) => {
            warn!(archive = %archive_path.display(), error = %e, "cannot open archive");
            return None;
        }
    };

    let size = match archive.entry_size(entry_path) {
        Ok(size) => size,
        Err(e) => {
            warn!(entry = %entry_path, error = %e, "cannot stat entry");
            return None;
        }
    };
    if size > max_bytes {
        warn!(
            entry = %entry_path,
            size,
            limit = max_bytes,
            "resource exceeds extraction cap, skipping"
        );
        return None;
    }

    let bytes = match archive.read(entry_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(entry = %entry_path, error = %e, "cannot read entry");
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(cache_dir) {
        warn!(dir = %cache_dir.display(), error = %e, "cannot create cache directory");
        return None;
    }

    let out_path = unique_cache_path(cache_dir, base_name(entry_path));
    match std::fs::write(&out_path, bytes) {
        Ok(()) => Some(out_path),
        Err(e) => {
            warn!(path = %out_path.display(), error = %e, "cannot write extracted entry");
            None
        }
    }
}

/// Time-prefixed output path, bumped until it does not collide.
fn unique_cache_path(cache_dir: &Path, name: &str) -> PathBuf {
    let mut stamp = time_nanos();
    loop {
        let candidate = cache_dir.join(format!("{stamp}_{name}"));
        if !candidate.exists() {
            return candidate;
        }
        stamp += 1;
    }
}

fn time_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
