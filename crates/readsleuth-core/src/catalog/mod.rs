/// File catalog: enumerates candidate files for scanning.
///
/// Two feed modes:
/// - **Directory mode**: recursive walk of a root folder, every regular file.
/// - **Manual mode**: an explicit list of paths, filtered to regular files
///   with the rejects reported back instead of failing the whole request.
///
/// Identifiers are absolute paths; display names are derived relative to the
/// selected root.
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from directory enumeration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Root path is not a directory.
    #[error("root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// I/O error while resolving the root.
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One file produced by enumeration: its stable identifier and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Absolute path, the primary key in the tracked set.
    pub path: PathBuf,
    /// Byte length at enumeration time.
    pub size: u64,
}

/// Result of a manual add request.
///
/// Rejection is a per-path outcome, not an error: the caller reports the
/// rejected list to the operator and proceeds with the accepted entries.
#[derive(Debug, Default)]
pub struct ManualAddOutcome {
    /// Paths that exist as regular files, canonicalized.
    pub accepted: Vec<CatalogEntry>,
    /// Requested paths that do not exist or are not regular files.
    pub rejected: Vec<PathBuf>,
}

/// Recursively enumerate every regular file under `root`.
///
/// The walk is serial and sorted so the resulting catalog order is
/// deterministic. Hidden files are included; symlinks are not followed.
/// Unreadable entries are skipped with a warning rather than failing the
/// enumeration. Returns the canonicalized root alongside the entries so the
/// caller stores the same form the entry paths carry.
pub fn scan_root(root: &Path) -> Result<(PathBuf, Vec<CatalogEntry>), CatalogError> {
    let root = root.canonicalize().map_err(|source| CatalogError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(CatalogError::NotADirectory { path: root });
    }

    let walker = jwalk::WalkDir::new(&root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::Serial);

    let mut entries = Vec::new();
    let mut skipped: u64 = 0;

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                // Typically access-denied on a subdirectory.
                skipped += 1;
                warn!("Catalog: skipping unreadable entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let size = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                skipped += 1;
                warn!("Catalog: cannot stat {}: {err}", path.display());
                continue;
            }
        };

        entries.push(CatalogEntry { path, size });
    }

    debug!(
        "Catalog: {} files under {} ({} skipped)",
        entries.len(),
        root.display(),
        skipped
    );
    Ok((root, entries))
}

/// Resolve an explicit list of candidate paths into catalog entries.
///
/// Keeps request order in both result lists. A path is accepted only if it
/// currently exists as a regular file; everything else (missing, directory,
/// unresolvable) lands in `rejected`.
pub fn resolve_manual(paths: &[PathBuf]) -> ManualAddOutcome {
    let mut outcome = ManualAddOutcome::default();

    for requested in paths {
        let path = match requested.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                outcome.rejected.push(requested.clone());
                continue;
            }
        };
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                outcome.accepted.push(CatalogEntry {
                    path,
                    size: meta.len(),
                });
            }
            _ => outcome.rejected.push(requested.clone()),
        }
    }

    if !outcome.rejected.is_empty() {
        debug!(
            "Catalog: manual add rejected {} of {} paths",
            outcome.rejected.len(),
            paths.len()
        );
    }
    outcome
}

/// Derive a short display name for a tracked file.
///
/// Relative to the selected root when the file lives under it, otherwise the
/// full path (manually added files outside the root).
pub fn display_name(path: &Path, root: Option<&Path>) -> CompactString {
    if let Some(root) = root {
        if let Ok(rel) = path.strip_prefix(root) {
            return CompactString::new(rel.to_string_lossy());
        }
    }
    CompactString::new(path.to_string_lossy())
}
