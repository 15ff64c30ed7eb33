/// Durable snapshot store for the scan state.
///
/// One JSON file holds the whole tracked set plus settings. Saves overwrite
/// atomically (temp file, sync, rename) so a crash mid-save leaves the old
/// snapshot intact. Loads are tolerant: a missing, unreadable, or corrupt
/// file means a cold start, never a fatal error.
pub mod autosave;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ScanSettings, ScanState};

/// Default snapshot file name, resolved against the working directory.
pub const STATE_FILE_NAME: &str = "readsleuth_state.json";

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error writing or deleting the snapshot.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The state could not be serialized.
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the snapshot at one fixed location.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store whose snapshot lives at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The snapshot location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full state, replacing any previous snapshot atomically.
    pub fn save(&self, state: &ScanState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(state)?;

        // Write to a sibling temp file and rename over the target, so a
        // crash mid-write cannot corrupt the previous snapshot.
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &self.path)?;

        debug!(
            "Snapshot: saved {} tracked files to {}",
            state.files.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Load the snapshot if present and parseable.
    ///
    /// Any failure is a cold start: logged, `None` returned. Records whose
    /// file no longer exists on disk are dropped from the restored set, and
    /// the speed limit is clamped back into range, so callers always get a
    /// state they can scan from directly.
    pub fn load(&self) -> Option<ScanState> {
        let raw = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("Snapshot: cannot read {}: {err}", self.path.display());
                return None;
            }
        };

        let mut state: ScanState = match serde_json::from_slice(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "Snapshot: cannot parse {}: {err}; starting cold",
                    self.path.display()
                );
                return None;
            }
        };

        let before = state.files.len();
        state.files.retain(|path, _| path.is_file());
        let dropped = before - state.files.len();
        if dropped > 0 {
            debug!("Snapshot: dropped {dropped} records whose files no longer exist");
        }
        state.settings.speed_limit = ScanSettings::clamp_speed_limit(state.settings.speed_limit);

        debug!(
            "Snapshot: restored {} tracked files from {}",
            state.files.len(),
            self.path.display()
        );
        Some(state)
    }

    /// Delete the snapshot. Succeeds when there is nothing to delete.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Snapshot: deleted {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
