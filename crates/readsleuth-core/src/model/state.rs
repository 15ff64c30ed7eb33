/// Live scan state shared between the consumer thread, the scan thread, and
/// the autosave thread: global settings plus one record per tracked file.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::model::record::{FileRecord, Verdict};
use crate::model::settings::ScanSettings;

/// A shared, concurrently-readable scan state.
///
/// The scan thread holds a write lock briefly to update one record at a time.
/// The autosave thread holds a read lock to clone the state for serialization.
/// The consumer thread holds a write lock while applying commands.
pub type SharedState = Arc<RwLock<ScanState>>;

/// One queued unit of scan work: a file and the byte offset to resume from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTask {
    /// Absolute path of the tracked file.
    pub path: PathBuf,
    /// Byte offset the read starts from (0 for a fresh file).
    pub offset: u64,
}

/// The whole tracked set: settings plus per-file records keyed by absolute
/// path.
///
/// A `BTreeMap` keeps queue order and snapshot output stable across runs.
/// Serializes to the snapshot JSON shape directly: the two settings fields
/// are flattened to the top level next to `files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    /// Selected folder and speed limit.
    #[serde(flatten)]
    pub settings: ScanSettings,
    /// One record per tracked file.
    pub files: BTreeMap<PathBuf, FileRecord>,
}

impl ScanState {
    /// Replace the tracked set with a fresh directory enumeration.
    ///
    /// Selecting a root resets every record: prior progress and verdicts
    /// belonged to the previous catalog and are discarded.
    pub fn set_root(&mut self, root: PathBuf, entries: Vec<CatalogEntry>) {
        self.files = entries
            .into_iter()
            .map(|entry| (entry.path, FileRecord::discovered(entry.size)))
            .collect();
        self.settings.folder = Some(root);
    }

    /// Append manually added files without touching records that already
    /// exist. Returns how many files became newly tracked.
    pub fn add_files(&mut self, entries: Vec<CatalogEntry>) -> usize {
        let mut added = 0;
        for entry in entries {
            self.files.entry(entry.path).or_insert_with(|| {
                added += 1;
                FileRecord::discovered(entry.size)
            });
        }
        added
    }

    /// Clamp and store the operator speed limit.
    pub fn set_speed_limit(&mut self, limit: u32) {
        self.settings.speed_limit = ScanSettings::clamp_speed_limit(limit);
    }

    /// Forget everything: tracked files, selected folder, and the speed limit
    /// all return to cold-start defaults.
    pub fn clear(&mut self) {
        *self = ScanState::default();
    }

    /// Build the pending task queue: every record without an OK verdict, in
    /// stable path order, each resuming from its recorded byte offset.
    ///
    /// The offset is clamped to the recorded size; the reader re-checks the
    /// real size when it opens the file.
    pub fn pending_tasks(&self) -> Vec<ReadTask> {
        self.files
            .iter()
            .filter(|(_, record)| record.verdict != Verdict::Ok)
            .map(|(path, record)| ReadTask {
                path: path.clone(),
                offset: record.progress.min(record.size),
            })
            .collect()
    }

    /// Counts of (ok, bad, pending) records, for run summaries.
    pub fn verdict_counts(&self) -> (usize, usize, usize) {
        let mut ok = 0;
        let mut bad = 0;
        let mut pending = 0;
        for record in self.files.values() {
            match record.verdict {
                Verdict::Ok => ok += 1,
                Verdict::Bad => bad += 1,
                Verdict::Pending => pending += 1,
            }
        }
        (ok, bad, pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64) -> CatalogEntry {
        CatalogEntry {
            path: PathBuf::from(path),
            size,
        }
    }

    #[test]
    fn test_set_root_replaces_tracked_set() {
        let mut state = ScanState::default();
        state.set_root(PathBuf::from("/old"), vec![entry("/old/a.bin", 10)]);
        state.files.get_mut(&PathBuf::from("/old/a.bin")).unwrap().progress = 5;

        state.set_root(PathBuf::from("/new"), vec![entry("/new/b.bin", 20)]);
        assert_eq!(state.settings.folder, Some(PathBuf::from("/new")));
        assert_eq!(state.files.len(), 1);
        let rec = &state.files[&PathBuf::from("/new/b.bin")];
        assert_eq!(rec.progress, 0);
        assert_eq!(rec.size, 20);
    }

    #[test]
    fn test_add_files_appends_without_clobbering() {
        let mut state = ScanState::default();
        state.add_files(vec![entry("/x/a.bin", 10)]);
        {
            let rec = state.files.get_mut(&PathBuf::from("/x/a.bin")).unwrap();
            rec.progress = 7;
            rec.verdict = Verdict::Ok;
        }

        let added = state.add_files(vec![entry("/x/a.bin", 99), entry("/x/b.bin", 20)]);
        assert_eq!(added, 1);
        assert_eq!(state.files.len(), 2);

        // The existing record kept its progress, verdict, and original size.
        let rec = &state.files[&PathBuf::from("/x/a.bin")];
        assert_eq!(rec.progress, 7);
        assert_eq!(rec.verdict, Verdict::Ok);
        assert_eq!(rec.size, 10);
    }

    #[test]
    fn test_pending_tasks_skip_ok_records() {
        let mut state = ScanState::default();
        state.add_files(vec![
            entry("/q/a.bin", 10),
            entry("/q/b.bin", 20),
            entry("/q/c.bin", 30),
        ]);
        state.files.get_mut(&PathBuf::from("/q/a.bin")).unwrap().verdict = Verdict::Ok;
        state.files.get_mut(&PathBuf::from("/q/b.bin")).unwrap().verdict = Verdict::Bad;
        state.files.get_mut(&PathBuf::from("/q/c.bin")).unwrap().progress = 12;

        let tasks = state.pending_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].path, PathBuf::from("/q/b.bin"));
        assert_eq!(tasks[0].offset, 0);
        assert_eq!(tasks[1].path, PathBuf::from("/q/c.bin"));
        assert_eq!(tasks[1].offset, 12);
    }

    #[test]
    fn test_pending_task_offset_clamped_to_size() {
        let mut state = ScanState::default();
        state.add_files(vec![entry("/q/shrunk.bin", 10)]);
        state
            .files
            .get_mut(&PathBuf::from("/q/shrunk.bin"))
            .unwrap()
            .progress = 50;

        let tasks = state.pending_tasks();
        assert_eq!(tasks[0].offset, 10);
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let mut state = ScanState::default();
        state.set_root(PathBuf::from("/data"), vec![entry("/data/a.bin", 10)]);
        state.set_speed_limit(80);

        state.clear();
        assert_eq!(state, ScanState::default());
    }

    #[test]
    fn test_verdict_counts() {
        let mut state = ScanState::default();
        state.add_files(vec![
            entry("/v/a.bin", 1),
            entry("/v/b.bin", 1),
            entry("/v/c.bin", 1),
        ]);
        state.files.get_mut(&PathBuf::from("/v/a.bin")).unwrap().verdict = Verdict::Ok;
        state.files.get_mut(&PathBuf::from("/v/b.bin")).unwrap().verdict = Verdict::Bad;

        assert_eq!(state.verdict_counts(), (1, 1, 1));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut state = ScanState::default();
        state.add_files(vec![entry("/data/a.bin", 1024)]);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "folder": "",
                "speed_limit": 10,
                "files": {
                    "/data/a.bin": {
                        "size": 1024,
                        "progress": 0,
                        "cur_speed": 0.0,
                        "min_speed": null,
                        "max_wait": null,
                        "verdict": ""
                    }
                }
            })
        );
    }
}
