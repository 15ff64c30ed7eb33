/// The `add` subcommand: track explicit files alongside whatever a folder
/// enumeration produced, without touching existing records.
use std::path::PathBuf;

use anyhow::Context;

use readsleuth_core::catalog::resolve_manual;
use readsleuth_core::store::StateStore;

pub fn run(store: &StateStore, files: &[PathBuf]) -> anyhow::Result<()> {
    let mut snapshot = store.load().unwrap_or_default();

    let outcome = resolve_manual(files);
    let added = snapshot.add_files(outcome.accepted);
    if added > 0 {
        store.save(&snapshot).context("cannot write snapshot")?;
    }

    println!(
        "Added {added} file(s); {} tracked in total.",
        snapshot.files.len()
    );
    if !outcome.rejected.is_empty() {
        eprintln!("Rejected {} path(s):", outcome.rejected.len());
        for path in &outcome.rejected {
            eprintln!("  {}  (missing or not a regular file)", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_add_tracks_accepted_files() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let good = dir.path().join("good.bin");
        fs::write(&good, vec![0u8; 64]).unwrap();
        let missing = dir.path().join("missing.bin");
        let store = StateStore::new(dir.path().join("state.json"));

        run(&store, &[good, missing]).unwrap();

        let snapshot = store.load().expect("snapshot written");
        assert_eq!(snapshot.files.len(), 1);
        let tracked = snapshot.files.keys().next().unwrap();
        assert!(tracked.ends_with("good.bin"));
        assert_eq!(snapshot.files[tracked].size, 64);
    }

    #[test]
    fn test_add_nothing_accepted_writes_no_snapshot() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = StateStore::new(dir.path().join("state.json"));

        run(&store, &[dir.path().join("missing.bin")]).unwrap();

        assert!(store.load().is_none());
    }
}
