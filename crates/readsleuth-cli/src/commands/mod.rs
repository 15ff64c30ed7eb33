/// Command implementations, one module per subcommand.
pub mod add;
pub mod clear;
pub mod export;
pub mod scan;
pub mod status;

use readsleuth_core::model::ScanState;
use readsleuth_core::store::StateStore;

/// Load the snapshot for read-only commands, telling the operator when there
/// is nothing to show.
pub(crate) fn load_snapshot(store: &StateStore) -> Option<ScanState> {
    let snapshot = store.load();
    if snapshot.is_none() {
        println!(
            "No snapshot at {} (run `readsleuth scan <DIR>` first)",
            store.path().display()
        );
    }
    snapshot
}
