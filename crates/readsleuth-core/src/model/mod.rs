/// Data model for the ReadSleuth tracked-file set.
///
/// Re-exports the per-file record, the settings, the shared state wrapper,
/// and display formatting helpers.
pub mod record;
pub mod settings;
pub mod size;
pub mod state;

pub use record::{FileRecord, Verdict};
pub use settings::ScanSettings;
pub use state::{ReadTask, ScanState, SharedState};
