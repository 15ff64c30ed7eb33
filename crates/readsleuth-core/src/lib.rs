/// ReadSleuth Core: throttled read-health scanning and resumable state.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI,
/// service).
///
/// # Modules
///
/// - [`model`] - Per-file records, settings, and the shared scan state.
/// - [`catalog`] - Directory and manual-list file enumeration.
/// - [`scanner`] - The scan coordinator and the throttled reader.
/// - [`store`] - Durable JSON snapshots plus the timed autosave loop.
pub mod catalog;
pub mod model;
pub mod scanner;
pub mod store;
