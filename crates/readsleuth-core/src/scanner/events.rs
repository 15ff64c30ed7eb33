/// Scan event stream: lightweight messages sent from the scan thread to the
/// consumer via a crossbeam channel.
use std::path::PathBuf;

/// Events emitted during a scan run.
///
/// Authoritative per-file state lives in the shared `ScanState`; these
/// messages carry only what a front end needs to render live updates.
/// Events for one file never interleave with another file's, and progress
/// within a file is monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// Whole-file progress as a display percentage.
    Progress { path: PathBuf, percent: u8 },
    /// Throughput of the most recently completed chunk.
    CurrentSpeed { path: PathBuf, mb_per_sec: f64 },
    /// Lowest chunk throughput seen so far for this file.
    MinSpeed { path: PathBuf, mb_per_sec: f64 },
    /// Largest single throttle sleep inserted so far for this file.
    MaxWait { path: PathBuf, seconds: f64 },
    /// Terminal per-file outcome: `ok` is false for a read error or a
    /// sustained under-speed chunk. Cancelled files get no verdict.
    Verdict { path: PathBuf, ok: bool },
    /// The run is over: queue exhausted or cancellation observed. Always the
    /// final event of a run.
    RunFinished,
}
