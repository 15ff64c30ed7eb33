/// Per-file scan record: read telemetry and the pass/fail verdict for one
/// tracked file.
///
/// Records live in the tracked map keyed by absolute path; the path itself is
/// the primary key and is not duplicated inside the record.
use serde::{Deserialize, Serialize};

/// Terminal classification of one file's read health.
///
/// Serialized as `""` / `"OK"` / `"BAD"` in the snapshot file. A file with an
/// `Ok` verdict is excluded from future scan queues until explicitly cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Not yet decided: fresh, mid-scan, or cancelled part-way.
    #[default]
    #[serde(rename = "")]
    Pending,
    /// Full read completed with every full chunk at or above the speed floor.
    #[serde(rename = "OK")]
    Ok,
    /// Read error, or a full chunk fell below the speed floor.
    #[serde(rename = "BAD")]
    Bad,
}

impl Verdict {
    /// Whether the file has reached a terminal pass/fail classification.
    pub fn is_decided(self) -> bool {
        self != Verdict::Pending
    }

    /// Short display label, matching the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pending => "",
            Verdict::Ok => "OK",
            Verdict::Bad => "BAD",
        }
    }
}

/// One tracked file's scan state.
///
/// `progress` is an exact byte offset (the resume position), never a percent;
/// percentages appear only in progress events and display formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Byte length at discovery, refreshed whenever the file is reopened.
    pub size: u64,
    /// Bytes confirmed readable so far; `0 <= progress <= size`.
    pub progress: u64,
    /// Most recent measured chunk throughput in MB/s (0.0 until the first
    /// chunk completes).
    pub cur_speed: f64,
    /// Lowest chunk throughput seen for this file, absent until a chunk has
    /// been measured.
    pub min_speed: Option<f64>,
    /// Largest throttle sleep inserted for this file in seconds, absent until
    /// the pacer has slept at least once.
    pub max_wait: Option<f64>,
    /// Pass/fail classification; `Pending` until a scan decides.
    pub verdict: Verdict,
}

impl FileRecord {
    /// Fresh record for a newly discovered file.
    pub fn discovered(size: u64) -> Self {
        Self {
            size,
            progress: 0,
            cur_speed: 0.0,
            min_speed: None,
            max_wait: None,
            verdict: Verdict::Pending,
        }
    }

    /// Whole-file progress as a display percentage (0..=100).
    ///
    /// A zero-length file reads 0% until decided, then 100%.
    pub fn percent(&self) -> u8 {
        if self.size == 0 {
            if self.verdict.is_decided() {
                100
            } else {
                0
            }
        } else {
            ((self.progress.min(self.size) * 100) / self.size) as u8
        }
    }
}
