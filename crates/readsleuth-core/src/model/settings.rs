/// Global scan settings: the selected root folder and the operator-tunable
/// throughput ceiling.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Lowest accepted speed limit in MB/s.
pub const MIN_SPEED_LIMIT_MBS: u32 = 1;

/// Highest accepted speed limit in MB/s.
pub const MAX_SPEED_LIMIT_MBS: u32 = 100;

/// Default speed limit in MB/s.
///
/// Conservative enough that a scan does not monopolize shared media while
/// still finishing a typical audit in reasonable time.
pub const DEFAULT_SPEED_LIMIT_MBS: u32 = 10;

/// The two operator-facing settings, persisted with the tracked set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Selected root folder; `None` when only manually added files are
    /// tracked. Stored in the snapshot as a plain string, empty when unset.
    #[serde(with = "folder_string")]
    pub folder: Option<PathBuf>,
    /// Throughput ceiling in MB/s, always within 1..=100.
    pub speed_limit: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            folder: None,
            speed_limit: DEFAULT_SPEED_LIMIT_MBS,
        }
    }
}

impl ScanSettings {
    /// Force a requested limit into the accepted 1..=100 range.
    pub fn clamp_speed_limit(limit: u32) -> u32 {
        limit.clamp(MIN_SPEED_LIMIT_MBS, MAX_SPEED_LIMIT_MBS)
    }
}

/// Snapshot files store the folder as a plain string, empty when unset.
mod folder_string {
    use std::path::PathBuf;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(folder: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match folder {
            Some(path) => serializer.serialize_str(&path.to_string_lossy()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(raw)))
        }
    }
}
