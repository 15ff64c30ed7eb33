/// The `export` subcommand: per-file results as CSV, to a file or stdout.
///
/// Numeric columns stay machine-readable (raw bytes, three-decimal floats);
/// human formatting belongs to `status`.
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;

use readsleuth_core::model::ScanState;
use readsleuth_core::store::StateStore;

use crate::commands::load_snapshot;

const HEADER: [&str; 7] = [
    "file",
    "size_bytes",
    "progress_pct",
    "cur_speed_mbs",
    "min_speed_mbs",
    "max_wait_s",
    "verdict",
];

pub fn run(store: &StateStore, output: Option<&Path>) -> anyhow::Result<()> {
    let Some(snapshot) = load_snapshot(store) else {
        return Ok(());
    };

    match output {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let rows = write_rows(&mut writer, &snapshot)?;
            eprintln!("Exported {rows} row(s) to {}", path.display());
        }
        None => {
            let mut writer = csv::Writer::from_writer(io::stdout().lock());
            write_rows(&mut writer, &snapshot)?;
        }
    }
    Ok(())
}

/// Write the header and one row per tracked file. Returns the row count.
fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    snapshot: &ScanState,
) -> anyhow::Result<usize> {
    writer.write_record(HEADER)?;

    for (path, record) in &snapshot.files {
        let file = path.display().to_string();
        let size = record.size.to_string();
        let pct = record.percent().to_string();
        let cur = format!("{:.3}", record.cur_speed);
        let min = record
            .min_speed
            .map(|v| format!("{v:.3}"))
            .unwrap_or_default();
        let wait = record
            .max_wait
            .map(|v| format!("{v:.3}"))
            .unwrap_or_default();

        writer.write_record([
            file.as_str(),
            size.as_str(),
            pct.as_str(),
            cur.as_str(),
            min.as_str(),
            wait.as_str(),
            record.verdict.label(),
        ])?;
    }

    writer.flush()?;
    Ok(snapshot.files.len())
}
