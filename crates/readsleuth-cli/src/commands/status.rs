/// The `status` subcommand: print the tracked set with per-file telemetry,
/// optionally filtered by verdict.
use readsleuth_core::catalog::display_name;
use readsleuth_core::model::size::{format_size, format_speed, format_wait};
use readsleuth_core::model::FileRecord;
use readsleuth_core::store::StateStore;

use crate::commands::load_snapshot;
use crate::VerdictFilter;

const RULE_WIDTH: usize = 72;

pub fn run(store: &StateStore, filter: VerdictFilter) -> anyhow::Result<()> {
    let Some(snapshot) = load_snapshot(store) else {
        return Ok(());
    };
    let root = snapshot.settings.folder.as_deref();

    println!("{}", "─".repeat(RULE_WIDTH));
    match root {
        Some(folder) => println!(
            " {}  (limit {} MB/s)",
            folder.display(),
            snapshot.settings.speed_limit
        ),
        None => println!(
            " manual file list  (limit {} MB/s)",
            snapshot.settings.speed_limit
        ),
    }
    println!("{}", "─".repeat(RULE_WIDTH));

    let mut shown = 0usize;
    for (path, record) in &snapshot.files {
        if !filter.matches(record.verdict) {
            continue;
        }
        shown += 1;
        println!(" {}", row(&display_name(path, root), record));
    }
    if shown == 0 {
        println!(" (no matching files)");
    }

    let (ok, bad, pending) = snapshot.verdict_counts();
    println!("{}", "─".repeat(RULE_WIDTH));
    println!(
        " {} tracked: {ok} OK, {bad} BAD, {pending} pending",
        snapshot.files.len()
    );
    Ok(())
}

/// One table row: verdict, progress, size, last/worst speed, worst wait, name.
fn row(name: &str, record: &FileRecord) -> String {
    let min = record
        .min_speed
        .map(format_speed)
        .unwrap_or_else(|| "-".into());
    let wait = record
        .max_wait
        .map(format_wait)
        .unwrap_or_else(|| "-".into());
    format!(
        "{:<4} {:>4}% {:>10} {:>10} {:>10} {:>9}  {}",
        record.verdict.label(),
        record.percent(),
        format_size(record.size),
        format_speed(record.cur_speed),
        min,
        wait,
        name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use readsleuth_core::model::Verdict;

    #[test]
    fn test_row_pending_record_shows_blanks() {
        let rec = FileRecord::discovered(2048);
        let text = row("fresh.bin", &rec);
        assert!(text.contains("0%"));
        assert!(text.contains("2.0 KB"));
        assert!(text.contains("0.0 MB/s"));
        assert!(text.contains('-'));
        assert!(text.ends_with("fresh.bin"));
        assert!(!text.contains("OK") && !text.contains("BAD"));
    }

    #[test]
    fn test_row_decided_record_shows_extremes() {
        let mut rec = FileRecord::discovered(1024 * 1024);
        rec.progress = rec.size;
        rec.cur_speed = 10.0;
        rec.min_speed = Some(8.5);
        rec.max_wait = Some(0.012);
        rec.verdict = Verdict::Ok;

        let text = row("sub/a.bin", &rec);
        assert!(text.starts_with("OK"));
        assert!(text.contains("100%"));
        assert!(text.contains("1.0 MB"));
        assert!(text.contains("10.0 MB/s"));
        assert!(text.contains("8.5 MB/s"));
        assert!(text.contains("0.012 s"));
    }
}
