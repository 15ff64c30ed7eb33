/// The `scan` subcommand: enumerate (optionally), then verify every tracked
/// file that is not yet OK, rendering live progress on stdout.
///
/// Layout during a run: one carriage-return live line for the file currently
/// being read, replaced by a permanent verdict line when the file is decided.
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use compact_str::CompactString;
use crossbeam_channel::Receiver;
use parking_lot::RwLock;

use readsleuth_core::catalog::{display_name, scan_root};
use readsleuth_core::model::size::{format_size, format_speed};
use readsleuth_core::model::{FileRecord, SharedState};
use readsleuth_core::scanner::events::ScanEvent;
use readsleuth_core::scanner::start_scan;
use readsleuth_core::store::autosave::start_autosave;
use readsleuth_core::store::StateStore;

pub fn run(
    store: &StateStore,
    root: Option<&Path>,
    speed_limit: Option<u32>,
) -> anyhow::Result<()> {
    let mut snapshot = store.load().unwrap_or_default();

    if let Some(root) = root {
        let (root, entries) = scan_root(root)
            .with_context(|| format!("cannot enumerate {}", root.display()))?;
        println!(
            "Tracking {} file(s) under {}",
            entries.len(),
            root.display()
        );
        snapshot.set_root(root, entries);
    }
    if let Some(limit) = speed_limit {
        snapshot.set_speed_limit(limit);
    }

    if snapshot.files.is_empty() {
        bail!(
            "nothing to verify; select a folder with `readsleuth scan <DIR>` \
             or add files with `readsleuth add <FILE>...`"
        );
    }

    // Persist the catalog and settings before the run so an interruption
    // during the first autosave interval cannot lose them.
    store.save(&snapshot).context("cannot write snapshot")?;

    let pending = snapshot.pending_tasks().len();
    let total = snapshot.files.len();
    if pending == 0 {
        println!("All {total} tracked file(s) already verified OK.");
        return Ok(());
    }
    println!(
        "Verifying {pending} of {total} tracked file(s) at {} MB/s",
        snapshot.settings.speed_limit
    );

    let state: SharedState = Arc::new(RwLock::new(snapshot));
    let autosave = start_autosave(store.clone(), Arc::clone(&state));
    let handle = start_scan(Arc::clone(&state));

    render_events(&handle.events_rx, &state);

    handle.join();
    autosave.stop();

    let (ok, bad, pending) = state.read().verdict_counts();
    println!("Done: {ok} OK, {bad} BAD, {pending} pending");
    Ok(())
}

/// Drain scan events until the run finishes, drawing the live line on stdout.
fn render_events(events: &Receiver<ScanEvent>, state: &SharedState) {
    let root = state.read().settings.folder.clone();
    let mut line = LiveLine::default();
    let mut out = io::stdout();

    while let Ok(event) = events.recv() {
        match event {
            ScanEvent::Progress { path, percent } => {
                line.switch_to(&path, root.as_deref());
                line.percent = percent;
                line.draw(&mut out);
            }
            ScanEvent::CurrentSpeed { path, mb_per_sec } => {
                line.switch_to(&path, root.as_deref());
                line.speed = mb_per_sec;
                line.draw(&mut out);
            }
            // Extremes are persisted in the snapshot; `status` shows them.
            ScanEvent::MinSpeed { .. } | ScanEvent::MaxWait { .. } => {}
            ScanEvent::Verdict { path, ok } => {
                line.finish(&mut out);
                let name = display_name(&path, root.as_deref());
                let record = state.read().files.get(&path).cloned();
                println!("{}", verdict_line(&name, ok, record.as_ref()));
            }
            ScanEvent::RunFinished => {
                line.finish(&mut out);
                break;
            }
        }
    }
}

/// Permanent one-line summary printed when a file is decided.
fn verdict_line(name: &str, ok: bool, record: Option<&FileRecord>) -> String {
    let label = if ok { "OK" } else { "BAD" };
    match record {
        Some(rec) if ok => {
            let min = rec
                .min_speed
                .map(format_speed)
                .unwrap_or_else(|| "-".into());
            format!("  {label:<4} {name}  ({}, min {min})", format_size(rec.size))
        }
        Some(rec) => format!("  {label:<4} {name}  (stopped at {}%)", rec.percent()),
        None => format!("  {label:<4} {name}"),
    }
}

/// Carriage-return progress line for the file currently being read.
///
/// Tracks its own printed width so a redraw fully overwrites the previous
/// text even when the new text is shorter.
#[derive(Default)]
struct LiveLine {
    path: Option<PathBuf>,
    name: CompactString,
    percent: u8,
    speed: f64,
    width: usize,
}

impl LiveLine {
    /// Point the line at a file, resetting stats when the file changes.
    fn switch_to(&mut self, path: &Path, root: Option<&Path>) {
        if self.path.as_deref() == Some(path) {
            return;
        }
        self.path = Some(path.to_path_buf());
        self.name = display_name(path, root);
        self.percent = 0;
        self.speed = 0.0;
    }

    fn draw(&mut self, out: &mut impl Write) {
        let text = format!(
            "  {:>3}%  {:>10}  {}",
            self.percent,
            format_speed(self.speed),
            self.name
        );
        let pad = self.width.saturating_sub(text.chars().count());
        let _ = write!(out, "\r{text}{}", " ".repeat(pad));
        let _ = out.flush();
        self.width = text.chars().count();
    }

    /// Erase the live line so the next `println!` starts on a clean column.
    fn finish(&mut self, out: &mut impl Write) {
        if self.width > 0 {
            let _ = write!(out, "\r{}\r", " ".repeat(self.width));
            let _ = out.flush();
            self.width = 0;
        }
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readsleuth_core::model::Verdict;

    #[test]
    fn test_live_line_overdraws_shorter_text() {
        let mut line = LiveLine::default();
        line.switch_to(Path::new("/data/a-rather-long-name.bin"), None);
        line.percent = 50;

        let mut buf: Vec<u8> = Vec::new();
        line.draw(&mut buf);
        let first_width = line.width;

        line.switch_to(Path::new("/data/x.bin"), None);
        let mut buf: Vec<u8> = Vec::new();
        line.draw(&mut buf);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with('\r'));
        // Shorter redraw pads out to the previous width.
        assert_eq!(text.chars().count() - 1, first_width);
        assert!(line.width < first_width);
    }

    #[test]
    fn test_switch_to_resets_stats_on_new_file() {
        let mut line = LiveLine::default();
        line.switch_to(Path::new("/data/a.bin"), None);
        line.percent = 80;
        line.speed = 42.0;

        // Same file: stats survive.
        line.switch_to(Path::new("/data/a.bin"), None);
        assert_eq!(line.percent, 80);

        // New file: stats reset.
        line.switch_to(Path::new("/data/b.bin"), None);
        assert_eq!(line.percent, 0);
        assert_eq!(line.speed, 0.0);
        assert_eq!(line.name, "/data/b.bin");
    }

    #[test]
    fn test_finish_erases_and_forgets_file() {
        let mut line = LiveLine::default();
        line.switch_to(Path::new("/data/a.bin"), None);
        let mut buf: Vec<u8> = Vec::new();
        line.draw(&mut buf);

        let mut buf: Vec<u8> = Vec::new();
        line.finish(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with('\r') && text.ends_with('\r'));
        assert_eq!(line.width, 0);
        assert!(line.path.is_none());

        // Erasing an already-clean line writes nothing.
        let mut buf: Vec<u8> = Vec::new();
        line.finish(&mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_verdict_line_ok_shows_size_and_min_speed() {
        let mut rec = FileRecord::discovered(2 * 1024 * 1024);
        rec.min_speed = Some(9.25);
        rec.verdict = Verdict::Ok;

        let text = verdict_line("movies/a.mkv", true, Some(&rec));
        assert!(text.contains("OK"));
        assert!(text.contains("movies/a.mkv"));
        assert!(text.contains("2.0 MB"));
        assert!(text.contains("9.2 MB/s") || text.contains("9.3 MB/s"));
    }

    #[test]
    fn test_verdict_line_bad_shows_stop_percent() {
        let mut rec = FileRecord::discovered(1000);
        rec.progress = 370;
        rec.verdict = Verdict::Bad;

        let text = verdict_line("b.bin", false, Some(&rec));
        assert!(text.contains("BAD"));
        assert!(text.contains("stopped at 37%"));
    }
}
