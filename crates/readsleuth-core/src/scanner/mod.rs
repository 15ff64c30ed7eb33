/// Scan coordinator: drives the throttled reader over the queue of pending
/// files on a dedicated thread.
///
/// Files are processed strictly one at a time. Parallel reads from the same
/// device would contend for bandwidth and corrupt the per-file speed signal,
/// so serial order is the point, not a limitation. The consumer receives a
/// rate-limited event stream through a bounded channel and can cancel
/// cooperatively at any moment; per-file progress survives in the shared
/// state for later resume.
pub mod events;
pub mod reader;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info};

use crate::model::SharedState;
use events::ScanEvent;
use reader::{FileReader, ReadOutcome};

/// Maximum number of events that may queue up in the channel.
///
/// The reader emits at most one batch (four events) per 200 ms per file plus
/// a couple per verdict, so even a consumer that drains once a second stays
/// far below this. The bound exists to surface a stuck consumer during
/// development rather than to provide backpressure.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// Handle to a running or completed scan. Allows cancellation, live
/// speed-limit changes, receiving events, and joining the scan thread.
pub struct ScanHandle {
    /// Receiver for events from the scan thread.
    pub events_rx: Receiver<ScanEvent>,
    /// State the scan thread updates in place.
    state: SharedState,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Change the throughput ceiling mid-run; the reader picks the new value
    /// up on its next pacing decision.
    pub fn set_speed_limit(&self, limit: u32) {
        self.state.write().set_speed_limit(limit);
    }

    /// Wait for the scan thread to exit, discarding undelivered events.
    ///
    /// The receiver is disconnected before blocking. A scan thread parked on
    /// a send into the full event channel then fails that send and reaches
    /// its next cancel check instead of wedging the join, so calling this
    /// right after `cancel()` is safe no matter how many events went
    /// undrained. Joining without `cancel()` waits for the whole queue. Join
    /// before any wholesale mutation of the shared state (such as clear-all),
    /// so the scan thread cannot observe a torn tracked set.
    pub fn join(self) {
        let Self { events_rx, thread, .. } = self;
        drop(events_rx);
        if let Some(thread) = thread {
            let _ = thread.join();
        }
    }
}

/// Start a scan run over every tracked file that is not yet OK.
///
/// Returns immediately; the run proceeds on a named background thread and
/// reports through the handle's event channel, always ending with
/// `RunFinished` even when the queue is empty or the thread fails.
pub fn start_scan(state: SharedState) -> ScanHandle {
    let (events_tx, events_rx) = crossbeam_channel::bounded::<ScanEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();
    let state_clone = state.clone();

    let thread = thread::Builder::new()
        .name("readsleuth-scanner".into())
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                run_scan(&state_clone, &events_tx, &cancel_clone);
            }));
            if let Err(payload) = result {
                error!("Scan thread panicked: {}", panic_message(&payload));
                let _ = events_tx.send(ScanEvent::RunFinished);
            }
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        events_rx,
        state,
        cancel_flag,
        thread: Some(thread),
    }
}

/// Scan thread body: build the queue, drive the reader serially, emit the
/// terminal event.
fn run_scan(state: &SharedState, events_tx: &Sender<ScanEvent>, cancel: &Arc<AtomicBool>) {
    let tasks = state.read().pending_tasks();
    if tasks.is_empty() {
        info!("Scan: nothing to do, every tracked file is already OK");
        let _ = events_tx.send(ScanEvent::RunFinished);
        return;
    }

    let limit = state.read().settings.speed_limit;
    info!(
        "Scan: starting over {} pending files at {limit} MB/s",
        tasks.len()
    );
    let started = Instant::now();

    let reader = FileReader::new(state.clone(), events_tx.clone(), cancel.clone());
    let mut completed: usize = 0;
    let mut failed: usize = 0;
    let mut was_cancelled = false;

    for task in tasks {
        if cancel.load(Ordering::Relaxed) {
            was_cancelled = true;
            break;
        }
        match reader.read_file(&task.path, task.offset) {
            ReadOutcome::Completed => completed += 1,
            ReadOutcome::Failed => failed += 1,
            ReadOutcome::Cancelled => {
                was_cancelled = true;
                break;
            }
        }
    }

    if was_cancelled {
        info!(
            "Scan: cancelled after {completed} OK / {failed} BAD in {:?}",
            started.elapsed()
        );
    } else {
        info!(
            "Scan: finished, {completed} OK / {failed} BAD in {:?}",
            started.elapsed()
        );
    }
    let _ = events_tx.send(ScanEvent::RunFinished);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
