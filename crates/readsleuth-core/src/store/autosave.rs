/// Timer-driven snapshot autosave with an explicit stop.
///
/// Runs on its own thread, flushing the shared state to disk on a fixed
/// interval. `stop()` signals the loop and joins it; the thread always
/// writes one final snapshot on the way out, so an orderly shutdown never
/// loses the tail of the last interval.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::model::SharedState;
use crate::store::StateStore;

/// How often the live state is flushed to disk while a front end runs.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(2);

/// Stop-flag poll cadence; also bounds how long `stop()` blocks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running autosave loop.
///
/// Call [`AutosaveHandle::stop`] for an orderly shutdown with a final save.
/// Merely dropping the handle signals the thread but does not wait for it.
pub struct AutosaveHandle {
    stop_flag: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Signal the loop to stop, then wait for its final save to finish.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

/// Start saving `state` through `store` on a background thread.
pub fn start_autosave(store: StateStore, state: SharedState) -> AutosaveHandle {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_clone = stop_flag.clone();

    let thread = thread::Builder::new()
        .name("readsleuth-autosave".into())
        .spawn(move || {
            run_autosave(store, state, stop_clone);
        })
        .expect("failed to spawn autosave thread");

    AutosaveHandle {
        stop_flag,
        thread: Some(thread),
    }
}

/// Autosave thread body: periodic saves, one final save on exit.
fn run_autosave(store: StateStore, state: SharedState, stop: Arc<AtomicBool>) {
    debug!(
        "Autosave: every {AUTOSAVE_INTERVAL:?} to {}",
        store.path().display()
    );
    let mut last_save = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        thread::sleep(POLL_INTERVAL);
        if last_save.elapsed() >= AUTOSAVE_INTERVAL {
            save_once(&store, &state);
            last_save = Instant::now();
        }
    }

    save_once(&store, &state);
    debug!("Autosave: stopped");
}

/// One save attempt. Failure is logged and the in-memory state remains the
/// source of truth until the next attempt lands.
fn save_once(store: &StateStore, state: &SharedState) {
    let snapshot = state.read().clone();
    if let Err(err) = store.save(&snapshot) {
        warn!("Autosave: save to {} failed: {err}", store.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScanState;
    use parking_lot::RwLock;

    #[test]
    fn test_stop_writes_final_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let state: SharedState = Arc::new(RwLock::new(ScanState::default()));
        state.write().set_speed_limit(33);

        let handle = start_autosave(store.clone(), state);
        // Stop before the first interval: only the final save can have run.
        handle.stop();

        let restored = store.load().expect("final save must exist");
        assert_eq!(restored.settings.speed_limit, 33);
    }

    #[test]
    fn test_periodic_save_lands_within_interval() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let state: SharedState = Arc::new(RwLock::new(ScanState::default()));

        let handle = start_autosave(store.clone(), state.clone());
        state.write().set_speed_limit(77);

        // The change must hit the disk without any stop signal.
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        while Instant::now() < deadline {
            if let Some(snap) = store.load() {
                if snap.settings.speed_limit == 77 {
                    seen = true;
                    break;
                }
            }
            thread::sleep(Duration::from_millis(100));
        }
        handle.stop();
        assert!(seen, "autosave never flushed the updated state");
    }
}
