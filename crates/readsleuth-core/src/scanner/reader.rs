/// Throttled file reader: reads one file from a resume offset to its end at
/// a capped pace, sampling chunk throughput and watching for stalls.
///
/// The read is structured as logical chunks split into small sub-chunks.
/// Every sub-chunk is paced individually (read, then sleep off the remainder
/// of its ideal duration at the live speed limit), polls cancellation, and
/// updates the shared record. Every completed chunk yields one throughput
/// sample; a full chunk measured below the speed floor fails the file on the
/// spot. Events to the consumer are rate-limited; the shared record is not.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::model::{FileRecord, SharedState, Verdict};
use crate::scanner::events::ScanEvent;

/// Logical chunk size: the unit of one throughput sample and one under-speed
/// check.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Sub-chunk size: the unit of one read call, one pacing sleep, and one
/// cancellation poll. Much smaller than the chunk so pacing stays smooth and
/// cancellation stays responsive even at low speed limits.
pub const SUB_CHUNK_SIZE: usize = 64 * 1024;

/// A full chunk measured strictly below this throughput (MB/s) flags the
/// file BAD.
///
/// 0.1 MB/s is far below any healthy medium; a chunk this slow means the
/// device is stalling on that region, not merely busy.
pub const MIN_CHUNK_SPEED_MBS: f64 = 0.1;

/// Minimum spacing between event emissions for one file.
///
/// Protects a slow consumer from being flooded; the shared record and the
/// min/max accumulators still update on every sub-chunk.
pub const EVENT_INTERVAL: Duration = Duration::from_millis(200);

/// Bytes per MB in speed arithmetic (binary, matching the display units).
const MB: f64 = 1024.0 * 1024.0;

/// Reader knobs: fixed production values, shrunk in tests so small fixture
/// files still exercise the multi-chunk paths.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReaderTuning {
    pub chunk_size: usize,
    pub sub_chunk_size: usize,
    pub min_chunk_speed: f64,
    pub event_interval: Duration,
}

impl Default for ReaderTuning {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            sub_chunk_size: SUB_CHUNK_SIZE,
            min_chunk_speed: MIN_CHUNK_SPEED_MBS,
            event_interval: EVENT_INTERVAL,
        }
    }
}

/// How a single file's read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// Reached end of file; verdict OK recorded.
    Completed,
    /// Read error or under-speed chunk; verdict BAD recorded.
    Failed,
    /// Cancellation observed; no verdict, progress kept for resume.
    Cancelled,
}

/// Reads files one at a time on behalf of the scan coordinator.
pub(crate) struct FileReader {
    state: SharedState,
    events: Sender<ScanEvent>,
    cancel: Arc<AtomicBool>,
    tuning: ReaderTuning,
}

impl FileReader {
    pub(crate) fn new(
        state: SharedState,
        events: Sender<ScanEvent>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self::with_tuning(state, events, cancel, ReaderTuning::default())
    }

    pub(crate) fn with_tuning(
        state: SharedState,
        events: Sender<ScanEvent>,
        cancel: Arc<AtomicBool>,
        tuning: ReaderTuning,
    ) -> Self {
        Self {
            state,
            events,
            cancel,
            tuning,
        }
    }

    /// Read `path` from `start_offset` to end of file at the paced rate.
    ///
    /// Updates the shared record on every sub-chunk and emits rate-limited
    /// events; ends with either a verdict event or a silent cancellation.
    pub(crate) fn read_file(&self, path: &Path, start_offset: u64) -> ReadOutcome {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(err) => {
                warn!("Read: cannot open {}: {err}", path.display());
                return self.fail(path);
            }
        };
        let size = match file.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => {
                warn!("Read: cannot stat {}: {err}", path.display());
                return self.fail(path);
            }
        };

        // The discovery-time size may be stale; the fresh one is authoritative.
        self.update_record(path, |rec| rec.size = size);

        if size == 0 {
            // Nothing to read: an empty file is trivially healthy.
            self.update_record(path, |rec| rec.verdict = Verdict::Ok);
            let _ = self.events.send(ScanEvent::Progress {
                path: path.to_path_buf(),
                percent: 100,
            });
            let _ = self.events.send(ScanEvent::Verdict {
                path: path.to_path_buf(),
                ok: true,
            });
            return ReadOutcome::Completed;
        }

        let mut pos = start_offset;
        if pos > size {
            debug!(
                "Read: offset {pos} is beyond the {size} byte file {}; restarting from 0",
                path.display()
            );
            pos = 0;
        }
        if pos > 0 {
            if let Err(err) = file.seek(SeekFrom::Start(pos)) {
                warn!("Read: cannot seek {}: {err}", path.display());
                return self.fail(path);
            }
            debug!("Read: resuming {} at byte {pos}", path.display());
        }
        self.update_record(path, |rec| rec.progress = pos);

        let mut buf = vec![0u8; self.tuning.sub_chunk_size];
        let mut cur_speed: Option<f64> = None;
        let mut min_speed: Option<f64> = None;
        let mut max_wait: Option<f64> = None;
        // None means "never emitted": the first sub-chunk always reports.
        let mut last_emit: Option<Instant> = None;

        while pos < size {
            let chunk_budget = self.tuning.chunk_size.min((size - pos) as usize);
            let chunk_is_full = chunk_budget == self.tuning.chunk_size;
            let chunk_start = Instant::now();
            let mut chunk_read: usize = 0;

            while chunk_read < chunk_budget {
                if self.cancel.load(Ordering::Relaxed) {
                    debug!("Read: cancelled at byte {pos} of {}", path.display());
                    return ReadOutcome::Cancelled;
                }

                let want = self.tuning.sub_chunk_size.min(chunk_budget - chunk_read);
                let sub_start = Instant::now();
                let got = match file.read(&mut buf[..want]) {
                    Ok(0) => {
                        // End of file before the stat size: truncated under us.
                        warn!(
                            "Read: unexpected end of file at byte {pos} in {}",
                            path.display()
                        );
                        return self.fail(path);
                    }
                    Ok(n) => n,
                    Err(err) => {
                        warn!("Read: error at byte {pos} in {}: {err}", path.display());
                        return self.fail(path);
                    }
                };

                // Pace: sleep off the remainder of this sub-chunk's ideal
                // duration at the live limit. Never negative, so a slow
                // device is left untouched.
                let limit = self.state.read().settings.speed_limit.max(1) as f64;
                let ideal = (got as f64 / MB) / limit;
                let elapsed = sub_start.elapsed().as_secs_f64();
                let wait = ideal - elapsed;
                if wait > 0.0 {
                    std::thread::sleep(Duration::from_secs_f64(wait));
                    if max_wait.is_none_or(|w| wait > w) {
                        max_wait = Some(wait);
                    }
                }

                chunk_read += got;
                pos += got as u64;
                self.update_record(path, |rec| {
                    rec.progress = pos;
                    rec.max_wait = max_wait;
                });

                if self.emit_due(last_emit) {
                    self.emit(path, pos, size, cur_speed, min_speed, max_wait);
                    last_emit = Some(Instant::now());
                }
            }

            // One chunk done: sample its realized throughput, sleeps included.
            let chunk_secs = chunk_start.elapsed().as_secs_f64().max(1e-9);
            let speed = (chunk_read as f64 / MB) / chunk_secs;
            cur_speed = Some(speed);
            if min_speed.is_none_or(|m| speed < m) {
                min_speed = Some(speed);
            }
            self.update_record(path, |rec| {
                rec.cur_speed = speed;
                rec.min_speed = min_speed;
            });

            // The floor only applies to full chunks; a short tail measures
            // too little data for a fair sample.
            if chunk_is_full && speed < self.tuning.min_chunk_speed {
                warn!(
                    "Read: under-speed chunk in {}: {speed:.3} MB/s is below the {} MB/s floor",
                    path.display(),
                    self.tuning.min_chunk_speed
                );
                return self.fail(path);
            }
        }

        // End of file reached: the whole file read clean at pace.
        self.update_record(path, |rec| {
            rec.progress = size;
            rec.verdict = Verdict::Ok;
        });
        self.emit(path, size, size, cur_speed, min_speed, max_wait);
        let _ = self.events.send(ScanEvent::Verdict {
            path: path.to_path_buf(),
            ok: true,
        });
        debug!("Read: OK {} ({size} bytes)", path.display());
        ReadOutcome::Completed
    }

    /// Mark the file BAD in the record and tell the consumer.
    fn fail(&self, path: &Path) -> ReadOutcome {
        self.update_record(path, |rec| rec.verdict = Verdict::Bad);
        let _ = self.events.send(ScanEvent::Verdict {
            path: path.to_path_buf(),
            ok: false,
        });
        ReadOutcome::Failed
    }

    /// Apply `mutate` to this file's record under a brief write lock.
    ///
    /// A record can only vanish via clear-all, which consumers must not run
    /// while a scan is live; if it is gone anyway, the update is dropped.
    fn update_record(&self, path: &Path, mutate: impl FnOnce(&mut FileRecord)) {
        let mut state = self.state.write();
        if let Some(record) = state.files.get_mut(path) {
            mutate(record);
        }
    }

    fn emit_due(&self, last_emit: Option<Instant>) -> bool {
        last_emit.is_none_or(|at| at.elapsed() >= self.tuning.event_interval)
    }

    /// Send one rate-limited event batch: current speed, progress, and the
    /// extremes, in that order, skipping stats that have no value yet.
    fn emit(
        &self,
        path: &Path,
        pos: u64,
        size: u64,
        cur_speed: Option<f64>,
        min_speed: Option<f64>,
        max_wait: Option<f64>,
    ) {
        if let Some(mb_per_sec) = cur_speed {
            let _ = self.events.send(ScanEvent::CurrentSpeed {
                path: path.to_path_buf(),
                mb_per_sec,
            });
        }
        let percent = ((pos.min(size) * 100) / size) as u8;
        let _ = self.events.send(ScanEvent::Progress {
            path: path.to_path_buf(),
            percent,
        });
        if let Some(mb_per_sec) = min_speed {
            let _ = self.events.send(ScanEvent::MinSpeed {
                path: path.to_path_buf(),
                mb_per_sec,
            });
        }
        if let Some(seconds) = max_wait {
            let _ = self.events.send(ScanEvent::MaxWait {
                path: path.to_path_buf(),
                seconds,
            });
        }
    }
}
