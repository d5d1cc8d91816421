//! Animation scheduler - a background thread that runs compositing passes
//! at a target frame rate.
//!
//! The thread is controlled through a shared stop flag and joined on
//! `stop()`. Frames are due at fixed increments from the start time, so a
//! slow pass is followed by catch-up passes rather than shifting every
//! later frame.

use crate::error::{Result, TilesError};
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};


/// Default sleep between frame-due checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

const THREAD_NAME: &str = "tile-scheduler";

struct RunningLoop {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Result<()>>,
}

/// Owns at most one frame loop thread.
pub struct Scheduler {
    poll_interval: Duration,
    running: Option<RunningLoop>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("poll_interval", &self.poll_interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Scheduler {
    /// `poll_interval` is how long the loop sleeps between checks for the
    /// next due frame. It bounds both timing jitter and stop latency.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            running: None,
        }
    }

    /// True while the frame loop thread is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map_or(false, |running| !running.thread.is_finished())
    }

    /// Spawns the frame loop, calling `frame` immediately and then once per
    /// `1 / target_fps` seconds until stopped or until `frame` fails.
    ///
    /// A no-op while a loop is already running. If a previous loop died
    /// with an error, that error is returned and nothing is started.
    pub fn start<F>(&mut self, target_fps: f64, frame: F) -> Result<()>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        if self.is_running() {
            trace!("Scheduler: already running, start ignored");
            return Ok(());
        }
        self.reap()?;

        let frame_delay = frame_delay(target_fps).ok_or_else(|| {
            TilesError::invalid_argument(
                "target_fps",
                format!("must be a positive frame rate, got {}", target_fps),
            )
        })?;
        let poll_interval = self.poll_interval;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_frame_loop(frame, stop_clone, frame_delay, poll_interval))
            .map_err(|e| TilesError::Scheduler(format!("failed to spawn frame loop: {}", e)))?;

        info!(
            "Scheduler: started at {:.2} fps ({:.2}ms per frame)",
            target_fps,
            frame_delay.as_secs_f64() * 1000.0
        );
        self.running = Some(RunningLoop { stop, thread });
        Ok(())
    }

    /// Signals the loop to stop and waits for the thread to exit.
    ///
    /// Idempotent. Returns the error the loop died with, if it died.
    pub fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.stop.store(true, Ordering::Release);
        let outcome = join(running.thread);
        info!("Scheduler: stopped");
        outcome
    }

    /// Collects a loop that exited on its own.
    fn reap(&mut self) -> Result<()> {
        match self.running.take() {
            Some(running) if running.thread.is_finished() => join(running.thread),
            other => {
                self.running = other;
                Ok(())
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Scheduler: frame loop had failed: {}", e);
        }
    }
}

/// Time between frames at `target_fps`, or `None` when the rate is not
/// positive and finite or its period does not fit in a `Duration`.
pub(crate) fn frame_delay(target_fps: f64) -> Option<Duration> {
    if !target_fps.is_finite() || target_fps <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / target_fps).ok()
}

fn join(thread: JoinHandle<Result<()>>) -> Result<()> {
    thread
        .join()
        .map_err(|_| TilesError::Scheduler("frame loop panicked".to_string()))?
}

/// Frame loop main body - runs on the scheduler thread.
fn run_frame_loop<F>(
    mut frame: F,
    stop: Arc<AtomicBool>,
    frame_delay: Duration,
    poll_interval: Duration,
) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let started = Instant::now();
    let mut next_due = started + frame_delay;
    let mut frames: u64 = 0;

    let mut run_frame = |frames: &mut u64| {
        frame().map_err(|e| {
            error!("Scheduler: frame {} failed, stopping: {}", frames, e);
            e
        })?;
        *frames += 1;
        Ok::<(), TilesError>(())
    };

    run_frame(&mut frames)?;

    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= next_due {
            run_frame(&mut frames)?;
            next_due += frame_delay;
        } else {
            thread::sleep(poll_interval.min(next_due - now));
        }
    }

    debug!(
        "Scheduler: exiting after {} frames in {:.2}s",
        frames,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
