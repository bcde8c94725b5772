//! Display clock — advances through the frame sequence at a fixed interval.
//!
//! Exactly one frame is current at any instant. The sequence is immutable and
//! fully built before the clock starts, so the tick path does no locking and
//! no I/O: it clones a `Bytes` handle into a watch channel and sleeps.
//!
//! Stopping is cooperative and takes effect at the next tick boundary. The
//! last published frame stays in the channel — the display holds it static
//! instead of blanking, which helps a receiver mid-capture of that frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::schedule::{Frame, FrameSequence};

/// The currently displayed frame plus where the clock is in the cycle.
#[derive(Debug, Clone)]
pub struct FramePosition {
    /// Index into the frame sequence.
    pub index: usize,
    /// Completed traversals of the sequence.
    pub cycle: u64,
    pub frame: Frame,
}

pub struct DisplayClock;

impl DisplayClock {
    /// Start clocking `sequence` at `interval` per frame. Publishes frame 0
    /// immediately; each subsequent frame is shown for at least `interval`
    /// before the clock advances. Advancing never skips a frame: a late tick
    /// delays the schedule rather than jumping ahead.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(sequence: Arc<FrameSequence>, interval: Duration) -> ClockHandle {
        assert!(!sequence.is_empty(), "cannot clock an empty sequence");
        assert!(!interval.is_zero(), "frame interval must be non-zero");

        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = watch::channel(FramePosition {
            index: 0,
            cycle: 0,
            frame: sequence.get(0).clone(),
        });

        let stop_flag = Arc::clone(&stop);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; frame 0 is already out.
            ticker.tick().await;

            let mut index = 0usize;
            let mut cycle = 0u64;
            loop {
                ticker.tick().await;
                if stop_flag.load(Ordering::Relaxed) {
                    tracing::debug!(index, cycle, "display clock stopped");
                    break;
                }
                index += 1;
                if index == sequence.len() {
                    index = 0;
                    cycle += 1;
                    tracing::debug!(cycle, "frame sequence wrapped");
                }
                tx.send_replace(FramePosition {
                    index,
                    cycle,
                    frame: sequence.get(index).clone(),
                });
            }
        });

        ClockHandle { stop, rx, task }
    }
}

/// Control handle for a running clock.
pub struct ClockHandle {
    stop: Arc<AtomicBool>,
    rx: watch::Receiver<FramePosition>,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// A fresh subscription to the current-frame channel.
    pub fn frames(&self) -> watch::Receiver<FramePosition> {
        self.rx.clone()
    }

    /// Snapshot of the frame on screen right now.
    pub fn current(&self) -> FramePosition {
        self.rx.borrow().clone()
    }

    /// Request a stop. Takes effect at the next tick boundary; the currently
    /// displayed frame remains current.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait for the clock task to finish after `stop()`.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
