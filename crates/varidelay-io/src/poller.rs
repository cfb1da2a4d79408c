//! Control-only mode: apply queued control messages without an audio stream.
//!
//! When audio is disabled nothing drains the control queue at block
//! boundaries, so a named background thread does it on a fixed interval
//! instead. The poller is stopped and joined before it is dropped, so it never
//! outlives the parameter store it writes to.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use varidelay_core::{ControlReceiver, ParameterStore};

use crate::Result;

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timer thread draining a control queue into a parameter store.
#[derive(Debug)]
pub struct ControlPoller {
    running: Arc<AtomicBool>,
    applied: Arc<AtomicUsize>,
    handle: Option<JoinHandle<ControlReceiver>>,
}

impl ControlPoller {
    /// Start polling `receiver` every `interval`.
    pub fn spawn(
        mut receiver: ControlReceiver,
        params: Arc<ParameterStore>,
        interval: Duration,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let applied = Arc::new(AtomicUsize::new(0));

        let thread_running = Arc::clone(&running);
        let thread_applied = Arc::clone(&applied);
        let handle = thread::Builder::new()
            .name("varidelay-control".into())
            .spawn(move || {
                while thread_running.load(Ordering::Acquire) {
                    let n = receiver.drain_into(&params);
                    if n > 0 {
                        thread_applied.fetch_add(n, Ordering::Relaxed);
                    }
                    thread::sleep(interval);
                }
                // Final drain so nothing sent before stop is lost.
                let n = receiver.drain_into(&params);
                thread_applied.fetch_add(n, Ordering::Relaxed);
                receiver
            })?;

        tracing::info!(interval_us = interval.as_micros() as u64, "control poller started");
        Ok(Self {
            running,
            applied,
            handle: Some(handle),
        })
    }

    /// Messages applied so far.
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::Relaxed)
    }

    /// Whether the thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Stop and join the thread, returning the receiver for reuse.
    ///
    /// Returns `None` if the thread panicked.
    pub fn stop(mut self) -> Option<ControlReceiver> {
        self.join()
    }

    fn join(&mut self) -> Option<ControlReceiver> {
        let handle = self.handle.take()?;
        self.running.store(false, Ordering::Release);
        let receiver = handle.join().ok();
        tracing::info!(applied = self.applied(), "control poller stopped");
        receiver
    }
}

impl Drop for ControlPoller {
    fn drop(&mut self) {
        self.join();
    }
}
