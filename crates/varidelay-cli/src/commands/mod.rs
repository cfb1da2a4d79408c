//! CLI command implementations.

pub mod config;
pub mod devices;
pub mod monitor;
pub mod probe;
pub mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flag cleared when the user presses Ctrl+C.
pub fn interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}
