//! Animated wait indicator for long-running operations.
//!
//! Draws on stderr so structured stdout output stays clean. Disabled when
//! stderr is not a terminal or verbosity is `debug` (debug logs and spinner
//! redraws do not mix). At most one spinner is active per process; stopping
//! happens in `Drop` so every exit path from a wait loop releases it.

use crate::printer::Printer;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// A running spinner. Dropping it clears the line.
pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    owns_slot: bool,
}

impl Spinner {
    /// Start rendering `label` with an animated indicator.
    ///
    /// Returns a no-op handle when the spinner would corrupt output
    /// (non-interactive stderr, debug verbosity, or one already running).
    pub fn start(p: &Printer, label: &str) -> Self {
        let enabled = p.stderr_is_interactive()
            && !p.is_debug()
            && ACTIVE
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok();
        if !enabled {
            return Self {
                stop: Arc::new(AtomicBool::new(true)),
                handle: None,
                owns_slot: false,
            };
        }

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let label = label.to_string();
        let printer = p.clone();
        let handle = thread::spawn(move || {
            let mut frame = 0usize;
            while !thread_stop.load(Ordering::SeqCst) {
                {
                    let _guard = printer.stream_guard();
                    let mut err = io::stderr();
                    let _ = write!(err, "\r{} {}", label, FRAMES[frame % FRAMES.len()]);
                    let _ = err.flush();
                }
                frame += 1;
                thread::sleep(FRAME_INTERVAL);
            }
            let _guard = printer.stream_guard();
            let mut err = io::stderr();
            let _ = write!(err, "\r{}\r", " ".repeat(label.len() + 2));
            let _ = err.flush();
        });

        Self {
            stop,
            handle: Some(handle),
            owns_slot: true,
        }
    }

    /// Stop and clear the indicator.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        if self.owns_slot {
            ACTIVE.store(false, Ordering::SeqCst);
        }
    }
}
