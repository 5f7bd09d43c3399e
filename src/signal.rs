//! Ctrl+C handling.
//!
//! A single `Arc<AtomicBool>` is shared by the walker and the hash workers.
//! While a scan runs, the handler only flips the flag; the scan notices it
//! between files and blocks and returns
//! [`crate::duplicates::FinderError::Interrupted`]. Once the scan is over
//! ([`ShutdownHandler::end_scan`]) nothing polls the flag while the operator
//! prompt blocks on input, so the handler exits the process with code 130.
//!
//! ```rust,no_run
//! use dupesweep::duplicates::FinderConfig;
//! use dupesweep::signal::install_handler;
//!
//! let handler = install_handler().expect("signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::ExitCode;

/// What the Ctrl+C handler does when a signal arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// A scan is running; it stops at the next file or block.
    StopScan,
    /// No scan is running; terminate with [`ExitCode::Interrupted`].
    Exit,
}

/// Shared shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
    scanning: Arc<AtomicBool>,
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            scanning: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once Ctrl+C was pressed or [`Self::request_shutdown`] was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag by hand.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag and go back to scan mode.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
        self.scanning.store(true, Ordering::SeqCst);
    }

    /// Leave scan mode; a later Ctrl+C ends the process.
    pub fn end_scan(&self) {
        self.scanning.store(false, Ordering::SeqCst);
    }

    /// Record an interrupt and decide how to react to it.
    pub fn on_interrupt(&self) -> InterruptAction {
        self.request_shutdown();
        if self.scanning.load(Ordering::SeqCst) {
            InterruptAction::StopScan
        } else {
            InterruptAction::Exit
        }
    }

    /// The flag itself, for the finder, walker and hasher.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// `ctrlc` accepts only one handler per process, so later calls hand back
/// the installed handler with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError`] if the OS refuses the handler for a reason other
/// than one already being registered.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hooked = handler.clone();

    let installed = ctrlc::set_handler(move || {
        let mut stderr = std::io::stderr();
        match hooked.on_interrupt() {
            InterruptAction::StopScan => {
                let _ = writeln!(stderr, "\nInterrupted. Stopping scan...");
                let _ = stderr.flush();
            }
            InterruptAction::Exit => {
                let _ = writeln!(stderr, "\nInterrupted.");
                let _ = stderr.flush();
                std::process::exit(ExitCode::Interrupted.as_i32());
            }
        }
    });

    match installed {
        Ok(()) => {}
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked handler");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(GLOBAL_HANDLER.get_or_init(|| handler).clone())
}
