//! Ctrl+C handling.
//!
//! A single [`ShutdownHandler`] owns the `Arc<AtomicBool>` that the walker,
//! the hasher and both hash pipelines poll. Pressing Ctrl+C sets the flag;
//! the running phase then stops picking up new files and the operation
//! returns an `Interrupted` error, which the binary maps to exit code 130.
//!
//! ```rust,no_run
//! use hdcleaner::duplicates::FinderConfig;
//! use hdcleaner::signal::install_handler;
//!
//! let handler = install_handler().expect("signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown. Returns `true` if this call set the flag.
    pub fn request_shutdown(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    /// Clone of the flag, for [`FinderConfig`](crate::duplicates::FinderConfig),
    /// [`Walker`](crate::scanner::Walker) and [`Hasher`](crate::scanner::Hasher).
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

/// Install the process-wide Ctrl+C handler, or return the installed one.
///
/// The first Ctrl+C prints "Interrupted. Cleaning up..." to stderr; later
/// presses only keep the flag set. A repeated call resets the flag, so
/// `run_app` can be invoked more than once in a process (tests do this).
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another Ctrl+C handler was
/// already registered outside this module.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = GLOBAL_HANDLER.get_or_init(ShutdownHandler::new).clone();
    let hook = handler.clone();

    let installed = ctrlc::set_handler(move || {
        if hook.request_shutdown() {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted. Cleaning up...");
            let _ = stderr.flush();
            log::info!("Shutdown signal received");
        }
    });

    match installed {
        Ok(()) => Ok(handler),
        // Lost a race with a concurrent caller that installed the same hook.
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, reusing shared flag");
            Ok(handler)
        }
        Err(e) => Err(SignalError::from(e)),
    }
}
