//! Progress reporting using indicatif.
//!
//! [`Progress`] is a [`DiagnosticSink`] that turns hash-phase events into a
//! terminal progress bar. Everything else (unreadable files in particular) is
//! forwarded to [`LogSink`] with the bar suspended so log lines do not tear it.

use std::sync::{Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, Phase};

/// Progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// Callers that want no bar (quiet runs, non-terminal stderr) use
    /// [`LogSink`] instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdcleaner::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn label(phase: Phase) -> &'static str {
        match phase {
            Phase::Grouping => "Hashing duplicate candidates",
            Phase::Reconciling => "Hashing master/client candidates",
        }
    }

    fn start(&self, phase: Phase, total: usize) {
        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        pb.set_style(Self::style());
        pb.set_message(Self::label(phase));
        *self.bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn advance(&self, path: &std::path::Path) {
        if let Some(ref pb) = *self.bar.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.inc(1);
            pb.set_message(truncate_path(&path.to_string_lossy(), 30));
        }
    }

    fn finish(&self, phase: Phase) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pb.finish_with_message(format!("{} complete", Self::label(phase)));
        }
    }

    fn forward(&self, event: &Diagnostic) {
        match *self.bar.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(ref pb) => pb.suspend(|| LogSink.report(event)),
            None => LogSink.report(event),
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for Progress {
    fn report(&self, event: &Diagnostic) {
        match event {
            Diagnostic::PhaseStarted { phase, total } => self.start(*phase, *total),
            Diagnostic::FileHashed { path, .. } => self.advance(path),
            Diagnostic::UnreadableFile { path, .. } => {
                // Unreadable files still count as processed.
                self.forward(event);
                self.advance(path);
            }
            Diagnostic::PhaseFinished { phase } => self.finish(*phase),
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
