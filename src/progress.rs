// src/progress.rs

//! Defines a trait for reporting progress of downloads and batch runs.
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// A trait for reporting progress, abstracting over specific implementations like `indicatif`.
///
/// Tree walks report one step per downloaded file; batch runs report one step
/// per manifest entry.
///
/// # Examples
///
/// ```
/// use modfetch::progress::ProgressReporter;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// // A mock reporter that only counts finished steps.
/// struct CountingProgress(AtomicU64);
///
/// impl ProgressReporter for CountingProgress {
///     fn set_length(&self, _len: u64) {}
///     fn inc(&self, delta: u64) {
///         self.0.fetch_add(delta, Ordering::SeqCst);
///     }
///     fn set_message(&self, _msg: String) {}
///     fn finish_with_message(&self, _msg: String) {}
/// }
///
/// let reporter = CountingProgress(AtomicU64::new(0));
/// reporter.inc(1);
/// reporter.inc(2);
/// assert_eq!(reporter.0.load(Ordering::SeqCst), 3);
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Sets the total number of steps (files or entries).
    fn set_length(&self, len: u64);
    /// Advances the position by `delta` steps.
    fn inc(&self, delta: u64);
    /// Sets a descriptive message for the current operation (e.g., "Downloading Magiclysm").
    fn set_message(&self, msg: String);
    /// Finishes the progress reporting with a final message.
    fn finish_with_message(&self, msg: String);
}

/// A `ProgressReporter` that does nothing.
///
/// Used in non-interactive environments where a progress bar is not desired.
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn set_length(&self, _len: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish_with_message(&self, _msg: String) {}
}

/// An implementation of `ProgressReporter` using the `indicatif` crate.
#[cfg(feature = "progress")]
#[derive(Clone)]
pub struct IndicatifProgress {
    bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl IndicatifProgress {
    /// Creates a new progress bar with a default style.
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        Self { bar: pb }
    }
}

#[cfg(feature = "progress")]
impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgress {
    fn set_length(&self, len: u64) {
        self.bar.set_length(len);
        self.bar.set_position(0);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish_with_message(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}
