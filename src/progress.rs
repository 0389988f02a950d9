//! Progress reporting for long sampling runs.
//!
//! A sink only observes the run: it receives `(completed, total)` sweep
//! counts and cannot influence the sampler state.

/// Receiver of progress notifications.
pub trait ProgressSink {
    /// Called with the number of completed sweeps out of `total`.
    fn on_progress(&mut self, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

#[cfg(feature = "progress")]
pub use bar::ProgressBarSink;

#[cfg(feature = "progress")]
mod bar {
    use indicatif::{ProgressBar, ProgressStyle};

    use super::ProgressSink;

    /// Terminal progress bar.
    pub struct ProgressBarSink {
        bar: Option<ProgressBar>,
    }

    impl ProgressBarSink {
        /// Create a sink; the bar is drawn on the first notification.
        pub fn new() -> Self {
            Self { bar: None }
        }
    }

    impl Default for ProgressBarSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProgressSink for ProgressBarSink {
        fn on_progress(&mut self, completed: usize, total: usize) {
            let bar = self.bar.get_or_insert_with(|| {
                let bar = ProgressBar::new(total as u64);
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} sweeps ({eta})",
                ) {
                    bar.set_style(style);
                }
                bar
            });
            bar.set_position(completed as u64);
            if completed >= total {
                bar.finish();
            }
        }
    }

}
