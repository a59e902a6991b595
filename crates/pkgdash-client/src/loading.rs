//! Reference-counted loading indicator.
//!
//! Any number of overlapping operations share one visible indicator: it is
//! activated by the first `start` and deactivated by the terminal call that
//! brings the in-flight count back to zero. The mode of that last terminal
//! call (success or error) decides how the indicator ends.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Visible surface driven by a [`LoadingCoordinator`].
pub trait LoadingIndicator: Send + Sync {
    /// Show the indicator.
    fn start(&self);

    /// Hide the indicator, showing successful completion.
    fn finish(&self);

    /// Hide the indicator, showing failure.
    fn error(&self);
}

/// Indicator that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn start(&self) {}
    fn finish(&self) {}
    fn error(&self) {}
}

#[derive(Debug, Default)]
struct State {
    in_flight: usize,
    active: bool,
}

/// Collapses concurrent operations into one loading state.
///
/// Create one per session and share it by reference or `Arc`. Counter
/// transitions and the indicator calls they trigger happen under one lock.
pub struct LoadingCoordinator {
    state: Mutex<State>,
    indicator: Arc<dyn LoadingIndicator>,
}

impl fmt::Debug for LoadingCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LoadingCoordinator")
            .field("in_flight", &state.in_flight)
            .field("active", &state.active)
            .finish()
    }
}

impl Default for LoadingCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(NoopIndicator))
    }
}

impl LoadingCoordinator {
    /// Create a coordinator driving the given indicator.
    #[must_use]
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            indicator,
        }
    }

    /// Register an operation. Activates the indicator on the first one.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if !state.active && state.in_flight == 0 {
            state.active = true;
            self.indicator.start();
            trace!("loading started");
        }
        state.in_flight += 1;
    }

    /// Complete an operation successfully.
    pub fn finish(&self) {
        self.settle(Mode::Finish);
    }

    /// Complete an operation with a failure.
    pub fn error(&self) {
        self.settle(Mode::Error);
    }

    /// Whether at least one operation is in flight.
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Number of operations in flight.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Register an operation and return a guard that completes it.
    ///
    /// A guard dropped without [`LoadingGuard::finish`] or
    /// [`LoadingGuard::error`] counts as an error, so the indicator is never
    /// left running by an early return or a cancelled future.
    pub fn guard(&self) -> LoadingGuard<'_> {
        self.start();
        LoadingGuard {
            coordinator: self,
            settled: false,
        }
    }

    fn settle(&self, mode: Mode) {
        let mut state = self.state.lock();
        // Terminal calls without a matching start are clamped: the counter
        // stays at zero and the indicator is left alone.
        let Some(remaining) = state.in_flight.checked_sub(1) else {
            warn!(mode = ?mode, "loading completed with nothing in flight; ignored");
            return;
        };
        state.in_flight = remaining;
        if state.active && remaining == 0 {
            state.active = false;
            match mode {
                Mode::Finish => self.indicator.finish(),
                Mode::Error => self.indicator.error(),
            }
            trace!(mode = ?mode, "loading ended");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Finish,
    Error,
}

/// Scoped registration with a [`LoadingCoordinator`].
#[must_use = "dropping the guard immediately completes the operation as an error"]
pub struct LoadingGuard<'a> {
    coordinator: &'a LoadingCoordinator,
    settled: bool,
}

impl fmt::Debug for LoadingGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingGuard")
            .field("settled", &self.settled)
            .finish()
    }
}

impl LoadingGuard<'_> {
    /// Complete the operation successfully.
    pub fn finish(mut self) {
        self.settled = true;
        self.coordinator.finish();
    }

    /// Complete the operation with a failure.
    pub fn error(mut self) {
        self.settled = true;
        self.coordinator.error();
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.error();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every indicator call in order.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingIndicator {
        pub(crate) events: Mutex<Vec<&'static str>>,
    }

    impl RecordingIndicator {
        pub(crate) fn events(&self) -> Vec<&'static str> {
            self.events.lock().clone()
        }
    }

    impl LoadingIndicator for RecordingIndicator {
        fn start(&self) {
            self.events.lock().push("start");
        }
        fn finish(&self) {
            self.events.lock().push("finish");
        }
        fn error(&self) {
            self.events.lock().push("error");
        }
    }

    fn coordinator() -> (LoadingCoordinator, Arc<RecordingIndicator>) {
        let indicator = Arc::new(RecordingIndicator::default());
        (LoadingCoordinator::new(indicator.clone()), indicator)
    }

    #[test]
    fn single_operation() {
        let (loading, indicator) = coordinator();
        assert!(!loading.is_active());

        loading.start();
        assert!(loading.is_active());
        loading.finish();
        assert!(!loading.is_active());

        assert_eq!(indicator.events(), vec!["start", "finish"]);
    }

    #[test]
    fn overlapping_operations_share_one_indicator() {
        let (loading, indicator) = coordinator();
        loading.start();
        loading.start();
        loading.start();
        assert_eq!(loading.in_flight(), 3);

        loading.finish();
        loading.error();
        assert!(loading.is_active());
        loading.finish();
        assert!(!loading.is_active());

        assert_eq!(indicator.events(), vec!["start", "finish"]);
    }

    #[test]
    fn last_failure_ends_in_error_mode() {
        let (loading, indicator) = coordinator();
        loading.start();
        loading.start();
        loading.finish();
        loading.error();

        assert_eq!(indicator.events(), vec!["start", "error"]);
    }

    #[test]
    fn reactivates_after_idle() {
        let (loading, indicator) = coordinator();
        loading.start();
        loading.error();
        loading.start();
        loading.finish();

        assert_eq!(indicator.events(), vec!["start", "error", "start", "finish"]);
    }

    #[test]
    fn finish_at_zero_is_clamped() {
        let (loading, indicator) = coordinator();
        loading.finish();
        loading.error();
        assert_eq!(loading.in_flight(), 0);
        assert!(!loading.is_active());
        assert!(indicator.events().is_empty());

        // A later pair still behaves normally.
        loading.start();
        assert_eq!(loading.in_flight(), 1);
        loading.finish();
        assert_eq!(indicator.events(), vec!["start", "finish"]);
    }

    #[test]
    fn guard_settles_explicitly() {
        let (loading, indicator) = coordinator();
        let guard = loading.guard();
        assert!(loading.is_active());
        guard.finish();
        assert!(!loading.is_active());
        assert_eq!(indicator.events(), vec!["start", "finish"]);
    }

    #[test]
    fn dropped_guard_counts_as_error() {
        let (loading, indicator) = coordinator();
        {
            let _guard = loading.guard();
        }
        assert_eq!(loading.in_flight(), 0);
        assert_eq!(indicator.events(), vec!["start", "error"]);
    }

    #[test]
    fn threads_share_one_indicator() {
        let (loading, indicator) = coordinator();
        let loading = Arc::new(loading);

        loading.start();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let loading = Arc::clone(&loading);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let guard = loading.guard();
                        if i % 2 == 0 {
                            guard.finish();
                        } else {
                            guard.error();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(loading.is_active());
        loading.finish();

        assert_eq!(indicator.events(), vec!["start", "finish"]);
    }
}
