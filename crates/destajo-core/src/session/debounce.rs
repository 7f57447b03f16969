use std::time::{Duration, Instant};

/// Default settle time for filter input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Trailing debounce: only the last value scheduled within the window fires,
/// once the input has been quiet for `wait`.
///
/// The caller supplies the clock, so the event loop can poll it once per tick.
#[derive(Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.wait));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|at| at <= now) {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
