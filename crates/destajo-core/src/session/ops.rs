use super::Session;
use destajo_engine::engine::{FIELD_DRIVER, FIELD_RECEIVER, FilterState, Record, distinct_values};
use std::time::Instant;

impl Session {
    /// Replace the dataset and republish the view under the current filter.
    pub fn load(&mut self, rows: Vec<Record>) {
        self.store.load(rows);
        // A reload makes any in-flight filter edit moot; apply it right away.
        let filter = self.debouncer.flush().unwrap_or_else(|| self.pending.clone());
        self.pending = filter.clone();
        self.publish(filter);
    }

    pub fn set_driver(&mut self, driver: &str, now: Instant) {
        let mut filter = self.pending.clone();
        filter.driver = non_empty(driver);
        self.set_filter(filter, now);
    }

    pub fn set_receiver(&mut self, receiver: &str, now: Instant) {
        let mut filter = self.pending.clone();
        filter.receiver = non_empty(receiver);
        self.set_filter(filter, now);
    }

    /// Set the date filter. `date` must already be canonical (`YYYY-MM-DD`).
    pub fn set_date(&mut self, date: &str, now: Instant) {
        let mut filter = self.pending.clone();
        filter.date = non_empty(date);
        self.set_filter(filter, now);
    }

    /// Record a filter edit; the view is recomputed once input settles.
    pub fn set_filter(&mut self, filter: FilterState, now: Instant) {
        self.pending = filter.clone();
        self.debouncer.schedule(filter, now);
    }

    /// Apply a settled filter edit, if any. Returns true when a new view was
    /// published.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(filter) => {
                self.publish(filter);
                true
            }
            None => false,
        }
    }

    /// Apply the pending filter immediately, skipping the debounce.
    pub fn apply_now(&mut self) {
        let filter = self.debouncer.flush().unwrap_or_else(|| self.pending.clone());
        self.publish(filter);
    }

    pub fn has_pending_filter(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending filter edit settles, if one is waiting.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Reset every predicate and publish the unfiltered dataset at once.
    pub fn clear_filters(&mut self) {
        self.debouncer.cancel();
        self.pending = FilterState::default();
        self.publish(FilterState::default());
    }

    pub fn distinct_drivers(&self) -> Vec<String> {
        distinct_values(self.store.all(), FIELD_DRIVER)
    }

    pub fn distinct_receivers(&self) -> Vec<String> {
        distinct_values(self.store.all(), FIELD_RECEIVER)
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
