//! Filtering of normalized records.
//!
//! The filter is three independent exact-match predicates combined with AND.
//! [`apply`] returns positions into the input slice so a view can reference
//! records without copying them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::record::{FIELD_DRIVER, FIELD_RECEIVER, NormalizedRecord};

/// Current filter selections. `None` matches every record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterState {
    pub driver: Option<String>,
    pub receiver: Option<String>,
    /// Canonical `YYYY-MM-DD` date.
    pub date: Option<String>,
}

impl FilterState {
    /// Build a filter from UI inputs, where an empty string means "any".
    pub fn from_inputs(driver: &str, receiver: &str, date: &str) -> Self {
        Self {
            driver: non_empty(driver),
            receiver: non_empty(receiver),
            date: non_empty(date),
        }
    }

    pub fn is_vacuous(&self) -> bool {
        self.driver.is_none() && self.receiver.is_none() && self.date.is_none()
    }

    /// True when every predicate set in `other` is also set, to the same
    /// value, in `self`.
    pub fn is_stricter_than(&self, other: &FilterState) -> bool {
        fn covers(strict: &Option<String>, loose: &Option<String>) -> bool {
            loose.is_none() || strict == loose
        }
        covers(&self.driver, &other.driver)
            && covers(&self.receiver, &other.receiver)
            && covers(&self.date, &other.date)
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if let Some(driver) = &self.driver {
            if record.text(FIELD_DRIVER) != driver.as_str() {
                return false;
            }
        }
        if let Some(receiver) = &self.receiver {
            if record.text(FIELD_RECEIVER) != receiver.as_str() {
                return false;
            }
        }
        if let Some(date) = &self.date {
            // An empty canonical date never equals a set (non-empty) filter.
            if record.canonical_date().is_empty() || record.canonical_date() != date {
                return false;
            }
        }
        true
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Positions of the records matching `filter`, in store order.
pub fn apply(store: &[NormalizedRecord], filter: &FilterState) -> Vec<usize> {
    if filter.is_vacuous() {
        return (0..store.len()).collect();
    }
    store
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(idx, _)| idx)
        .collect()
}

/// Like [`apply`] but yields the records themselves.
pub fn apply_records<'a>(
    store: &'a [NormalizedRecord],
    filter: &FilterState,
) -> Vec<&'a NormalizedRecord> {
    store.iter().filter(|record| filter.matches(record)).collect()
}

/// Sorted, de-duplicated, non-empty text values of `field`.
pub fn distinct_values(store: &[NormalizedRecord], field: &str) -> Vec<String> {
    let values: BTreeSet<String> = store
        .iter()
        .map(|record| record.text(field))
        .filter(|value| !value.is_empty())
        .map(|value| value.into_owned())
        .collect();
    values.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::{FIELD_DATE, Record};

    fn row(driver: &str, receiver: &str, date: &str) -> NormalizedRecord {
        NormalizedRecord::from_record(
            Record::new()
                .with(FIELD_DRIVER, driver)
                .with(FIELD_RECEIVER, receiver)
                .with(FIELD_DATE, date),
        )
    }

    #[test]
    fn from_inputs_treats_empty_as_unset() {
        let filter = FilterState::from_inputs("", "X", "");
        assert_eq!(filter.driver, None);
        assert_eq!(filter.receiver.as_deref(), Some("X"));
        assert!(FilterState::from_inputs("", "", "").is_vacuous());
    }

    #[test]
    fn match_is_exact() {
        let store = vec![row("Ana", "X", "2024-01-01"), row("ana ", "X", "2024-01-01")];
        let filter = FilterState {
            driver: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(apply(&store, &filter), vec![0]);
    }

    #[test]
    fn unparseable_dates_never_match_date_filter() {
        let store = vec![row("A", "X", "garbage"), row("A", "X", "2024-01-01")];
        let filter = FilterState {
            date: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert_eq!(apply(&store, &filter), vec![1]);
    }

    #[test]
    fn numeric_driver_values_compare_by_text() {
        let store = vec![NormalizedRecord::from_record(
            Record::new().with(FIELD_DRIVER, 7.0),
        )];
        let filter = FilterState::from_inputs("7", "", "");
        assert_eq!(apply(&store, &filter), vec![0]);
    }

    #[test]
    fn stricter_relation() {
        let loose = FilterState::from_inputs("A", "", "");
        let strict = FilterState::from_inputs("A", "", "2024-01-01");
        assert!(strict.is_stricter_than(&loose));
        assert!(!loose.is_stricter_than(&strict));
        assert!(loose.is_stricter_than(&FilterState::default()));
    }

    #[test]
    fn apply_records_matches_positions() {
        let store = vec![row("A", "X", "2024-01-01"), row("B", "Y", "2024-01-02")];
        let filter = FilterState::from_inputs("B", "", "");
        let records = apply_records(&store, &filter);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text(FIELD_DRIVER), "B");
    }

    #[test]
    fn distinct_values_skips_missing_fields() {
        let store = vec![
            NormalizedRecord::from_record(Record::new()),
            row("B", "", ""),
            row("A", "", ""),
            row("B", "", ""),
        ];
        assert_eq!(distinct_values(&store, FIELD_DRIVER), vec!["A", "B"]);
        assert!(distinct_values(&store, FIELD_RECEIVER).is_empty());
    }
}
