//! destajo_engine - Delivery record model, date normalization and filtering.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;

    fn delivery(driver: &str, receiver: &str, date: &str) -> NormalizedRecord {
        NormalizedRecord::from_record(
            Record::new()
                .with(FIELD_DATE, date)
                .with(FIELD_DRIVER, driver)
                .with(FIELD_RECEIVER, receiver)
                .with(FIELD_ORIGIN, "Finca")
                .with(FIELD_SACKS, 10.0)
                .with(FIELD_NET_WEIGHT, "12,5"),
        )
    }

    fn scenario() -> Vec<NormalizedRecord> {
        vec![
            delivery("A", "X", "2024-01-01"),
            delivery("B", "Y", "2024-01-02"),
            delivery("A", "X", "2024-01-01"),
        ]
    }

    fn sample_filters() -> Vec<FilterState> {
        let drivers = ["", "A", "B", "Z"];
        let receivers = ["", "X", "Y"];
        let dates = ["", "2024-01-01", "2024-01-02"];
        let mut filters = Vec::new();
        for d in drivers {
            for r in receivers {
                for t in dates {
                    filters.push(FilterState::from_inputs(d, r, t));
                }
            }
        }
        filters
    }

    fn is_ordered_subsequence(positions: &[usize], len: usize) -> bool {
        positions.windows(2).all(|w| w[0] < w[1]) && positions.iter().all(|&p| p < len)
    }

    #[test]
    fn test_scenario_driver_then_date_then_receiver() {
        let store = scenario();

        let by_driver = FilterState::from_inputs("A", "", "");
        assert_eq!(apply(&store, &by_driver), vec![0, 2]);

        let by_driver_and_date = FilterState::from_inputs("A", "", "2024-01-01");
        assert_eq!(apply(&store, &by_driver_and_date), vec![0, 2]);

        let all_three = FilterState::from_inputs("A", "Y", "2024-01-01");
        assert!(apply(&store, &all_three).is_empty());
    }

    #[test]
    fn test_vacuous_filter_returns_store_unchanged() {
        let store = scenario();
        assert_eq!(apply(&store, &FilterState::default()), vec![0, 1, 2]);
        assert!(apply(&[], &FilterState::default()).is_empty());
    }

    #[test]
    fn test_apply_is_ordered_subsequence() {
        let store = scenario();
        for filter in sample_filters() {
            let positions = apply(&store, &filter);
            assert!(is_ordered_subsequence(&positions, store.len()), "{:?}", filter);
            for &p in &positions {
                assert!(filter.matches(&store[p]));
            }
        }
    }

    #[test]
    fn test_stricter_filters_yield_subsets() {
        let store = scenario();
        let filters = sample_filters();
        for loose in &filters {
            for strict in &filters {
                if !strict.is_stricter_than(loose) {
                    continue;
                }
                let wide = apply(&store, loose);
                let narrow = apply(&store, strict);
                assert!(
                    narrow.iter().all(|p| wide.contains(p)),
                    "{:?} should be within {:?}",
                    strict,
                    loose
                );
            }
        }
    }

    #[test]
    fn test_apply_is_deterministic() {
        let store = scenario();
        let filter = FilterState::from_inputs("A", "X", "");
        assert_eq!(apply(&store, &filter), apply(&store, &filter));
    }

    #[test]
    fn test_distinct_values_sorted_unique_non_empty() {
        let mut store = scenario();
        store.push(delivery("", "", ""));
        store.push(delivery("Carlos", "X", ""));

        let drivers = distinct_values(&store, FIELD_DRIVER);
        assert_eq!(drivers, vec!["A", "B", "Carlos"]);
        let receivers = distinct_values(&store, FIELD_RECEIVER);
        assert_eq!(receivers, vec!["X", "Y"]);

        for values in [drivers, receivers] {
            assert!(values.iter().all(|v| !v.is_empty()));
            assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_canonical_dates_round_trip() {
        for canonical in ["1999-12-31", "2000-02-29", "2024-01-15", "2030-07-04"] {
            assert_eq!(normalize(&RawValue::text(canonical)), canonical);
        }
    }

    #[test]
    fn test_display_is_reconstructable() {
        let inputs = [
            RawValue::text("Date(2024,0,15)"),
            RawValue::text("15/01/2024"),
            RawValue::Number(45000.0),
            RawValue::text("not a date"),
            RawValue::Empty,
        ];
        for raw in inputs {
            let canonical = normalize(&raw);
            let shown = to_display(&canonical);
            if canonical.is_empty() {
                assert_eq!(shown, "");
                continue;
            }
            let parts: Vec<&str> = shown.split('/').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0].len(), 2);
            assert_eq!(parts[1].len(), 2);
            assert_eq!(parts[2].len(), 4);
            assert_eq!(format!("{}-{}-{}", parts[2], parts[1], parts[0]), canonical);
        }
    }

    #[test]
    fn test_serial_matches_spreadsheet_epoch() {
        assert_eq!(normalize(&RawValue::Number(SERIAL_UNIX_EPOCH)), "1970-01-01");
        assert_eq!(normalize(&RawValue::Number(45000.0)), "2023-03-15");
        assert_eq!(normalize(&RawValue::Number(1.0)), "1899-12-31");
    }

    #[test]
    fn test_quantities_coerce_for_export() {
        let record = delivery("A", "X", "2024-01-01");
        assert_eq!(coerce_numeric(record.get(FIELD_SACKS)), ExportCell::Number(10.0));
        assert_eq!(coerce_numeric(record.get(FIELD_NET_WEIGHT)), ExportCell::Number(12.5));
    }
}
