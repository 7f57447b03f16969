use destajo_engine::engine::{RawValue, Record};
use std::collections::HashMap;

/// Turn a header row plus data rows into records keyed by header name.
///
/// Blank data rows are skipped. Cells missing from short rows read as empty.
/// Blank headers become `__EMPTY`, `__EMPTY_1`, ... and repeated headers get
/// a `_1`, `_2`, ... suffix so no column is silently overwritten.
pub fn records_from_table<I>(header: &[RawValue], rows: I) -> Vec<Record>
where
    I: IntoIterator<Item = Vec<RawValue>>,
{
    let keys = header_keys(header);
    rows.into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            let mut cells = row.into_iter();
            keys.iter()
                .map(|key| (key.clone(), cells.next().unwrap_or_default()))
                .collect::<Record>()
        })
        .collect()
}

fn header_keys(header: &[RawValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let base = match cell.as_text().trim() {
                "" => "__EMPTY".to_string(),
                text => text.to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let key = if *count == 0 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            key
        })
        .collect()
}
