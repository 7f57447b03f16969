//! Numeric coercion for quantity columns (sacks, net weight).

use super::record::RawValue;

/// A value ready to be written to a spreadsheet cell.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportCell {
    Number(f64),
    Text(String),
}

impl From<&str> for ExportCell {
    fn from(s: &str) -> Self {
        ExportCell::Text(s.to_string())
    }
}

impl From<String> for ExportCell {
    fn from(s: String) -> Self {
        ExportCell::Text(s)
    }
}

/// Coerce a quantity to a number where possible.
///
/// Numbers are kept. Text has its first comma read as a decimal separator
/// (`"12,5"` becomes `12.5`); text that still does not parse is returned
/// unchanged so no value is ever dropped.
pub fn coerce_numeric(value: Option<&RawValue>) -> ExportCell {
    match value {
        None | Some(RawValue::Empty) => ExportCell::Text(String::new()),
        Some(RawValue::Number(n)) => ExportCell::Number(*n),
        Some(RawValue::Text(s)) => {
            if s.is_empty() {
                return ExportCell::Text(String::new());
            }
            let candidate = s.trim().replacen(',', ".", 1);
            match candidate.parse::<f64>() {
                Ok(n) if n.is_finite() => ExportCell::Number(n),
                _ => ExportCell::Text(s.clone()),
            }
        }
    }
}
