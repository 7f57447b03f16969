//! Delivery records as they arrive from a data source.
//!
//! A [`Record`] is a loosely-typed mapping from header name to [`RawValue`].
//! Only a handful of headers carry meaning for the pipeline (see the `FIELD_*`
//! constants); every other column is passed through untouched.
//!
//! A [`NormalizedRecord`] pairs a record with its canonical date, which is
//! computed once when the record is created and cannot be changed afterwards.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use super::date::normalize;

pub const FIELD_DATE: &str = "FechaEntrada";
pub const FIELD_DRIVER: &str = "Conductor";
pub const FIELD_ORIGIN: &str = "Procedencia";
pub const FIELD_SACKS: &str = "CantSacos";
pub const FIELD_NET_WEIGHT: &str = "QQs Netos";
pub const FIELD_RECEIVER: &str = "Recibidor";
/// Free-text documents column. Only present in newer dataset versions.
pub const FIELD_DOCUMENTS: &str = "MTNTs";

/// A single loosely-typed cell value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }

    /// True for missing values and empty strings.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.is_empty(),
            RawValue::Number(_) => false,
        }
    }

    /// Text form of the value, as a spreadsheet would show it (`3`, not `3.0`).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Empty => Cow::Borrowed(""),
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Number(n) => Cow::Owned(format_number(*n)),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A raw row keyed by header name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, RawValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// Text form of a field; missing fields read as the empty string.
    pub fn text(&self, field: &str) -> Cow<'_, str> {
        self.fields
            .get(field)
            .map(RawValue::as_text)
            .unwrap_or(Cow::Borrowed(""))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// A record plus its canonical `YYYY-MM-DD` date (empty when unparseable).
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRecord {
    record: Record,
    canonical_date: String,
}

impl NormalizedRecord {
    /// Normalize the record's `FechaEntrada` once and keep the result.
    pub fn from_record(record: Record) -> Self {
        let canonical_date = record.get(FIELD_DATE).map(normalize).unwrap_or_default();
        Self {
            record,
            canonical_date,
        }
    }

    pub fn canonical_date(&self) -> &str {
        &self.canonical_date
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.record.get(field)
    }

    pub fn text(&self, field: &str) -> Cow<'_, str> {
        self.record.text(field)
    }
}

impl From<Record> for NormalizedRecord {
    fn from(record: Record) -> Self {
        Self::from_record(record)
    }
}
