//! Delivery record engine API.
//!
//! This module provides the pure, UI-agnostic pieces of the pipeline:
//!
//! - [`Record`], [`RawValue`], [`NormalizedRecord`] - Data structures for rows
//! - [`normalize`], [`to_display`] - Date normalization and display formatting
//! - [`FilterState`], [`apply`], [`distinct_values`] - Filtering
//! - [`coerce_numeric`] - Quantity coercion for export

mod date;
mod filter;
mod number;
mod record;

pub use date::{SERIAL_UNIX_EPOCH, normalize, normalize_str, to_display};
pub use filter::{FilterState, apply, apply_records, distinct_values};
pub use number::{ExportCell, coerce_numeric};
pub use record::{
    FIELD_DATE, FIELD_DOCUMENTS, FIELD_DRIVER, FIELD_NET_WEIGHT, FIELD_ORIGIN, FIELD_RECEIVER,
    FIELD_SACKS, NormalizedRecord, RawValue, Record,
};
