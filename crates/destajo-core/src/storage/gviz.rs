//! Google Sheets "gviz" query responses.
//!
//! The endpoint wraps its JSON in a JavaScript callback
//! (`/*O_o*/ google.visualization.Query.setResponse({...});`), so the payload
//! is cut from the first `{` to the last `}` before parsing.

use super::table::records_from_table;
use crate::error::{DestajoError, Result};
use destajo_engine::engine::{RawValue, Record};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct GvizResponse {
    table: GvizTable,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    cols: Vec<GvizColumn>,
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct GvizColumn {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Option<Value>,
    #[serde(default)]
    f: Option<String>,
}

impl GvizColumn {
    /// The label, or the column id when the label is blank.
    fn key(&self) -> RawValue {
        let label = self.label.as_deref().filter(|l| !l.is_empty());
        let id = self.id.as_deref().filter(|i| !i.is_empty());
        RawValue::text(label.or(id).unwrap_or(""))
    }
}

impl GvizCell {
    /// Formatted value if present, else the raw value.
    fn value(&self) -> RawValue {
        if let Some(f) = &self.f {
            return RawValue::text(f.as_str());
        }
        match &self.v {
            None | Some(Value::Null) => RawValue::Empty,
            Some(Value::String(s)) => RawValue::text(s.as_str()),
            Some(Value::Number(n)) => n.as_f64().map(RawValue::Number).unwrap_or_default(),
            Some(Value::Bool(b)) => RawValue::text(b.to_string()),
            Some(other) => RawValue::text(other.to_string()),
        }
    }
}

/// Parse a gviz `tqx=out:json` response body into records.
pub fn parse_gviz(body: &str) -> Result<Vec<Record>> {
    let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
        return Err(DestajoError::Parse {
            line: 1,
            message: "response does not contain a JSON object".to_string(),
        });
    };
    if end < start {
        return Err(DestajoError::Parse {
            line: 1,
            message: "response does not contain a JSON object".to_string(),
        });
    }

    let response: GvizResponse = serde_json::from_str(&body[start..=end])?;
    let header: Vec<RawValue> = response.table.cols.iter().map(GvizColumn::key).collect();
    let rows = response.table.rows.into_iter().map(|row| {
        row.c
            .iter()
            .map(|cell| cell.as_ref().map(GvizCell::value).unwrap_or_default())
            .collect::<Vec<_>>()
    });

    Ok(records_from_table(&header, rows))
}
