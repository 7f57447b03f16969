//! CSV import for local delivery sheets

use super::table::records_from_table;
use crate::error::{DestajoError, Result};
use destajo_engine::engine::{RawValue, Record};
use std::path::Path;

/// Read a CSV file whose first line is the header row.
pub fn read_csv(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    parse_csv(&content)
}

/// Parse CSV text whose first record is the header row.
pub fn parse_csv(content: &str) -> Result<Vec<Record>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = split_records(content).into_iter();

    let Some(header) = records.next() else {
        return Err(DestajoError::EmptySheet);
    };
    let header: Vec<RawValue> = header.into_iter().map(RawValue::Text).collect();

    let rows = records.map(|fields| {
        fields
            .iter()
            .map(|field| parse_csv_field(field))
            .collect::<Vec<_>>()
    });

    Ok(records_from_table(&header, rows))
}

/// Field being accumulated by [`split_records`].
#[derive(Default)]
struct FieldBuf {
    text: String,
    quoted: bool,
    in_quotes: bool,
}

impl FieldBuf {
    /// Unquoted fields are trimmed; quoted ones keep their exact contents.
    fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        let field = if self.quoted {
            text
        } else {
            text.trim().to_string()
        };
        self.quoted = false;
        field
    }

    fn is_blank(&self) -> bool {
        !self.quoted && self.text.trim().is_empty()
    }
}

/// Split CSV text into records of fields.
///
/// Quoted fields may contain commas, doubled quotes and line breaks. Records
/// end at `\n` or `\r\n` outside quotes; blank records are skipped.
pub(crate) fn split_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = FieldBuf::default();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if field.in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.text.push('"');
                }
                '"' => field.in_quotes = false,
                _ => field.text.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                field.in_quotes = true;
                field.quoted = true;
            }
            ',' => record.push(field.take()),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => end_record(&mut records, &mut record, &mut field),
            _ => field.text.push(c),
        }
    }
    end_record(&mut records, &mut record, &mut field);
    records
}

fn end_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut FieldBuf) {
    if record.is_empty() && field.is_blank() {
        field.take();
        return;
    }
    record.push(field.take());
    records.push(std::mem::take(record));
}

/// Parse a CSV field into a raw value
/// - Empty string -> Empty
/// - Valid number -> Number (unless it has leading zeros like "007")
/// - Otherwise -> Text (dates stay text and are normalized later)
pub(crate) fn parse_csv_field(field: &str) -> RawValue {
    if field.is_empty() {
        return RawValue::Empty;
    }

    let trimmed = field.trim();
    if field != trimmed {
        return RawValue::text(field);
    }

    // Keep document numbers like "007" as text.
    if trimmed.starts_with('0')
        && trimmed.len() > 1
        && !trimmed.starts_with("0.")
        && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return RawValue::text(trimmed);
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => RawValue::Number(n),
        _ => RawValue::text(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use destajo_engine::engine::{FIELD_DATE, FIELD_NET_WEIGHT, FIELD_SACKS};

    #[test]
    fn test_split_records_simple() {
        assert_eq!(
            split_records("a,b,c\n1, 2 ,3\n"),
            vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]
        );
    }

    #[test]
    fn test_split_records_quoted_comma_and_quotes() {
        assert_eq!(
            split_records(r#"a,"hello, world","say ""hi""""#),
            vec![vec!["a", "hello, world", r#"say "hi""#]]
        );
    }

    #[test]
    fn test_split_records_crlf_and_blank_lines() {
        assert_eq!(
            split_records("a,b\r\n\r\n  \n1,2\r\n"),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_split_records_quoted_field_keeps_spaces() {
        assert_eq!(split_records("\" x \",y"), vec![vec![" x ", "y"]]);
    }

    #[test]
    fn test_quoted_line_break_stays_in_field() {
        let records = parse_csv("Conductor,MTNTs\nAna,\"F-001\nF-002\"\nLuis,F-003\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("MTNTs"), "F-001\nF-002");
        assert_eq!(records[1].text("Conductor"), "Luis");
    }

    #[test]
    fn test_parse_csv_field_number() {
        assert_eq!(parse_csv_field("42"), RawValue::Number(42.0));
        assert_eq!(parse_csv_field("0"), RawValue::Number(0.0));
    }

    #[test]
    fn test_parse_csv_field_leading_zero() {
        assert_eq!(parse_csv_field("007"), RawValue::text("007"));
    }

    #[test]
    fn test_parse_csv_field_dates_stay_text() {
        assert_eq!(parse_csv_field("15/01/2024"), RawValue::text("15/01/2024"));
    }

    #[test]
    fn test_parse_csv_with_header() {
        let content = "\u{feff}FechaEntrada,Conductor,CantSacos,QQs Netos\n\
                       15/01/2024,Ana,10,\"12,5\"\n\
                       \n\
                       16/01/2024,Luis,8,9\n";
        let records = parse_csv(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(FIELD_DATE), "15/01/2024");
        assert_eq!(records[0].get(FIELD_SACKS), Some(&RawValue::Number(10.0)));
        assert_eq!(records[0].text(FIELD_NET_WEIGHT), "12,5");
        assert_eq!(records[1].text("Conductor"), "Luis");
    }

    #[test]
    fn test_parse_csv_empty_is_error() {
        assert!(matches!(parse_csv(""), Err(DestajoError::EmptySheet)));
    }
}
