//! XLSX codec: decode workbooks with calamine, encode with rust_xlsxwriter.

use super::table::records_from_table;
use crate::error::{DestajoError, Result};
use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use destajo_engine::engine::{ExportCell, RawValue, Record};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;
use std::path::Path;

/// Layout options for [`encode`].
#[derive(Clone, Debug)]
pub struct EncodeOptions<'a> {
    pub sheet_name: &'a str,
    /// Column widths in characters, applied from column A onwards.
    pub column_widths: &'a [f64],
    /// Render the first row in bold.
    pub bold_header: bool,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1",
            column_widths: &[],
            bold_header: false,
        }
    }
}

pub fn read_xlsx(path: &Path) -> Result<Vec<Record>> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Decode the first sheet of a workbook; its first row is the header.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut rows = decode_rows(bytes)?.into_iter();
    let Some(header) = rows.next() else {
        return Err(DestajoError::EmptySheet);
    };
    Ok(records_from_table(&header, rows))
}

/// Decode the first sheet of a workbook as plain rows of values.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<Vec<RawValue>>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DestajoError::EmptySheet)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(raw_value).collect())
        .collect())
}

fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::text(s.as_str()),
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Bool(b) => RawValue::text(b.to_string()),
        Data::Error(e) => RawValue::text(e.to_string()),
        // Date cells come through as serials; the normalizer knows the epoch.
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawValue::text(s.as_str()),
        Data::DurationIso(s) => RawValue::text(s.as_str()),
    }
}

/// Encode rows into a single-sheet workbook and return its bytes.
pub fn encode(rows: &[Vec<ExportCell>], options: &EncodeOptions<'_>) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(options.sheet_name)?;
    for (col, width) in options.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let r = row_idx as u32;
        let header = options.bold_header && row_idx == 0;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = col_idx as u16;
            match cell {
                ExportCell::Number(n) if header => {
                    worksheet.write_number_with_format(r, c, *n, &bold)?;
                }
                ExportCell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                ExportCell::Text(s) if s.is_empty() => {}
                ExportCell::Text(s) if header => {
                    worksheet.write_string_with_format(r, c, s, &bold)?;
                }
                ExportCell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
