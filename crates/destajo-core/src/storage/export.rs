//! Export of the current view to an `.xlsx` file.

use super::xlsx::{EncodeOptions, encode};
use crate::error::{DestajoError, Result};
use crate::session::CurrentView;
use chrono::{DateTime, Utc};
use destajo_engine::engine::{
    ExportCell, FIELD_DOCUMENTS, FIELD_DRIVER, FIELD_NET_WEIGHT, FIELD_ORIGIN, FIELD_RECEIVER,
    FIELD_SACKS, coerce_numeric,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub const EXPORT_HEADER: [&str; 7] = [
    "Fecha",
    "Nombre del Conductor",
    "Cliente o Agencia",
    "Documentos",
    "Sacos",
    "QQs Netos",
    "Recibidor",
];

pub const EXPORT_COLUMN_WIDTHS: [f64; 7] = [12.0, 22.0, 22.0, 40.0, 10.0, 12.0, 18.0];

pub const EXPORT_SHEET_NAME: &str = "Vista";

/// A finished export: file name plus workbook bytes.
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the workbook into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Header row followed by one row per record of the view.
pub fn build_rows(view: &CurrentView) -> Vec<Vec<ExportCell>> {
    let header = EXPORT_HEADER.iter().map(|h| ExportCell::from(*h)).collect();
    let mut rows = Vec::with_capacity(view.len() + 1);
    rows.push(header);
    rows.extend(view.iter().map(|record| {
        vec![
            ExportCell::from(record.canonical_date()),
            ExportCell::from(record.text(FIELD_DRIVER).into_owned()),
            ExportCell::from(record.text(FIELD_ORIGIN).into_owned()),
            ExportCell::from(record.text(FIELD_DOCUMENTS).into_owned()),
            coerce_numeric(record.get(FIELD_SACKS)),
            coerce_numeric(record.get(FIELD_NET_WEIGHT)),
            ExportCell::from(record.text(FIELD_RECEIVER).into_owned()),
        ]
    }));
    rows
}

/// `destajo_vista_<date filter or "todos">_<YYYY-MM-DD-HH-MM-SS>.xlsx`
pub fn export_filename(date_filter: Option<&str>, now: DateTime<Utc>) -> String {
    let date = date_filter.filter(|d| !d.is_empty()).unwrap_or("todos");
    format!(
        "destajo_vista_{}_{}.xlsx",
        date,
        now.format("%Y-%m-%d-%H-%M-%S")
    )
}

/// Serialize the view into an `.xlsx` workbook.
///
/// An empty view is an error and produces nothing.
pub fn export_view(
    view: &CurrentView,
    date_filter: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ExportFile> {
    if view.is_empty() {
        return Err(DestajoError::NothingToExport);
    }

    let rows = build_rows(view);
    let options = EncodeOptions {
        sheet_name: EXPORT_SHEET_NAME,
        column_widths: &EXPORT_COLUMN_WIDTHS,
        bold_header: true,
    };
    let bytes = encode(&rows, &options)?;
    let filename = export_filename(date_filter, now);
    info!(rows = view.len(), %filename, "view exported");
    Ok(ExportFile { filename, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::decode_rows;
    use chrono::TimeZone;
    use destajo_engine::engine::{FIELD_DATE, FilterState, NormalizedRecord, RawValue, Record};
    use std::sync::Arc;

    fn view_of(records: Vec<Record>, filter: &FilterState) -> CurrentView {
        let snapshot: Arc<[NormalizedRecord]> =
            records.into_iter().map(NormalizedRecord::from_record).collect();
        CurrentView::compute(snapshot, filter)
    }

    fn delivery(driver: &str, sacks: RawValue, net: &str) -> Record {
        Record::new()
            .with(FIELD_DATE, "Date(2024,0,15)")
            .with(FIELD_DRIVER, driver)
            .with(FIELD_ORIGIN, "Finca El Roble")
            .with(FIELD_DOCUMENTS, "MT-001")
            .with(FIELD_SACKS, sacks)
            .with(FIELD_NET_WEIGHT, net)
            .with(FIELD_RECEIVER, "Bodega")
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn empty_view_exports_nothing() {
        let view = CurrentView::empty();
        assert!(matches!(
            export_view(&view, None, noon()),
            Err(DestajoError::NothingToExport)
        ));
    }

    #[test]
    fn rows_follow_fixed_column_order() {
        let view = view_of(
            vec![
                delivery("Ana", RawValue::Number(10.0), "12,5"),
                delivery("Luis", RawValue::text("ocho"), "9"),
            ],
            &FilterState::default(),
        );
        let rows = build_rows(&view);
        assert_eq!(rows.len(), 3);
        let header: Vec<_> = rows[0].clone();
        assert_eq!(
            header,
            EXPORT_HEADER.iter().map(|h| ExportCell::from(*h)).collect::<Vec<_>>()
        );
        assert_eq!(
            rows[1],
            vec![
                ExportCell::from("2024-01-15"),
                ExportCell::from("Ana"),
                ExportCell::from("Finca El Roble"),
                ExportCell::from("MT-001"),
                ExportCell::Number(10.0),
                ExportCell::Number(12.5),
                ExportCell::from("Bodega"),
            ]
        );
        // Unparseable quantities keep their text.
        assert_eq!(rows[2][4], ExportCell::from("ocho"));
        assert_eq!(rows[2][5], ExportCell::Number(9.0));
    }

    #[test]
    fn exported_workbook_has_header_plus_view_rows() {
        let view = view_of(
            vec![
                delivery("Ana", RawValue::Number(10.0), "12,5"),
                delivery("Luis", RawValue::Number(8.0), "9"),
                delivery("Ana", RawValue::Number(4.0), "3"),
            ],
            &FilterState::from_inputs("Ana", "", ""),
        );
        let file = export_view(&view, Some("2024-01-15"), noon()).unwrap();
        let rows = decode_rows(&file.bytes).unwrap();
        assert_eq!(rows.len(), 1 + view.len());
        assert_eq!(rows[0][0], RawValue::text("Fecha"));
        assert_eq!(rows[0][6], RawValue::text("Recibidor"));
        assert_eq!(rows[2][4], RawValue::Number(4.0));
    }

    #[test]
    fn filename_uses_date_filter_or_todos() {
        assert_eq!(
            export_filename(Some("2024-01-15"), noon()),
            "destajo_vista_2024-01-15_2024-03-05-14-07-09.xlsx"
        );
        assert_eq!(
            export_filename(None, noon()),
            "destajo_vista_todos_2024-03-05-14-07-09.xlsx"
        );
        assert_eq!(
            export_filename(Some(""), noon()),
            "destajo_vista_todos_2024-03-05-14-07-09.xlsx"
        );
    }

    #[test]
    fn write_to_directory() {
        let view = view_of(
            vec![delivery("Ana", RawValue::Number(1.0), "1")],
            &FilterState::default(),
        );
        let file = export_view(&view, None, noon()).unwrap();
        let dir = std::env::temp_dir().join(format!(
            "destajo_export_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        ));
        std::fs::create_dir_all(&dir).unwrap();

        struct Cleanup(PathBuf);
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
        let _cleanup = Cleanup(dir.clone());

        let path = file.write_to(&dir).unwrap();
        assert!(path.ends_with("destajo_vista_todos_2024-03-05-14-07-09.xlsx"));
        assert_eq!(std::fs::read(path).unwrap(), file.bytes);
    }
}
