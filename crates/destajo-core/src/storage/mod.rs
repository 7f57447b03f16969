//! Storage module for spreadsheet import/export and the Sheets query format

mod csv;
mod export;
mod gviz;
mod table;
mod xlsx;

pub use csv::{parse_csv, read_csv};
pub use export::{
    EXPORT_COLUMN_WIDTHS, EXPORT_HEADER, EXPORT_SHEET_NAME, ExportFile, build_rows,
    export_filename, export_view,
};
pub use gviz::parse_gviz;
pub use table::records_from_table;
pub use xlsx::{EncodeOptions, decode, decode_rows, encode, read_xlsx};
