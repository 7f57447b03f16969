use destajo_engine::engine::{
    FIELD_DOCUMENTS, FIELD_DRIVER, FIELD_NET_WEIGHT, FIELD_ORIGIN, FIELD_RECEIVER, FIELD_SACKS,
    NormalizedRecord, to_display,
};
use serde::{Deserialize, Serialize};

/// A display column of the deliveries table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Driver,
    Origin,
    Documents,
    Sacks,
    NetWeight,
    Receiver,
}

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Column::Date => "Fecha",
            Column::Driver => "Nombre del Conductor",
            Column::Origin => "Cliente o Agencia",
            Column::Documents => "Documentos",
            Column::Sacks => "Sacos",
            Column::NetWeight => "QQs Netos",
            Column::Receiver => "Recibidor",
        }
    }

    /// Preferred width in terminal cells.
    pub fn width_hint(self) -> u16 {
        match self {
            Column::Date => 10,
            Column::Driver | Column::Origin => 22,
            Column::Documents => 28,
            Column::Sacks => 6,
            Column::NetWeight => 9,
            Column::Receiver => 18,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Sacks | Column::NetWeight)
    }

    /// Cell text for `record`. Quantities are shown as-is.
    pub fn cell_text(self, record: &NormalizedRecord) -> String {
        let field = match self {
            Column::Date => return to_display(record.canonical_date()),
            Column::Driver => FIELD_DRIVER,
            Column::Origin => FIELD_ORIGIN,
            Column::Documents => FIELD_DOCUMENTS,
            Column::Sacks => FIELD_SACKS,
            Column::NetWeight => FIELD_NET_WEIGHT,
            Column::Receiver => FIELD_RECEIVER,
        };
        record.text(field).into_owned()
    }
}

/// Which set of columns the table shows.
///
/// `Full` is the current seven-column layout. `Legacy` is the five-column
/// layout of older sheets that had no origin or documents columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    #[default]
    Full,
    Legacy,
}

const FULL: [Column; 7] = [
    Column::Date,
    Column::Driver,
    Column::Origin,
    Column::Documents,
    Column::Sacks,
    Column::NetWeight,
    Column::Receiver,
];

const LEGACY: [Column; 5] = [
    Column::Date,
    Column::Driver,
    Column::Sacks,
    Column::NetWeight,
    Column::Receiver,
];

impl ColumnLayout {
    pub fn columns(self) -> &'static [Column] {
        match self {
            ColumnLayout::Full => &FULL,
            ColumnLayout::Legacy => &LEGACY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use destajo_engine::engine::{FIELD_DATE, Record};

    #[test]
    fn full_layout_matches_export_order() {
        let labels: Vec<_> = ColumnLayout::Full
            .columns()
            .iter()
            .map(|c| c.label())
            .collect();
        assert_eq!(labels, crate::storage::EXPORT_HEADER.to_vec());
    }

    #[test]
    fn legacy_layout_drops_origin_and_documents() {
        let cols = ColumnLayout::Legacy.columns();
        assert_eq!(cols.len(), 5);
        assert!(!cols.contains(&Column::Origin));
        assert!(!cols.contains(&Column::Documents));
    }

    #[test]
    fn cell_text_formats_dates_and_keeps_quantities() {
        let record = NormalizedRecord::from_record(
            Record::new()
                .with(FIELD_DATE, 45000.0)
                .with(FIELD_SACKS, 12.0)
                .with(FIELD_NET_WEIGHT, "12,5"),
        );
        assert_eq!(Column::Date.cell_text(&record), "15/03/2023");
        assert_eq!(Column::Sacks.cell_text(&record), "12");
        assert_eq!(Column::NetWeight.cell_text(&record), "12,5");
        assert_eq!(Column::Documents.cell_text(&record), "");
    }
}
