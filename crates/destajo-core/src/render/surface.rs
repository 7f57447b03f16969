/// One materialized table cell, tagged with its column label for layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedCell {
    pub label: &'static str,
    pub text: String,
}

/// One materialized table row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRow {
    pub cells: Vec<RenderedCell>,
}

impl RenderedRow {
    pub fn text(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.label == label)
            .map(|cell| cell.text.as_str())
    }
}

/// Where the renderer paints rows.
pub trait RenderSurface {
    /// Drop every row painted so far along with the summary line.
    fn clear(&mut self);

    /// Append a chunk of rows after the existing ones.
    fn append(&mut self, rows: Vec<RenderedRow>);

    /// Replace the record-count summary line.
    fn set_summary(&mut self, summary: String);
}

/// In-memory surface; the terminal UI draws from it.
#[derive(Debug, Default)]
pub struct TableSurface {
    rows: Vec<RenderedRow>,
    summary: String,
    /// Number of chunks appended since the last clear
    chunks: usize,
}

impl TableSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }
}

impl RenderSurface for TableSurface {
    fn clear(&mut self) {
        self.rows.clear();
        self.summary.clear();
        self.chunks = 0;
    }

    fn append(&mut self, rows: Vec<RenderedRow>) {
        self.rows.extend(rows);
        self.chunks += 1;
    }

    fn set_summary(&mut self, summary: String) {
        self.summary = summary;
    }
}

/// "Mostrando N registros." with the singular for exactly one row.
pub fn summary_text(count: usize) -> String {
    let noun = if count == 1 { "registro" } else { "registros" };
    format!("Mostrando {} {}.", count, noun)
}
