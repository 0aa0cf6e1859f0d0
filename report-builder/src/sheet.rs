use crate::RenderResult;
use rust_xlsxwriter::{ColNum, Format, RowNum, Worksheet};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Longest string an xlsx cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;

const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Worksheet wrapper that tracks the widest content per column so widths can
/// be sized once everything is written.
pub(crate) struct SheetWriter {
    sheet: Worksheet,
    widths: BTreeMap<ColNum, usize>,
    max_width: f64,
}

impl SheetWriter {
    pub fn new(name: &str, max_width: f64) -> RenderResult<Self> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;
        Ok(Self {
            sheet,
            widths: BTreeMap::new(),
            max_width,
        })
    }

    pub fn text(&mut self, row: RowNum, col: ColNum, text: &str, format: &Format) -> RenderResult<()> {
        let text = clamp_cell(text);
        self.observe(col, &text);
        self.sheet
            .write_string_with_format(row, col, text.as_ref(), format)?;
        Ok(())
    }

    pub fn count(&mut self, row: RowNum, col: ColNum, value: usize, format: &Format) -> RenderResult<()> {
        self.observe(col, &value.to_string());
        self.sheet
            .write_number_with_format(row, col, value as f64, format)?;
        Ok(())
    }

    pub fn link(&mut self, row: RowNum, col: ColNum, url: &str, format: &Format) -> RenderResult<()> {
        self.observe(col, url);
        self.sheet.write_url_with_format(row, col, url, format)?;
        Ok(())
    }

    pub fn row_height(&mut self, row: RowNum, height: f64) -> RenderResult<()> {
        self.sheet.set_row_height(row, height)?;
        Ok(())
    }

    fn observe(&mut self, col: ColNum, text: &str) {
        let width = display_width(text);
        let entry = self.widths.entry(col).or_insert(0);
        *entry = (*entry).max(width);
    }

    /// Apply column widths and hand back the finished sheet.
    pub fn finish(mut self) -> RenderResult<Worksheet> {
        for (col, chars) in &self.widths {
            let width = ((chars + 2) as f64).min(self.max_width);
            self.sheet.set_column_width(*col, width)?;
        }
        Ok(self.sheet)
    }
}

/// Characters on the longest line of `text`.
pub(crate) fn display_width(text: &str) -> usize {
    text.lines().map(|l| l.chars().count()).max().unwrap_or(0)
}

pub(crate) fn clamp_cell(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(text);
    }
    let keep = MAX_CELL_CHARS - TRUNCATION_MARKER.chars().count();
    let mut clamped: String = text.chars().take(keep).collect();
    clamped.push_str(TRUNCATION_MARKER);
    Cow::Owned(clamped)
}
