use std::ops::{Deref, DerefMut};

use super::row::Row;

/// Visibility of a sheet, from the `state` attribute in workbook.xml.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

/// Sheet-wide formatting record (`<sheetFormatPr>`).
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFormat {
    /// Default row height in points.
    pub default_row_height: f64,
    /// Highest outline level used by any row.
    pub outline_level_row: u8,
}

impl Default for SheetFormat {
    fn default() -> Self {
        Self {
            default_row_height: 15.0,
            outline_level_row: 0,
        }
    }
}

/// A worksheet: a sparse list of rows plus the sheet's logical extent.
///
/// `max_col` is the width rows are padded to by dense cell traversal.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    pub state: SheetState,
    max_row: usize,
    max_col: usize,
    format: SheetFormat,
    rows: Vec<Option<Row>>,
}

/// Mutable access to one row together with the parts of its sheet the row
/// needs: the sheet name, the padding width and the format record.
///
/// Handed out by [`Sheet::row`], [`Sheet::add_row`] and
/// [`Sheet::for_each_row`]. Dereferences to [`Row`].
#[derive(Debug)]
pub struct RowMut<'s> {
    pub(super) row: &'s mut Row,
    pub(super) sheet_name: &'s str,
    pub(super) max_col: usize,
    pub(super) format: &'s mut SheetFormat,
}

impl Sheet {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One past the last row index in use.
    #[must_use]
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    /// Logical sheet width in columns.
    #[must_use]
    pub fn max_col(&self) -> usize {
        self.max_col
    }

    pub fn set_max_col(&mut self, max_col: usize) {
        self.max_col = max_col;
    }

    /// Grow `max_row` to at least `max_row`; never shrinks.
    pub fn extend_max_row(&mut self, max_row: usize) {
        self.max_row = self.max_row.max(max_row);
    }

    #[must_use]
    pub fn format(&self) -> &SheetFormat {
        &self.format
    }

    pub fn format_mut(&mut self) -> &mut SheetFormat {
        &mut self.format
    }

    /// Number of materialized rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.iter().flatten().count()
    }

    /// The row at `idx` if it has been materialized.
    #[must_use]
    pub fn get_row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx).and_then(Option::as_ref)
    }

    /// Materialized rows in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().flatten()
    }

    /// The row at `idx`, created first if absent. Extends `max_row` to cover it.
    pub fn row(&mut self, idx: usize) -> RowMut<'_> {
        if idx >= self.rows.len() {
            self.rows.resize_with(idx + 1, || None);
        }
        self.max_row = self.max_row.max(idx + 1);
        let Self {
            name,
            max_col,
            format,
            rows,
            ..
        } = self;
        #[allow(clippy::indexing_slicing)] // resized above
        let row = rows[idx].get_or_insert_with(|| Row::new(idx));
        RowMut {
            row,
            sheet_name: name.as_str(),
            max_col: *max_col,
            format,
        }
    }

    /// Append a row after the last one in use.
    pub fn add_row(&mut self) -> RowMut<'_> {
        let idx = self.max_row;
        self.row(idx)
    }

    pub(super) fn split_for_rows(&mut self) -> (&str, &mut SheetFormat, &mut Vec<Option<Row>>) {
        (&self.name, &mut self.format, &mut self.rows)
    }
}

impl RowMut<'_> {
    #[must_use]
    pub fn sheet_name(&self) -> &str {
        self.sheet_name
    }

    /// Width of the owning sheet; dense traversal pads up to it.
    #[must_use]
    pub fn max_col(&self) -> usize {
        self.max_col
    }

    /// Set the row's outline level and raise the sheet-wide maximum if needed.
    ///
    /// The sheet maximum is never lowered here.
    pub fn set_outline_level(&mut self, level: u8) {
        self.row.store_outline_level(level);
        if level > self.format.outline_level_row {
            self.format.outline_level_row = level;
        }
    }

    /// Stable key for this row: `<sheet>:<row:06>`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{:06}", self.sheet_name, self.row.num())
    }

    /// Stable key for a cell of this row: `<sheet>:<row:06>:<col:06>`.
    #[must_use]
    pub fn cell_key(&self, col: usize) -> String {
        format!("{}:{:06}", self.key(), col)
    }
}

impl Deref for RowMut<'_> {
    type Target = Row;

    fn deref(&self) -> &Row {
        self.row
    }
}

impl DerefMut for RowMut<'_> {
    fn deref_mut(&mut self) -> &mut Row {
        self.row
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    #[test]
    fn test_row_materializes_and_extends_max_row() {
        let mut sheet = Sheet::new("Data");
        assert!(sheet.get_row(4).is_none());
        sheet.row(4).add_cell().set_value("x");
        assert_eq!(sheet.max_row(), 5);
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.get_row(4).unwrap().num(), 4);
        assert!(sheet.get_row(3).is_none());
    }

    #[test]
    fn test_row_handle_reaches_existing_row() {
        let mut sheet = Sheet::new("Data");
        sheet.row(1).get_cell(2).set_value("kept");
        let row = sheet.row(1);
        assert_eq!(row.cell(2).unwrap().value(), "kept");
        assert_eq!(row.cell_count(), 1);
    }

    #[test]
    fn test_add_row_appends() {
        let mut sheet = Sheet::new("Data");
        sheet.row(2);
        assert_eq!(sheet.add_row().num(), 3);
        assert_eq!(sheet.max_row(), 4);
    }

    #[test]
    fn test_outline_level_ratchet() {
        let mut sheet = Sheet::new("Outline");
        sheet.row(0).set_outline_level(3);
        sheet.row(1).set_outline_level(1);
        assert_eq!(sheet.format().outline_level_row, 3);
        assert_eq!(sheet.get_row(0).unwrap().outline_level(), 3);
        assert_eq!(sheet.get_row(1).unwrap().outline_level(), 1);

        sheet.row(0).set_outline_level(0);
        assert_eq!(sheet.format().outline_level_row, 3);
        assert_eq!(sheet.get_row(0).unwrap().outline_level(), 0);
    }

    #[test]
    fn test_keys() {
        let mut sheet = Sheet::new("Sheet1");
        let row = sheet.row(12);
        assert_eq!(row.key(), "Sheet1:000012");
        assert_eq!(row.cell_key(7), "Sheet1:000012:000007");
    }

    #[test]
    fn test_handle_reports_sheet_width() {
        let mut sheet = Sheet::new("Wide");
        sheet.set_max_col(9);
        let row = sheet.row(0);
        assert_eq!(row.max_col(), 9);
        assert_eq!(row.sheet_name(), "Wide");
    }
}
