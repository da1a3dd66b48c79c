use std::borrow::Cow;

use crate::cell_ref::cell_address;

/// Number of columns an XLSX sheet can hold (A..XFD).
pub const MAX_COLUMNS: usize = 16_384;

/// Number of rows an XLSX sheet can hold.
pub const MAX_ROWS: usize = 1_048_576;

/// Cell value type, taken from the `t` attribute of a `<c>` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellType {
    #[default]
    String,
    Number,
    Boolean,
    Error,
    /// ISO 8601 date text (`t="d"`).
    Date,
}

/// A single cell within a [`Row`](super::Row).
///
/// The cell records the row number it was created for and its column, which
/// is also its slot in the row's backing storage. Neither changes after
/// creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    row: usize,
    col: usize,
    value: String,
    cell_type: CellType,
    formula: Option<String>,
    style_idx: Option<u32>,
}

impl Cell {
    pub(crate) fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            ..Self::default()
        }
    }

    /// Row number (0-indexed) of the row owning this cell.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index (0-indexed).
    #[must_use]
    pub fn column(&self) -> usize {
        self.col
    }

    /// "A1"-style address of this cell.
    #[must_use]
    pub fn address(&self) -> String {
        cell_address(self.col, self.row)
    }

    /// The raw value as stored in the sheet.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// True when the cell holds the default (empty) value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Store a string value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cell_type = CellType::String;
    }

    /// Store a numeric value.
    pub fn set_number(&mut self, value: f64) {
        self.value = value.to_string();
        self.cell_type = CellType::Number;
    }

    /// Store a boolean value (kept as "1"/"0" like the XML does).
    pub fn set_bool(&mut self, value: bool) {
        self.value = if value { "1" } else { "0" }.to_string();
        self.cell_type = CellType::Boolean;
    }

    /// Store an already-typed raw value, as read from a worksheet.
    pub fn set_raw(&mut self, value: impl Into<String>, cell_type: CellType) {
        self.value = value.into();
        self.cell_type = cell_type;
    }

    /// Formula text without the leading `=`, if the cell has one.
    #[must_use]
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    pub fn set_formula(&mut self, formula: Option<String>) {
        self.formula = formula;
    }

    /// Opaque index into the workbook's cell formats.
    #[must_use]
    pub fn style_idx(&self) -> Option<u32> {
        self.style_idx
    }

    pub fn set_style_idx(&mut self, style_idx: Option<u32>) {
        self.style_idx = style_idx;
    }

    /// Value as it should appear in exported text.
    ///
    /// Booleans are spelled `TRUE`/`FALSE`; everything else is the raw value.
    /// Number formats are not applied.
    #[must_use]
    pub fn formatted_value(&self) -> Cow<'_, str> {
        match (self.cell_type, self.value.as_str()) {
            (CellType::Boolean, "1" | "true") => Cow::Borrowed("TRUE"),
            (CellType::Boolean, "0" | "false") => Cow::Borrowed("FALSE"),
            (_, value) => Cow::Borrowed(value),
        }
    }
}
