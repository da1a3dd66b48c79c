use super::cell::{Cell, MAX_COLUMNS};
use crate::error::{Result, Xlsx2CsvError};

/// Centimetres to PostScript points.
const POINTS_PER_CM: f64 = 28.346_456_7;

/// A sparse, column-indexed row of cells plus its display attributes.
///
/// Cells live in a growable slot vector where absent columns are `None`.
/// Asking for a column that has no cell yet creates one on the spot, so
/// callers never see a missing cell.
#[derive(Debug, Clone, Default)]
pub struct Row {
    num: usize,
    height: f64,
    custom_height: bool,
    outline_level: u8,
    hidden: bool,
    cell_count: usize,
    cells: Vec<Option<Cell>>,
}

/// Capacity after growing `current` so that `required` slots fit.
///
/// Doubles, but never by less than needed to hold `required` in one step.
pub(crate) fn grown_capacity(current: usize, required: usize) -> usize {
    current.saturating_mul(2).max(required)
}

impl Row {
    /// Create an empty row with the given 0-indexed row number.
    #[must_use]
    pub fn new(num: usize) -> Self {
        Self {
            num,
            ..Self::default()
        }
    }

    /// Row number (0-indexed), fixed at creation.
    #[must_use]
    pub fn num(&self) -> usize {
        self.num
    }

    /// Height in PostScript points (0 when never set).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set the height in PostScript points.
    pub fn set_height(&mut self, points: f64) {
        self.height = points;
        self.custom_height = true;
    }

    /// Set the height in centimetres.
    pub fn set_height_cm(&mut self, cm: f64) {
        self.set_height(cm * POINTS_PER_CM);
    }

    /// Whether the height was set explicitly.
    #[must_use]
    pub fn is_custom_height(&self) -> bool {
        self.custom_height
    }

    #[must_use]
    pub fn outline_level(&self) -> u8 {
        self.outline_level
    }

    /// Store the level without touching any sheet; see `RowMut::set_outline_level`.
    pub(super) fn store_outline_level(&mut self, level: u8) {
        self.outline_level = level;
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Number of materialized cells. O(1).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Length of the backing slot vector, holes included.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.cells.len()
    }

    /// Slots the backing storage can hold before it has to grow again.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }

    /// The cell at `col` if it has been materialized. Never creates a cell.
    #[must_use]
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col).and_then(Option::as_ref)
    }

    /// Materialized cells in ascending column order. Never creates a cell.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Append a cell at the next free column and return it.
    ///
    /// The next column is the current cell count; when the row was filled
    /// sparsely and that slot is taken, the first free slot after it is used.
    pub fn add_cell(&mut self) -> &mut Cell {
        let mut col = self.cell_count;
        while matches!(self.cells.get(col), Some(Some(_))) {
            col += 1;
        }
        self.get_cell(col)
    }

    /// The cell at `col`, created first if the slot is absent.
    ///
    /// Growing past the current capacity resizes the backing storage to
    /// `max(2 * capacity, col + 1)` slots. Existing cells are kept and the new
    /// slots stay absent until asked for.
    ///
    /// # Panics
    /// When the storage for `col + 1` slots cannot be allocated, as for any
    /// `Vec`. Columns at or past [`MAX_COLUMNS`] are not checked here; use
    /// [`Row::try_get_cell`] for untrusted input.
    pub fn get_cell(&mut self, col: usize) -> &mut Cell {
        self.ensure_slot(col);
        let num = self.num;
        #[allow(clippy::indexing_slicing)] // ensure_slot guarantees col < len
        let slot = &mut self.cells[col];
        if slot.is_none() {
            self.cell_count += 1;
        }
        slot.get_or_insert_with(|| Cell::new(num, col))
    }

    /// Like [`Row::get_cell`], but rejects columns an XLSX sheet cannot hold.
    ///
    /// # Errors
    /// Returns [`Xlsx2CsvError::ColumnOutOfRange`] when `col >= MAX_COLUMNS`.
    pub fn try_get_cell(&mut self, col: usize) -> Result<&mut Cell> {
        if col >= MAX_COLUMNS {
            return Err(Xlsx2CsvError::ColumnOutOfRange(col));
        }
        Ok(self.get_cell(col))
    }

    /// Drop every cell and reset the count.
    pub fn clear_cells(&mut self) {
        self.cells.clear();
        self.cell_count = 0;
    }

    fn ensure_slot(&mut self, col: usize) {
        let len = self.cells.len();
        if col < len {
            return;
        }
        let capacity = self.cells.capacity();
        if col >= capacity {
            let target = grown_capacity(capacity, col.saturating_add(1));
            self.cells.reserve_exact(target.saturating_sub(len));
        }
        self.cells.resize_with(col.saturating_add(1), || None);
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
    use test_case::test_case;

    fn materialized_slots(row: &Row) -> usize {
        (0..row.slot_count())
            .filter(|&col| row.cell(col).is_some())
            .count()
    }

    #[test_case(0, 1, 1; "empty row")]
    #[test_case(1, 2, 2; "doubling equals need")]
    #[test_case(2, 3, 4; "doubling")]
    #[test_case(4, 11, 11; "request beyond double")]
    #[test_case(8, 9, 16; "double wins")]
    fn test_grown_capacity(current: usize, required: usize, expected: usize) {
        assert_eq!(grown_capacity(current, required), expected);
    }

    #[test]
    fn test_get_cell_is_idempotent() {
        let mut row = Row::new(0);
        row.get_cell(3).set_value("x");
        let first = row.get_cell(3).clone();
        let second = row.get_cell(3).clone();
        assert_eq!(first, second);
        assert_eq!(second.column(), 3);
        assert_eq!(second.value(), "x");
        assert_eq!(row.cell_count(), 1);
    }

    #[test]
    fn test_growth_preserves_existing_cells() {
        let mut row = Row::new(4);
        for col in [0usize, 1, 2, 5, 9, 40, 300] {
            row.get_cell(col).set_value(format!("v{col}"));
        }
        assert!(row.capacity() >= 301);
        for col in [0usize, 1, 2, 5, 9, 40, 300] {
            let cell = row.cell(col).expect("cell survived growth");
            assert_eq!(cell.value(), format!("v{col}"));
            assert_eq!(cell.column(), col);
            assert_eq!(cell.row(), 4);
        }
    }

    #[test]
    fn test_new_slots_stay_absent() {
        let mut row = Row::new(0);
        row.get_cell(6);
        assert_eq!(row.slot_count(), 7);
        assert!((0..6).all(|col| row.cell(col).is_none()));
        assert_eq!(row.cell_count(), 1);
    }

    #[test]
    fn test_count_matches_materialized_slots() {
        let mut row = Row::new(0);
        row.add_cell();
        row.get_cell(5);
        row.get_cell(5);
        row.add_cell();
        row.get_cell(2);
        row.get_cell(17);
        assert_eq!(row.cell_count(), materialized_slots(&row));
        assert_eq!(row.cell_count(), 4);
    }

    #[test]
    fn test_add_cell_appends_in_order() {
        let mut row = Row::new(0);
        for value in ["a", "b", "c"] {
            row.add_cell().set_value(value);
        }
        let values: Vec<_> = row.cells().map(|c| (c.column(), c.value())).collect();
        assert_eq!(values, vec![(0, "a"), (1, "b"), (2, "c")]);
    }

    #[test]
    fn test_add_cell_skips_occupied_slot() {
        let mut row = Row::new(0);
        row.get_cell(1).set_value("taken");
        let added = row.add_cell();
        assert_eq!(added.column(), 2);
        assert_eq!(row.cell(1).unwrap().value(), "taken");
        assert_eq!(row.cell_count(), 2);
    }

    #[test]
    fn test_try_get_cell_rejects_out_of_range() {
        let mut row = Row::new(0);
        assert!(row.try_get_cell(MAX_COLUMNS - 1).is_ok());
        let err = row.try_get_cell(MAX_COLUMNS).unwrap_err();
        assert!(matches!(err, Xlsx2CsvError::ColumnOutOfRange(c) if c == MAX_COLUMNS));
        assert_eq!(row.cell_count(), 1);
    }

    #[test]
    fn test_try_get_cell_rejects_usize_max() {
        let mut row = Row::new(0);
        let err = row.try_get_cell(usize::MAX).unwrap_err();
        assert!(matches!(err, Xlsx2CsvError::ColumnOutOfRange(usize::MAX)));
        assert_eq!(row.cell_count(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_get_cell_at_usize_max_is_allocation_failure() {
        let mut row = Row::new(0);
        row.get_cell(usize::MAX);
    }

    #[test]
    fn test_clear_cells_resets_count() {
        let mut row = Row::new(0);
        row.get_cell(3);
        row.add_cell();
        row.clear_cells();
        assert_eq!(row.cell_count(), 0);
        assert_eq!(row.slot_count(), 0);
        assert_eq!(row.add_cell().column(), 0);
    }

    #[test]
    fn test_height_units() {
        let mut row = Row::new(0);
        assert!(!row.is_custom_height());
        row.set_height(15.0);
        assert_eq!(row.height(), 15.0);
        assert!(row.is_custom_height());
        row.set_height_cm(1.0);
        assert!((row.height() - 28.346_456_7).abs() < 1e-9);
    }
}
