//! Cell and row traversal.
//!
//! Traversal is configured with function-style options that flip fields of a
//! flags record before the walk starts:
//!
//! ```
//! use xlsx2csv::types::{skip_empty_cells, Sheet};
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_max_col(4);
//! let mut row = sheet.row(0);
//! row.add_cell().set_value("a");
//!
//! let mut seen = Vec::new();
//! row.for_each_cell(
//!     |cell| {
//!         seen.push(cell.value().to_string());
//!         Ok::<_, std::fmt::Error>(())
//!     },
//!     &[skip_empty_cells],
//! )
//! .unwrap();
//! assert_eq!(seen, ["a"]);
//! ```

use super::cell::Cell;
use super::row::Row;
use super::sheet::{RowMut, Sheet};

/// Flags controlling [`Row::for_each_cell_within`] and [`RowMut::for_each_cell`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellVisitorFlags {
    /// Visit only materialized, non-empty cells and do not pad.
    pub skip_empty_cells: bool,
}

/// An option that adjusts [`CellVisitorFlags`] before a cell traversal.
pub type CellVisitorOption = fn(&mut CellVisitorFlags);

/// Skip absent and empty cells instead of materializing them.
pub fn skip_empty_cells(flags: &mut CellVisitorFlags) {
    flags.skip_empty_cells = true;
}

impl CellVisitorFlags {
    /// Apply `options` in order to a default flags record.
    #[must_use]
    pub fn from_options(options: &[CellVisitorOption]) -> Self {
        let mut flags = Self::default();
        for option in options {
            option(&mut flags);
        }
        flags
    }
}

/// Flags controlling [`Sheet::for_each_row`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowVisitorFlags {
    /// Skip absent rows and rows without any materialized cell.
    pub skip_empty_rows: bool,
}

/// An option that adjusts [`RowVisitorFlags`] before a row traversal.
pub type RowVisitorOption = fn(&mut RowVisitorFlags);

/// Skip rows that have no cells instead of materializing them.
pub fn skip_empty_rows(flags: &mut RowVisitorFlags) {
    flags.skip_empty_rows = true;
}

impl RowVisitorFlags {
    /// Apply `options` in order to a default flags record.
    #[must_use]
    pub fn from_options(options: &[RowVisitorOption]) -> Self {
        let mut flags = Self::default();
        for option in options {
            option(&mut flags);
        }
        flags
    }
}

impl Row {
    /// Call `visit` for each cell in ascending column order, padding to `width`.
    ///
    /// By default every backing slot is visited, then columns up to `width`.
    /// Absent cells are materialized before they are handed to `visit`, so
    /// this traversal **mutates the row**: afterwards `cell_count()` covers
    /// every visited column. With [`skip_empty_cells`] absent and empty cells
    /// are skipped, nothing is created and no padding happens.
    ///
    /// # Errors
    /// The first error returned by `visit` stops the walk and is returned as is.
    pub fn for_each_cell_within<E, F>(
        &mut self,
        width: usize,
        mut visit: F,
        options: &[CellVisitorOption],
    ) -> Result<(), E>
    where
        F: FnMut(&mut Cell) -> Result<(), E>,
    {
        let flags = CellVisitorFlags::from_options(options);
        let backing = self.slot_count();

        for col in 0..backing {
            if flags.skip_empty_cells && self.cell(col).map_or(true, Cell::is_empty) {
                continue;
            }
            visit(self.get_cell(col))?;
        }

        if !flags.skip_empty_cells {
            for col in backing..width {
                visit(self.get_cell(col))?;
            }
        }

        Ok(())
    }
}

impl RowMut<'_> {
    /// Call `visit` for each cell, padding to the owning sheet's `max_col`.
    ///
    /// See [`Row::for_each_cell_within`]; the default policy creates the
    /// missing cells as a side effect.
    ///
    /// # Errors
    /// The first error returned by `visit` stops the walk and is returned as is.
    pub fn for_each_cell<E, F>(&mut self, visit: F, options: &[CellVisitorOption]) -> Result<(), E>
    where
        F: FnMut(&mut Cell) -> Result<(), E>,
    {
        let width = self.max_col;
        self.row.for_each_cell_within(width, visit, options)
    }
}

impl Sheet {
    /// Call `visit` for each row `0..max_row` in order.
    ///
    /// Absent rows are created before they are visited unless
    /// [`skip_empty_rows`] is given, in which case rows with no cells are
    /// skipped.
    ///
    /// # Errors
    /// The first error returned by `visit` stops the walk and is returned as is.
    pub fn for_each_row<E, F>(&mut self, mut visit: F, options: &[RowVisitorOption]) -> Result<(), E>
    where
        F: FnMut(&mut RowMut<'_>) -> Result<(), E>,
    {
        let flags = RowVisitorFlags::from_options(options);
        let max_row = self.max_row();
        let max_col = self.max_col();
        let (name, format, rows) = self.split_for_rows();

        if !flags.skip_empty_rows && rows.len() < max_row {
            rows.resize_with(max_row, || None);
        }

        for (idx, slot) in rows.iter_mut().enumerate().take(max_row) {
            if flags.skip_empty_rows && slot.as_ref().map_or(true, |row| row.cell_count() == 0) {
                continue;
            }
            let row = slot.get_or_insert_with(|| Row::new(idx));
            let mut handle = RowMut {
                row,
                sheet_name: name,
                max_col,
                format: &mut *format,
            };
            visit(&mut handle)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Stop(usize);

    fn values(row: &mut RowMut<'_>, options: &[CellVisitorOption]) -> Vec<String> {
        let mut out = Vec::new();
        row.for_each_cell(
            |cell| {
                out.push(cell.value().to_string());
                Ok::<_, Stop>(())
            },
            options,
        )
        .unwrap();
        out
    }

    fn sheet_with_abc(max_col: usize) -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_max_col(max_col);
        let mut row = sheet.row(0);
        for value in ["a", "b", "c"] {
            row.add_cell().set_value(value);
        }
        sheet
    }

    #[test]
    fn test_options_apply_in_order() {
        assert!(!CellVisitorFlags::from_options(&[]).skip_empty_cells);
        assert!(CellVisitorFlags::from_options(&[skip_empty_cells]).skip_empty_cells);
        assert!(RowVisitorFlags::from_options(&[skip_empty_rows]).skip_empty_rows);
    }

    #[test]
    fn test_dense_traversal_pads_to_sheet_width() {
        let mut sheet = sheet_with_abc(5);
        let mut row = sheet.row(0);
        assert_eq!(values(&mut row, &[]), ["a", "b", "c", "", ""]);
    }

    #[test]
    fn test_skip_empty_traversal_does_not_pad() {
        let mut sheet = sheet_with_abc(5);
        let mut row = sheet.row(0);
        assert_eq!(values(&mut row, &[skip_empty_cells]), ["a", "b", "c"]);
        assert_eq!(row.cell_count(), 3);
    }

    #[test]
    fn test_dense_traversal_visits_every_column_in_order() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_max_col(6);
        let mut row = sheet.row(0);
        row.add_cell().set_value("x");
        row.add_cell().set_value("y");

        let mut columns = Vec::new();
        row.for_each_cell(
            |cell| {
                columns.push(cell.column());
                Ok::<_, Stop>(())
            },
            &[],
        )
        .unwrap();
        assert_eq!(columns, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_dense_traversal_materializes_holes_and_padding() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_max_col(5);
        let mut row = sheet.row(0);
        row.get_cell(0).set_value("first");
        row.get_cell(2).set_value("third");
        assert_eq!(row.cell_count(), 2);

        assert_eq!(values(&mut row, &[]), ["first", "", "third", "", ""]);
        assert_eq!(row.cell_count(), 5);
        assert!((0..5).all(|col| row.cell(col).is_some()));
    }

    #[test]
    fn test_skip_empty_visits_only_populated_cells() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_max_col(5);
        let mut row = sheet.row(0);
        row.get_cell(0).set_value("zero");
        row.get_cell(2).set_value("two");

        let mut columns = Vec::new();
        row.for_each_cell(
            |cell| {
                columns.push(cell.column());
                Ok::<_, Stop>(())
            },
            &[skip_empty_cells],
        )
        .unwrap();
        assert_eq!(columns, [0, 2]);
        assert!(row.cell(1).is_none());
        assert_eq!(row.cell_count(), 2);
    }

    #[test]
    fn test_skip_empty_ignores_materialized_empty_cells() {
        let mut row = Row::new(0);
        row.get_cell(0);
        row.get_cell(1).set_value("b");
        let mut seen = Vec::new();
        row.for_each_cell_within(
            10,
            |cell| {
                seen.push(cell.column());
                Ok::<_, Stop>(())
            },
            &[skip_empty_cells],
        )
        .unwrap();
        assert_eq!(seen, [1]);
    }

    #[test]
    fn test_visitor_error_short_circuits() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_max_col(5);
        let mut row = sheet.row(0);
        for value in ["1", "2", "3", "4", "5"] {
            row.add_cell().set_value(value);
        }

        let mut calls = 0;
        let result = row.for_each_cell(
            |cell| {
                calls += 1;
                if cell.value() == "2" {
                    Err(Stop(cell.column()))
                } else {
                    Ok(())
                }
            },
            &[],
        );
        assert_eq!(result, Err(Stop(1)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_error_during_padding_stops_materialization() {
        let mut row = Row::new(0);
        row.add_cell().set_value("only");
        let result = row.for_each_cell_within(
            8,
            |cell| {
                if cell.column() == 3 {
                    Err(Stop(3))
                } else {
                    Ok(())
                }
            },
            &[],
        );
        assert_eq!(result, Err(Stop(3)));
        assert_eq!(row.cell_count(), 4);
    }

    #[test]
    fn test_row_wider_than_sheet_is_not_truncated() {
        let mut row = Row::new(0);
        row.get_cell(6).set_value("far");
        let mut seen = 0;
        row.for_each_cell_within(
            3,
            |_| {
                seen += 1;
                Ok::<_, Stop>(())
            },
            &[],
        )
        .unwrap();
        assert_eq!(seen, 7);
    }

    #[test]
    fn test_for_each_row_materializes_missing_rows() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.row(0).add_cell().set_value("top");
        sheet.row(3).add_cell().set_value("bottom");

        let mut nums = Vec::new();
        sheet
            .for_each_row(
                |row| {
                    nums.push(row.num());
                    Ok::<_, Stop>(())
                },
                &[],
            )
            .unwrap();
        assert_eq!(nums, [0, 1, 2, 3]);
        assert_eq!(sheet.row_count(), 4);
    }

    #[test]
    fn test_for_each_row_skip_empty_rows() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.row(0).add_cell().set_value("top");
        sheet.row(1);
        sheet.row(3).add_cell().set_value("bottom");

        let mut nums = Vec::new();
        sheet
            .for_each_row(
                |row| {
                    nums.push(row.num());
                    Ok::<_, Stop>(())
                },
                &[skip_empty_rows],
            )
            .unwrap();
        assert_eq!(nums, [0, 3]);
        assert_eq!(sheet.row_count(), 3);
    }

    #[test]
    fn test_for_each_row_error_short_circuits() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.row(4);
        let mut calls = 0;
        let result = sheet.for_each_row(
            |row| {
                calls += 1;
                if row.num() == 1 {
                    Err(Stop(1))
                } else {
                    Ok(())
                }
            },
            &[],
        );
        assert_eq!(result, Err(Stop(1)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_rows_share_outline_ratchet_during_traversal() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.row(1);
        sheet
            .for_each_row(
                |row| {
                    row.set_outline_level(if row.num() == 0 { 3 } else { 1 });
                    Ok::<_, Stop>(())
                },
                &[],
            )
            .unwrap();
        assert_eq!(sheet.format().outline_level_row, 3);
    }
}
