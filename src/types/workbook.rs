use super::sheet::Sheet;
use crate::error::{Result, Xlsx2CsvError};

/// A workbook read from an XLSX package.
#[derive(Debug, Default)]
pub struct Workbook {
    /// Sheets in workbook order.
    pub sheets: Vec<Sheet>,
    /// Whether the workbook uses the 1904 date system (Mac default)
    /// If false, uses the 1900 date system (Windows default)
    pub date1904: bool,
}

impl Workbook {
    /// The sheet at `index`.
    ///
    /// # Errors
    /// [`Xlsx2CsvError::NoSheets`] for an empty workbook,
    /// [`Xlsx2CsvError::SheetIndex`] when `index` is past the last sheet.
    pub fn sheet(&self, index: usize) -> Result<&Sheet> {
        self.check_index(index)?;
        self.sheets.get(index).ok_or(Xlsx2CsvError::SheetIndex {
            index,
            count: self.sheets.len(),
        })
    }

    /// Mutable access to the sheet at `index`.
    ///
    /// # Errors
    /// Same as [`Workbook::sheet`].
    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        self.check_index(index)?;
        let count = self.sheets.len();
        self.sheets
            .get_mut(index)
            .ok_or(Xlsx2CsvError::SheetIndex { index, count })
    }

    /// First sheet with the given name.
    pub fn sheet_by_name(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        match self.sheets.len() {
            0 => Err(Xlsx2CsvError::NoSheets),
            count if index >= count => Err(Xlsx2CsvError::SheetIndex { index, count }),
            _ => Ok(()),
        }
    }
}
