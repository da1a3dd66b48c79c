//! CSV export.
//!
//! A sheet is written one record per row. By default rows are padded to the
//! sheet width and gaps are filled with empty fields, so the output is a
//! rectangle of `max_row` x `max_col` values.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Result, Xlsx2CsvError};
use crate::parser;
use crate::types::{
    skip_empty_cells, skip_empty_rows, CellVisitorOption, RowVisitorOption, Sheet,
};

/// Options for [`write_sheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Stop after this many records.
    pub row_limit: Option<usize>,
    /// Leave out rows without any cell.
    pub compact: bool,
    /// Write only non-empty cells, without padding.
    pub skip_empty_cells: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            row_limit: None,
            compact: false,
            skip_empty_cells: false,
        }
    }
}

impl CsvOptions {
    /// Use the first character of `delimiter` as the field delimiter.
    ///
    /// # Errors
    /// [`Xlsx2CsvError::Config`] when `delimiter` is empty or starts with a
    /// character that does not fit in a single byte.
    pub fn with_delimiter(mut self, delimiter: &str) -> Result<Self> {
        let first = delimiter
            .chars()
            .next()
            .ok_or_else(|| Xlsx2CsvError::Config("delimiter must not be empty".to_string()))?;
        self.delimiter = u8::try_from(first)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Xlsx2CsvError::Config(format!("delimiter {first:?} is not an ASCII character"))
            })?;
        Ok(self)
    }

    /// Treat a limit of 0 as "no limit".
    #[must_use]
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = (limit > 0).then_some(limit);
        self
    }
}

/// Why a row walk ended early.
enum Halt {
    RowLimit,
    Failed(Xlsx2CsvError),
}

/// Output shared between the CSV writer and raw blank lines.
struct SharedOut<'a, W>(&'a RefCell<W>);

impl<W: Write> Write for SharedOut<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Write `sheet` as CSV to `out`; returns the number of records written.
///
/// The default traversal materializes every visited row and cell, so the
/// sheet is mutated by the export. A record with no fields, or with one
/// empty field, is written as a blank line.
///
/// # Errors
/// CSV or I/O errors from the underlying writer.
pub fn write_sheet<W: Write>(sheet: &mut Sheet, out: W, options: &CsvOptions) -> Result<usize> {
    let out = RefCell::new(out);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_writer(SharedOut(&out));

    let cell_options: &[CellVisitorOption] = if options.skip_empty_cells {
        &[skip_empty_cells]
    } else {
        &[]
    };
    let row_options: &[RowVisitorOption] = if options.compact {
        &[skip_empty_rows]
    } else {
        &[]
    };

    let mut record = csv::StringRecord::new();
    let mut written = 0usize;

    let walk = sheet.for_each_row(
        |row| {
            if options.row_limit.is_some_and(|limit| written >= limit) {
                return Err(Halt::RowLimit);
            }
            record.clear();
            row.for_each_cell(
                |cell| {
                    record.push_field(&cell.formatted_value());
                    Ok::<(), Halt>(())
                },
                cell_options,
            )?;
            if record.len() <= 1 && record.iter().all(str::is_empty) {
                // the csv crate would quote this as ""
                writer.flush().map_err(|e| Halt::Failed(e.into()))?;
                out.borrow_mut()
                    .write_all(b"\n")
                    .map_err(|e| Halt::Failed(e.into()))?;
            } else {
                writer
                    .write_record(&record)
                    .map_err(|e| Halt::Failed(e.into()))?;
            }
            written += 1;
            Ok(())
        },
        row_options,
    );

    match walk {
        Ok(()) | Err(Halt::RowLimit) => {}
        Err(Halt::Failed(e)) => return Err(e),
    }
    writer.flush()?;

    log::debug!(
        "wrote {written} records from sheet {:?} ({} columns)",
        sheet.name(),
        sheet.max_col()
    );
    Ok(written)
}

/// Parse `data` and write sheet `sheet_index` as CSV.
///
/// # Errors
/// Parse errors, [`Xlsx2CsvError::NoSheets`] / [`Xlsx2CsvError::SheetIndex`]
/// for a bad index, and write errors.
pub fn convert<W: Write>(
    data: &[u8],
    sheet_index: usize,
    out: W,
    options: &CsvOptions,
) -> Result<usize> {
    let mut workbook = parser::parse(data)?;
    write_sheet(workbook.sheet_mut(sheet_index)?, out, options)
}

/// Read the XLSX file at `path` and write sheet `sheet_index` as CSV.
///
/// # Errors
/// Same as [`convert`], plus I/O errors opening the file.
pub fn convert_file<W: Write>(
    path: impl AsRef<Path>,
    sheet_index: usize,
    out: W,
    options: &CsvOptions,
) -> Result<usize> {
    let mut workbook = parser::open(path)?;
    write_sheet(workbook.sheet_mut(sheet_index)?, out, options)
}
