//! Structured error types for xlsx2csv.

/// All errors that can occur while reading a workbook or exporting a sheet.
#[derive(Debug, thiserror::Error)]
pub enum Xlsx2CsvError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// CSV writer error.
    #[error("CSV output: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// Column index past the last column an XLSX sheet can hold.
    #[error("Column index {0} is out of range (maximum is {max})", max = crate::types::MAX_COLUMNS - 1)]
    ColumnOutOfRange(usize),

    /// The workbook has no sheets at all.
    #[error("This XLSX file contains no sheets.")]
    NoSheets,

    /// A sheet index past the end of the workbook.
    #[error("No sheet {index} available, please select a sheet between 0 and {}", .count.saturating_sub(1))]
    SheetIndex { index: usize, count: usize },

    /// Invalid export or command-line configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Xlsx2CsvError>;
