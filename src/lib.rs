//! xlsx2csv - convert XLSX worksheets to CSV
//!
//! Reads an Excel workbook into a sparse row model and writes one sheet as
//! delimited text:
//! - Rows store cells sparsely and grow on demand
//! - Callback traversal over rows and cells, dense (padded) or sparse
//! - Shared strings, inline strings, booleans, errors and formulas
//! - Configurable delimiter, row limit and empty-row handling
//!
//! # Usage
//!
//! ```no_run
//! use xlsx2csv::export::{convert_file, CsvOptions};
//!
//! let options = CsvOptions::default().with_delimiter(",")?;
//! let rows = convert_file("report.xlsx", 0, std::io::stdout(), &options)?;
//! eprintln!("{rows} rows");
//! # Ok::<(), xlsx2csv::Xlsx2CsvError>(())
//! ```

pub mod cell_ref;
pub mod error;
pub mod export;
pub mod parser;
pub mod types;
pub mod xml_helpers;

pub use error::{Result, Xlsx2CsvError};
pub use export::CsvOptions;
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
