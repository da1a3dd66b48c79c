//! Data types for the sparse workbook model.

mod cell;
mod row;
mod sheet;
mod visitor;
mod workbook;

pub use cell::*;
pub use row::*;
pub use sheet::*;
pub use visitor::*;
pub use workbook::*;
