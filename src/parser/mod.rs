//! Main XLSX parser
//!
//! Orchestrates the parsing of all components from the ZIP archive.

mod relationships;
mod worksheet;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::error::Result;
use crate::types::Workbook;

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use worksheet::parse_sheet;

/// Parse an XLSX file from bytes.
///
/// # Errors
/// Fails when the bytes are not a ZIP archive, when `xl/workbook.xml` or a
/// referenced worksheet is missing, or when any part is malformed XML.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    parse_archive(ZipArchive::new(Cursor::new(data))?)
}

/// Open and parse an XLSX file from disk.
///
/// # Errors
/// Same as [`parse`], plus I/O errors opening the file.
pub fn open(path: impl AsRef<Path>) -> Result<Workbook> {
    let path = path.as_ref();
    log::debug!("opening {}", path.display());
    let file = BufReader::new(File::open(path)?);
    parse_archive(ZipArchive::new(file)?)
}

fn parse_archive<R: Read + Seek>(mut archive: ZipArchive<R>) -> Result<Workbook> {
    // Relationships first to get actual part paths
    let relationships = parse_workbook_relationships(&mut archive)?;

    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;

    let (sheet_info, date1904) = get_sheet_info(&mut archive, &relationships.worksheets)?;

    let mut sheets = Vec::with_capacity(sheet_info.len());
    for info in &sheet_info {
        sheets.push(parse_sheet(&mut archive, info, &shared_strings)?);
    }

    log::debug!(
        "parsed workbook: {} sheets, {} shared strings, date1904={date1904}",
        sheets.len(),
        shared_strings.len()
    );

    Ok(Workbook { sheets, date1904 })
}
