//! Worksheet parsing - streams `<sheetData>` into the sparse row model.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_ref, parse_cell_ref_bytes};
use crate::error::{Result, Xlsx2CsvError};
use crate::types::{CellType, Sheet, SheetState, MAX_ROWS};
use crate::xml_helpers::{attr_bool, attr_f64, attr_string, attr_u32, attr_u8, attr_usize};

/// Sheet metadata from workbook.xml
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
    pub state: SheetState,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Date,
    #[default]
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        b"d" => CellTypeTag::Date,
        _ => CellTypeTag::Default,
    }
}

/// Which buffer text inside the current `<c>` belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TextTarget {
    Value,
    Formula,
    Inline,
}

/// A `<c>` element whose children are still being read.
#[derive(Debug, Default)]
struct PendingCell {
    col: Option<usize>,
    tag: CellTypeTag,
    style_idx: Option<u32>,
    value: String,
    formula: Option<String>,
    inline: String,
}

impl PendingCell {
    fn from_element(e: &BytesStart) -> Result<Self> {
        let mut cell = Self::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let (col, _row) = parse_cell_ref_bytes(&attr.value).ok_or_else(|| {
                        Xlsx2CsvError::CellRef(String::from_utf8_lossy(&attr.value).into_owned())
                    })?;
                    cell.col = Some(col);
                }
                b"t" => cell.tag = parse_cell_type_tag(&attr.value),
                _ => {}
            }
        }
        cell.style_idx = attr_u32(e, b"s");
        Ok(cell)
    }

    /// Final (value, type) pair once all children have been read.
    fn resolve(self, shared_strings: &[String]) -> (String, CellType, Option<String>) {
        let formula = self.formula;
        let (value, cell_type) = match self.tag {
            CellTypeTag::Shared => {
                let value = self
                    .value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| shared_strings.get(idx).cloned())
                    .unwrap_or_else(|| {
                        log::warn!("unresolved shared string index {:?}", self.value);
                        String::new()
                    });
                (value, CellType::String)
            }
            CellTypeTag::Inline => (self.inline, CellType::String),
            CellTypeTag::Str => (self.value, CellType::String),
            CellTypeTag::Bool => (self.value, CellType::Boolean),
            CellTypeTag::Error => (self.value, CellType::Error),
            CellTypeTag::Date => (self.value, CellType::Date),
            CellTypeTag::Default if self.value.is_empty() => (self.value, CellType::String),
            CellTypeTag::Default => (self.value, CellType::Number),
        };
        (value, cell_type, formula)
    }
}

/// Parse a dimension range like "A1:B2" into its bottom-right (col, row).
fn parse_dimension_end(ref_str: &str) -> Option<(usize, usize)> {
    let end = ref_str.split_once(':').map_or(ref_str, |(_, end)| end);
    parse_cell_ref(end)
}

/// Parse a single worksheet
#[allow(clippy::too_many_lines)]
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
) -> Result<Sheet> {
    let file = archive.by_name(&info.path)?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Sheet::new(info.name.clone());
    sheet.state = info.state;

    let mut buf = Vec::new();
    let mut current_row: usize = 0;
    let mut next_row: usize = 0;
    let mut dimension: Option<(usize, usize)> = None;
    let mut cell_max_col: usize = 0;
    let mut prev_col: Option<usize> = None;
    let mut pending: Option<PendingCell> = None;
    let mut target: Option<TextTarget> = None;
    let mut in_inline = false;
    let mut in_rph = false;

    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"dimension" => {
                        dimension = attr_string(e, b"ref").and_then(|r| parse_dimension_end(&r));
                    }
                    b"sheetFormatPr" => {
                        let format = sheet.format_mut();
                        if let Some(height) = attr_f64(e, b"defaultRowHeight") {
                            format.default_row_height = height;
                        }
                        if let Some(level) = attr_u8(e, b"outlineLevelRow") {
                            format.outline_level_row = level;
                        }
                    }
                    b"row" => {
                        current_row = match attr_usize(e, b"r") {
                            Some(0) => {
                                return Err(Xlsx2CsvError::Parse(format!(
                                    "row number 0 in sheet {:?}",
                                    info.name
                                )))
                            }
                            Some(r) => r - 1,
                            None => next_row,
                        };
                        if current_row >= MAX_ROWS {
                            return Err(Xlsx2CsvError::Parse(format!(
                                "row {} is past the last row of sheet {:?}",
                                current_row + 1,
                                info.name
                            )));
                        }
                        next_row = current_row + 1;
                        prev_col = None;

                        let mut row = sheet.row(current_row);
                        if let Some(height) = attr_f64(e, b"ht") {
                            row.set_height(height);
                        }
                        if attr_bool(e, b"hidden").unwrap_or(false) {
                            row.set_hidden(true);
                        }
                        if let Some(level) = attr_u8(e, b"outlineLevel") {
                            row.set_outline_level(level);
                        }
                        log::trace!("row {}", row.key());
                    }
                    b"c" => {
                        let cell = PendingCell::from_element(e)?;
                        if is_start_event {
                            pending = Some(cell);
                        } else {
                            let col = store_cell(
                                &mut sheet,
                                current_row,
                                prev_col,
                                cell,
                                shared_strings,
                            )?;
                            prev_col = Some(col);
                            cell_max_col = cell_max_col.max(col + 1);
                        }
                    }
                    b"v" if is_start_event && pending.is_some() => {
                        target = Some(TextTarget::Value);
                    }
                    b"f" if is_start_event && pending.is_some() => {
                        target = Some(TextTarget::Formula);
                    }
                    b"is" if is_start_event => in_inline = true,
                    b"rPh" if is_start_event && in_inline => in_rph = true,
                    b"t" if is_start_event && in_inline && !in_rph => {
                        target = Some(TextTarget::Inline);
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if let (Some(t), Some(cell)) = (target, pending.as_mut()) {
                    push_text(cell, t, &e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let (Some(t), Some(cell)) = (target, pending.as_mut()) {
                    push_text(cell, t, &String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"f" | b"t" => target = None,
                b"rPh" => in_rph = false,
                b"is" => in_inline = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let col =
                            store_cell(&mut sheet, current_row, prev_col, cell, shared_strings)?;
                        prev_col = Some(col);
                        cell_max_col = cell_max_col.max(col + 1);
                    }
                    target = None;
                }
                b"sheetData" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut max_col = cell_max_col;
    if sheet.rows().any(|row| row.cell_count() > 0) {
        if let Some((end_col, end_row)) = dimension {
            max_col = max_col.max(end_col + 1);
            sheet.extend_max_row(end_row + 1);
        }
    }
    sheet.set_max_col(max_col);

    log::debug!(
        "parsed sheet {:?}: {} rows, {} columns, {} materialized rows",
        sheet.name(),
        sheet.max_row(),
        sheet.max_col(),
        sheet.row_count()
    );

    Ok(sheet)
}

fn push_text(cell: &mut PendingCell, target: TextTarget, text: &str) {
    match target {
        TextTarget::Value => cell.value.push_str(text),
        TextTarget::Formula => cell.formula.get_or_insert_with(String::new).push_str(text),
        TextTarget::Inline => cell.inline.push_str(text),
    }
}

/// Materialize a finished cell in its row; returns the column it landed in.
///
/// A cell without a reference goes to the column after `prev_col`, the
/// previous cell of the same row, or through `add_cell` if it is the first.
fn store_cell(
    sheet: &mut Sheet,
    row_idx: usize,
    prev_col: Option<usize>,
    pending: PendingCell,
    shared_strings: &[String],
) -> Result<usize> {
    let col = pending.col.or_else(|| prev_col.map(|p| p + 1));
    let style_idx = pending.style_idx;
    let (value, cell_type, formula) = pending.resolve(shared_strings);

    let mut row = sheet.row(row_idx);
    let cell = match col {
        Some(col) => row.try_get_cell(col)?,
        None => row.add_cell(),
    };
    cell.set_raw(value, cell_type);
    cell.set_formula(formula);
    cell.set_style_idx(style_idx);
    Ok(cell.column())
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

    fn pending(tag: CellTypeTag, value: &str) -> PendingCell {
        PendingCell {
            tag,
            value: value.to_string(),
            ..PendingCell::default()
        }
    }

    #[test]
    fn test_parse_cell_type_tag() {
        assert_eq!(parse_cell_type_tag(b"s"), CellTypeTag::Shared);
        assert_eq!(parse_cell_type_tag(b"inlineStr"), CellTypeTag::Inline);
        assert_eq!(parse_cell_type_tag(b"d"), CellTypeTag::Date);
        assert_eq!(parse_cell_type_tag(b"n"), CellTypeTag::Default);
    }

    #[test]
    fn test_resolve_shared_string() {
        let sst = vec!["zero".to_string(), "one".to_string()];
        let (value, t, _) = pending(CellTypeTag::Shared, "1").resolve(&sst);
        assert_eq!(value, "one");
        assert_eq!(t, CellType::String);

        let (missing, _, _) = pending(CellTypeTag::Shared, "7").resolve(&sst);
        assert_eq!(missing, "");
    }

    #[test]
    fn test_resolve_number_and_empty() {
        let (value, t, _) = pending(CellTypeTag::Default, "3.25").resolve(&[]);
        assert_eq!((value.as_str(), t), ("3.25", CellType::Number));
        let (value, t, _) = pending(CellTypeTag::Default, "").resolve(&[]);
        assert_eq!((value.as_str(), t), ("", CellType::String));
    }

    #[test]
    fn test_parse_dimension_end() {
        assert_eq!(parse_dimension_end("A1:C5"), Some((2, 4)));
        assert_eq!(parse_dimension_end("B2"), Some((1, 1)));
        assert_eq!(parse_dimension_end("bogus"), None);
    }
}
