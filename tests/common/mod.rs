//! Common test utilities: in-memory XLSX builders and export helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

use xlsx2csv::export::{convert, CsvOptions};

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const EMPTY_SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1"/>
  <sheetData/>
</worksheet>"#;

/// Cell data for building sheets
#[derive(Clone, Debug)]
pub struct CellData {
    /// 1-based row the cell is written under
    pub row: u32,
    /// `r` attribute; `None` writes a `<c>` without a reference
    pub cell_ref: Option<String>,
    pub value: String,
    pub cell_type: Option<String>,
    pub style_index: Option<u32>,
    pub formula: Option<String>,
}

impl CellData {
    pub fn new(cell_ref: &str, value: &str) -> Self {
        Self {
            row: parse_row_from_ref(cell_ref),
            cell_ref: Some(cell_ref.to_string()),
            value: value.to_string(),
            cell_type: None,
            style_index: None,
            formula: None,
        }
    }

    /// A cell without an `r` attribute, placed after the previous cell of `row`
    pub fn unreferenced(row: u32, value: &str) -> Self {
        Self {
            row,
            cell_ref: None,
            ..Self::new("A1", value)
        }
    }

    pub fn with_type(mut self, cell_type: &str) -> Self {
        self.cell_type = Some(cell_type.to_string());
        self
    }

    pub fn with_style(mut self, style_index: u32) -> Self {
        self.style_index = Some(style_index);
        self
    }

    pub fn with_formula(mut self, formula: &str) -> Self {
        self.formula = Some(formula.to_string());
        self
    }

    /// Create a cell with shared string reference
    pub fn shared_string(cell_ref: &str, sst_index: u32) -> Self {
        Self::new(cell_ref, &sst_index.to_string()).with_type("s")
    }

    /// Create a numeric cell
    pub fn number(cell_ref: &str, value: f64) -> Self {
        Self::new(cell_ref, &value.to_string())
    }

    /// Create an inline string cell
    pub fn inline_string(cell_ref: &str, value: &str) -> Self {
        Self::new(cell_ref, value).with_type("inlineStr")
    }

    /// Create a boolean cell
    pub fn boolean(cell_ref: &str, value: bool) -> Self {
        Self::new(cell_ref, if value { "1" } else { "0" }).with_type("b")
    }

    /// A `<c r=".."/>` element with no children
    pub fn blank(cell_ref: &str) -> Self {
        Self::new(cell_ref, "").with_type("blank")
    }
}

/// Attributes of a `<row>` element
#[derive(Clone, Debug, Default)]
pub struct RowAttrs {
    pub height: Option<f64>,
    pub hidden: bool,
    pub outline_level: Option<u8>,
}

/// Builder for creating worksheet XML
#[derive(Clone, Debug, Default)]
pub struct SheetBuilder {
    pub name: String,
    pub state: Option<String>,
    cells: Vec<CellData>,
    rows: BTreeMap<u32, RowAttrs>,
    dimension: Option<String>,
    default_row_height: Option<f64>,
    omit_row_numbers: bool,
}

impl SheetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a cell to the sheet
    pub fn add_cell(&mut self, cell: CellData) -> &mut Self {
        self.rows.entry(cell.row).or_default();
        self.cells.push(cell);
        self
    }

    /// Add a simple value cell
    pub fn add_value(&mut self, cell_ref: &str, value: &str) -> &mut Self {
        self.add_cell(CellData::new(cell_ref, value))
    }

    /// Add a numeric cell
    pub fn add_number(&mut self, cell_ref: &str, value: f64) -> &mut Self {
        self.add_cell(CellData::number(cell_ref, value))
    }

    /// Add a shared string cell
    pub fn add_shared_string(&mut self, cell_ref: &str, sst_index: u32) -> &mut Self {
        self.add_cell(CellData::shared_string(cell_ref, sst_index))
    }

    /// Add an empty `<row>` element
    pub fn add_empty_row(&mut self, row: u32) -> &mut Self {
        self.rows.entry(row).or_default();
        self
    }

    /// Set row height
    pub fn set_row_height(&mut self, row: u32, height: f64) -> &mut Self {
        self.rows.entry(row).or_default().height = Some(height);
        self
    }

    pub fn hide_row(&mut self, row: u32) -> &mut Self {
        self.rows.entry(row).or_default().hidden = true;
        self
    }

    pub fn set_outline_level(&mut self, row: u32, level: u8) -> &mut Self {
        self.rows.entry(row).or_default().outline_level = Some(level);
        self
    }

    /// Set explicit dimension
    pub fn set_dimension(&mut self, dimension: &str) -> &mut Self {
        self.dimension = Some(dimension.to_string());
        self
    }

    pub fn set_default_row_height(&mut self, height: f64) -> &mut Self {
        self.default_row_height = Some(height);
        self
    }

    /// Write `<row>` elements without an `r` attribute
    pub fn omit_row_numbers(&mut self) -> &mut Self {
        self.omit_row_numbers = true;
        self
    }

    pub fn set_state(&mut self, state: &str) -> &mut Self {
        self.state = Some(state.to_string());
        self
    }

    /// Build the worksheet XML
    pub fn build_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if let Some(ref dim) = self.dimension {
            xml.push_str(&format!(r#"<dimension ref="{dim}"/>"#));
        }

        if let Some(height) = self.default_row_height {
            xml.push_str(&format!(r#"<sheetFormatPr defaultRowHeight="{height}"/>"#));
        }

        xml.push_str("<sheetData>");

        for (row_num, attrs) in &self.rows {
            xml.push_str("<row");
            if !self.omit_row_numbers {
                xml.push_str(&format!(r#" r="{row_num}""#));
            }
            if let Some(height) = attrs.height {
                xml.push_str(&format!(r#" ht="{height}" customHeight="1""#));
            }
            if attrs.hidden {
                xml.push_str(r#" hidden="1""#);
            }
            if let Some(level) = attrs.outline_level {
                xml.push_str(&format!(r#" outlineLevel="{level}""#));
            }
            xml.push('>');

            for cell in self.cells.iter().filter(|c| c.row == *row_num) {
                write_cell(&mut xml, cell);
            }

            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn write_cell(xml: &mut String, cell: &CellData) {
    xml.push_str("<c");
    if let Some(ref r) = cell.cell_ref {
        xml.push_str(&format!(r#" r="{r}""#));
    }
    if cell.cell_type.as_deref() == Some("blank") {
        if let Some(s) = cell.style_index {
            xml.push_str(&format!(r#" s="{s}""#));
        }
        xml.push_str("/>");
        return;
    }
    if let Some(ref t) = cell.cell_type {
        xml.push_str(&format!(r#" t="{t}""#));
    }
    if let Some(s) = cell.style_index {
        xml.push_str(&format!(r#" s="{s}""#));
    }
    xml.push('>');

    if let Some(ref formula) = cell.formula {
        xml.push_str(&format!("<f>{}</f>", escape_xml(formula)));
    }

    if cell.cell_type.as_deref() == Some("inlineStr") {
        xml.push_str(&format!("<is><t>{}</t></is>", escape_xml(&cell.value)));
    } else if !cell.value.is_empty() {
        xml.push_str(&format!("<v>{}</v>", escape_xml(&cell.value)));
    }

    xml.push_str("</c>");
}

/// XLSX builder for creating test fixtures
#[derive(Clone, Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    /// Raw `<si>` bodies
    shared_strings: Vec<String>,
    date1904: bool,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet to the workbook
    pub fn add_sheet(&mut self, name: &str) -> &mut SheetBuilder {
        self.sheets.push(SheetBuilder::new(name));
        self.sheets.last_mut().unwrap()
    }

    /// Add a shared string and return its index
    pub fn add_shared_string(&mut self, s: &str) -> u32 {
        self.add_shared_string_xml(&format!("<t>{}</t>", escape_xml(s)))
    }

    /// Add a shared string from raw `<si>` content (rich runs, phonetics)
    pub fn add_shared_string_xml(&mut self, si_body: &str) -> u32 {
        let index = self.shared_strings.len() as u32;
        self.shared_strings.push(si_body.to_string());
        index
    }

    pub fn date1904(&mut self) -> &mut Self {
        self.date1904 = true;
        self
    }

    /// Build the XLSX file as bytes
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(self.build_content_types().as_bytes())
                .unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(RELS_XML.as_bytes()).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(self.build_workbook().as_bytes()).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(self.build_workbook_rels().as_bytes())
                .unwrap();

            for (i, sheet) in self.sheets.iter().enumerate() {
                let path = format!("xl/worksheets/sheet{}.xml", i + 1);
                zip.start_file(&path, options).unwrap();
                zip.write_all(sheet.build_xml().as_bytes()).unwrap();
            }

            if !self.shared_strings.is_empty() {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(self.build_shared_strings().as_bytes())
                    .unwrap();
            }

            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn build_content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"
  <Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        if !self.shared_strings.is_empty() {
            xml.push_str(r#"
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
        }
        xml.push_str("\n</Types>");
        xml
    }

    fn build_workbook(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        if self.date1904 {
            xml.push_str(r#"<workbookPr date1904="1"/>"#);
        }
        xml.push_str("<sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            let state = sheet
                .state
                .as_ref()
                .map(|s| format!(r#" state="{s}""#))
                .unwrap_or_default();
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                i + 1,
                state,
                i + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn build_workbook_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"
  <Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }
        if !self.shared_strings.is_empty() {
            xml.push_str(&format!(
                r#"
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
                self.sheets.len() + 1
            ));
        }
        xml.push_str("\n</Relationships>");
        xml
    }

    fn build_shared_strings(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            self.shared_strings.len()
        );
        for body in &self.shared_strings {
            xml.push_str(&format!("<si>{body}</si>"));
        }
        xml.push_str("</sst>");
        xml
    }
}

/// A workbook with one sheet whose sheetData is empty
pub fn create_minimal_xlsx() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let builder = XlsxBuilder {
            sheets: vec![SheetBuilder::new("Sheet1")],
            ..XlsxBuilder::default()
        };

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(builder.build_workbook().as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options)
            .unwrap();
        zip.write_all(builder.build_workbook_rels().as_bytes())
            .unwrap();
        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        zip.write_all(EMPTY_SHEET_XML.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Convert sheet `index` of `data` and return the CSV text
pub fn to_csv(data: &[u8], index: usize, options: &CsvOptions) -> String {
    let mut out = Vec::new();
    convert(data, index, &mut out, options).expect("conversion failed");
    String::from_utf8(out).expect("CSV is not UTF-8")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn parse_row_from_ref(cell_ref: &str) -> u32 {
    let row_str: String = cell_ref.chars().filter(|c| c.is_ascii_digit()).collect();
    row_str.parse().unwrap_or(1)
}
