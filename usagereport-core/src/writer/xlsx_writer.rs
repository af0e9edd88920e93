// ! XLSX package assembly for worksheet grids

use super::{CellStyle, GridCell, WorksheetGrid};
use crate::error::{ReportError, Result};
use crate::reader::CellValue;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Write a grid as a single-sheet xlsx file.
///
/// The package is assembled in memory first, so nothing is created on disk
/// when assembly fails.
pub fn write_xlsx(path: &Path, grid: &WorksheetGrid, accent_argb: &str) -> Result<()> {
    let bytes = build_xlsx(grid, accent_argb)?;
    fs::write(path, bytes).map_err(|e| ReportError::io(path, e))
}

/// Assemble the xlsx package bytes for a grid
pub fn build_xlsx(grid: &WorksheetGrid, accent_argb: &str) -> Result<Vec<u8>> {
    let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", content_types_xml()?),
        ("_rels/.rels", root_rels_xml()?),
        ("xl/workbook.xml", workbook_xml(&grid.name)?),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()?),
        ("xl/styles.xml", styles_xml(accent_argb)?),
        ("xl/worksheets/sheet1.xml", sheet_xml(grid)?),
    ];

    for (name, content) in parts {
        zip_writer.start_file(name, options)?;
        zip_writer
            .write_all(&content)
            .map_err(|e| ReportError::Package(format!("{}: {}", name, e)))?;
    }

    Ok(zip_writer.finish()?.into_inner())
}

/// Convert 0-based coordinates to an Excel-style reference (e.g. "A1")
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Convert column number to letter (0 -> A, 25 -> Z, 26 -> AA)
fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

fn style_index(style: CellStyle) -> &'static str {
    match style {
        CellStyle::Plain => "0",
        CellStyle::Body => "1",
        CellStyle::Accent => "2",
    }
}

/// Thin wrapper over the quick-xml writer that maps its errors
struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Vec::new()),
        };
        part.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ReportError::Package(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.emit(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.emit(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, content: &str) -> Result<()> {
        self.emit(Event::Text(BytesText::new(content)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/workbook.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ),
        ],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/worksheets/sheet1.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            ),
        ],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/styles.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
            ),
        ],
    )?;
    xml.end("Types")?;
    Ok(xml.finish())
}

fn root_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_REL_NS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            ),
            ("Target", "xl/workbook.xml"),
        ],
    )?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("workbook", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;
    xml.start("sheets", &[])?;
    xml.empty(
        "sheet",
        &[("name", sheet_name), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    xml.end("sheets")?;
    xml.end("workbook")?;
    Ok(xml.finish())
}

fn workbook_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_REL_NS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
            ),
            ("Target", "worksheets/sheet1.xml"),
        ],
    )?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId2"),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
            ),
            ("Target", "styles.xml"),
        ],
    )?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// Styles part with three cell formats: plain (0), body (1), accent (2)
fn styles_xml(accent_argb: &str) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("styleSheet", &[("xmlns", MAIN_NS)])?;

    xml.start("fonts", &[("count", "1")])?;
    xml.start("font", &[])?;
    xml.empty("sz", &[("val", "11")])?;
    xml.empty("name", &[("val", "Calibri")])?;
    xml.empty("family", &[("val", "2")])?;
    xml.end("font")?;
    xml.end("fonts")?;

    xml.start("fills", &[("count", "3")])?;
    for pattern in ["none", "gray125"] {
        xml.start("fill", &[])?;
        xml.empty("patternFill", &[("patternType", pattern)])?;
        xml.end("fill")?;
    }
    xml.start("fill", &[])?;
    xml.start("patternFill", &[("patternType", "solid")])?;
    xml.empty("fgColor", &[("rgb", accent_argb)])?;
    xml.empty("bgColor", &[("rgb", accent_argb)])?;
    xml.end("patternFill")?;
    xml.end("fill")?;
    xml.end("fills")?;

    xml.start("borders", &[("count", "2")])?;
    xml.start("border", &[])?;
    for side in ["left", "right", "top", "bottom", "diagonal"] {
        xml.empty(side, &[])?;
    }
    xml.end("border")?;
    xml.start("border", &[])?;
    for side in ["left", "right", "top", "bottom"] {
        xml.start(side, &[("style", "thin")])?;
        xml.empty("color", &[("indexed", "64")])?;
        xml.end(side)?;
    }
    xml.empty("diagonal", &[])?;
    xml.end("border")?;
    xml.end("borders")?;

    xml.start("cellStyleXfs", &[("count", "1")])?;
    xml.empty(
        "xf",
        &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")],
    )?;
    xml.end("cellStyleXfs")?;

    xml.start("cellXfs", &[("count", "3")])?;
    xml.empty(
        "xf",
        &[
            ("numFmtId", "0"),
            ("fontId", "0"),
            ("fillId", "0"),
            ("borderId", "0"),
            ("xfId", "0"),
        ],
    )?;
    for fill_id in ["0", "2"] {
        let mut attrs = vec![
            ("numFmtId", "0"),
            ("fontId", "0"),
            ("fillId", fill_id),
            ("borderId", "1"),
            ("xfId", "0"),
            ("applyBorder", "1"),
            ("applyAlignment", "1"),
        ];
        if fill_id != "0" {
            attrs.push(("applyFill", "1"));
        }
        xml.start("xf", &attrs)?;
        xml.empty("alignment", &[("horizontal", "center"), ("vertical", "center")])?;
        xml.end("xf")?;
    }
    xml.end("cellXfs")?;

    xml.start("cellStyles", &[("count", "1")])?;
    xml.empty("cellStyle", &[("name", "Normal"), ("xfId", "0"), ("builtinId", "0")])?;
    xml.end("cellStyles")?;

    xml.end("styleSheet")?;
    Ok(xml.finish())
}

fn sheet_xml(grid: &WorksheetGrid) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("worksheet", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;

    let width = grid.width();
    if !grid.rows.is_empty() && width > 0 {
        let dimension = format!(
            "A1:{}",
            cell_ref(grid.rows.len() as u32 - 1, width as u32 - 1)
        );
        xml.empty("dimension", &[("ref", dimension.as_str())])?;
    }

    if let (Some(column_width), true) = (grid.column_width, width > 0) {
        let max = width.to_string();
        let column_width = column_width.to_string();
        xml.start("cols", &[])?;
        xml.empty(
            "col",
            &[
                ("min", "1"),
                ("max", max.as_str()),
                ("width", column_width.as_str()),
                ("customWidth", "1"),
            ],
        )?;
        xml.end("cols")?;
    }

    xml.start("sheetData", &[])?;
    for (row_idx, row) in grid.rows.iter().enumerate() {
        let row_number = (row_idx + 1).to_string();
        xml.start("row", &[("r", row_number.as_str())])?;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(&mut xml, row_idx as u32, col_idx as u32, cell)?;
        }
        xml.end("row")?;
    }
    xml.end("sheetData")?;

    if !grid.merges.is_empty() {
        let count = grid.merges.len().to_string();
        xml.start("mergeCells", &[("count", count.as_str())])?;
        for merge in &grid.merges {
            let range = merge.to_excel_ref();
            xml.empty("mergeCell", &[("ref", range.as_str())])?;
        }
        xml.end("mergeCells")?;
    }

    xml.end("worksheet")?;
    Ok(xml.finish())
}

fn write_cell(xml: &mut XmlPart, row: u32, col: u32, cell: &GridCell) -> Result<()> {
    let reference = cell_ref(row, col);
    let style = style_index(cell.style);

    match &cell.value {
        CellValue::Empty if cell.style == CellStyle::Plain => Ok(()),
        CellValue::Empty => xml.empty("c", &[("r", reference.as_str()), ("s", style)]),
        CellValue::Number(n) => {
            xml.start("c", &[("r", reference.as_str()), ("s", style)])?;
            xml.start("v", &[])?;
            xml.text(&CellValue::Number(*n).to_string())?;
            xml.end("v")?;
            xml.end("c")
        }
        CellValue::Boolean(b) => {
            xml.start("c", &[("r", reference.as_str()), ("s", style), ("t", "b")])?;
            xml.start("v", &[])?;
            xml.text(if *b { "1" } else { "0" })?;
            xml.end("v")?;
            xml.end("c")
        }
        other => {
            let content = other.to_string();
            xml.start(
                "c",
                &[("r", reference.as_str()), ("s", style), ("t", "inlineStr")],
            )?;
            xml.start("is", &[])?;
            if content.trim() != content {
                xml.start("t", &[("xml:space", "preserve")])?;
            } else {
                xml.start("t", &[])?;
            }
            xml.text(&content)?;
            xml.end("t")?;
            xml.end("is")?;
            xml.end("c")
        }
    }
}
