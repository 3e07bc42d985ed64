//! Spreadsheet extraction.

use crate::shared_strings::{string_item_text, SharedStrings};
use office_core::rels::{rels_path_for, resolve_target, Relationships};
use office_core::text::{column_of, numbered_entry};
use office_core::xml::{self, Element};
use office_core::{
    Container, DocumentContent, Error, ExtractOptions, Extraction, ExtractionResult, ImageSink,
    Result, SheetContent, Warning,
};
use std::collections::BTreeMap;
use std::io::{Read, Seek};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const DRAWINGS_DIR: &str = "xl/drawings";

/// A sheet as declared in the workbook descriptor.
#[derive(Debug, Clone)]
struct DeclaredSheet {
    name: String,
    id: String,
    rel_id: Option<String>,
}

/// Extracts sheet rows and drawing images from XLSX containers.
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    /// Create a new spreadsheet extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract an XLSX document from a reader.
    pub fn extract<R: Read + Seek>(
        &self,
        reader: R,
        file_name: &str,
        options: &ExtractOptions,
    ) -> Result<Extraction> {
        let mut container = Container::open(reader)?;
        self.extract_container(&mut container, file_name, options)
    }

    /// Extract from an already opened container.
    pub fn extract_container<R: Read + Seek>(
        &self,
        container: &mut Container<R>,
        file_name: &str,
        options: &ExtractOptions,
    ) -> Result<Extraction> {
        let declared = read_workbook(container)?;
        log::debug!("Workbook {} declares {} sheets", file_name, declared.len());

        let mut warnings = Vec::new();
        let shared_strings = read_shared_strings(container, &mut warnings);
        let workbook_rels = read_workbook_rels(container, &mut warnings);

        let mut sheets = Vec::with_capacity(declared.len());
        for sheet in &declared {
            let Some(entry) = worksheet_entry(container, &workbook_rels, sheet) else {
                Warning::new(
                    WORKBOOK_PART,
                    format!("worksheet for sheet '{}' (id {}) not found", sheet.name, sheet.id),
                )
                .record(&mut warnings);
                continue;
            };

            match read_rows(container, &entry, &shared_strings, &mut warnings) {
                Ok(rows) => sheets.push(SheetContent {
                    name: sheet.name.clone(),
                    id: sheet.id.clone(),
                    rows,
                }),
                Err(warning) => warning.record(&mut warnings),
            }
        }

        let mut sink = ImageSink::create(&options.output_dir, options.seed)?;
        extract_drawing_images(container, &mut sink, &mut warnings);

        log::debug!("Wrote {} images from {}", sink.count(), file_name);
        let images = sink.into_written();
        let result = ExtractionResult::new(file_name, DocumentContent::Sheets(sheets), images.len());

        Ok(Extraction {
            result,
            images,
            warnings,
        })
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the ordered sheet declarations. The workbook descriptor is mandatory.
fn read_workbook<R: Read + Seek>(container: &mut Container<R>) -> Result<Vec<DeclaredSheet>> {
    let content = container.read_text(WORKBOOK_PART).map_err(|e| {
        if e.is_missing_entry() {
            Error::Format(format!("'{}' not found; not a spreadsheet", WORKBOOK_PART))
        } else {
            e
        }
    })?;

    let root = xml::parse(&content)
        .map_err(|e| Error::Format(format!("unreadable workbook descriptor: {}", e)))?;
    let sheet_list = root
        .child("sheets")
        .ok_or_else(|| Error::Format("workbook declares no sheet list".to_string()))?;

    let mut declared = Vec::new();
    for sheet in sheet_list.children("sheet") {
        match (sheet.attr("name"), sheet.attr("sheetId")) {
            (Some(name), Some(id)) => declared.push(DeclaredSheet {
                name: name.to_string(),
                id: id.to_string(),
                rel_id: sheet.attr("r:id").or_else(|| sheet.attr("id")).map(str::to_string),
            }),
            _ => log::warn!("Skipping sheet declaration without name or sheetId"),
        }
    }

    Ok(declared)
}

fn read_shared_strings<R: Read + Seek>(
    container: &mut Container<R>,
    warnings: &mut Vec<Warning>,
) -> SharedStrings {
    if !container.contains(SHARED_STRINGS_PART) {
        return SharedStrings::default();
    }

    match container
        .read_text(SHARED_STRINGS_PART)
        .and_then(|content| SharedStrings::parse(&content))
    {
        Ok(table) => table,
        Err(e) => {
            Warning::new(SHARED_STRINGS_PART, e.to_string()).record(warnings);
            SharedStrings::default()
        }
    }
}

fn read_workbook_rels<R: Read + Seek>(
    container: &mut Container<R>,
    warnings: &mut Vec<Warning>,
) -> Relationships {
    if !container.contains(WORKBOOK_RELS) {
        return Relationships::default();
    }

    match container
        .read_text(WORKBOOK_RELS)
        .and_then(|content| Relationships::parse(&content))
    {
        Ok(rels) => rels,
        Err(e) => {
            Warning::new(WORKBOOK_RELS, e.to_string()).record(warnings);
            Relationships::default()
        }
    }
}

/// Locate a sheet's worksheet entry: through its workbook relationship when
/// it resolves to an existing entry, else by the `sheet<id>.xml` convention.
fn worksheet_entry<R: Read + Seek>(
    container: &Container<R>,
    workbook_rels: &Relationships,
    sheet: &DeclaredSheet,
) -> Option<String> {
    let by_relationship = sheet
        .rel_id
        .as_deref()
        .and_then(|id| workbook_rels.get(id))
        .map(|rel| resolve_target(WORKBOOK_PART, &rel.target));

    by_relationship
        .into_iter()
        .chain(std::iter::once(format!("xl/worksheets/sheet{}.xml", sheet.id)))
        .find(|entry| container.contains(entry))
}

/// Read the rows of one worksheet. Malformed cells are recorded and skipped;
/// only an unreadable worksheet fails the sheet.
fn read_rows<R: Read + Seek>(
    container: &mut Container<R>,
    entry: &str,
    shared_strings: &SharedStrings,
    warnings: &mut Vec<Warning>,
) -> std::result::Result<Vec<BTreeMap<String, String>>, Warning> {
    let content = container
        .read_text(entry)
        .map_err(|e| Warning::new(entry, e.to_string()))?;
    let root = xml::parse(&content).map_err(|e| Warning::new(entry, e.to_string()))?;

    let Some(sheet_data) = root.child("sheetData") else {
        Warning::new(entry, "worksheet has no sheetData").record(warnings);
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for (index, row) in sheet_data.children("row").enumerate() {
        let mut values = BTreeMap::new();
        for cell in row.children("c") {
            match read_cell(cell, shared_strings) {
                Ok(Some((column, value))) => {
                    values.insert(column, value);
                }
                Ok(None) => {}
                Err(message) => {
                    let row_label = row
                        .attr("r")
                        .map(str::to_string)
                        .unwrap_or_else(|| (index + 1).to_string());
                    Warning::new(format!("{} row {}", entry, row_label), message).record(warnings);
                }
            }
        }

        if !values.is_empty() {
            rows.push(values);
        }
    }

    Ok(rows)
}

/// Column letter and value of a cell, or `None` for a cell without a value.
fn read_cell(
    cell: &Element,
    shared_strings: &SharedStrings,
) -> std::result::Result<Option<(String, String)>, String> {
    let reference = cell
        .attr("r")
        .ok_or_else(|| "cell without reference".to_string())?;
    let column =
        column_of(reference).ok_or_else(|| format!("invalid cell reference '{}'", reference))?;

    let value = match cell.attr("t") {
        Some("s") => cell.child("v").map(|v| shared_strings.resolve(&v.text())),
        Some("inlineStr") => cell.child("is").map(string_item_text),
        _ => cell.child("v").map(|v| v.text()),
    };

    Ok(value.map(|value| (column, value)))
}

/// Write every image anchored in a drawing, resolving each anchor's
/// relationship id to its media entry.
fn extract_drawing_images<R: Read + Seek>(
    container: &mut Container<R>,
    sink: &mut ImageSink,
    warnings: &mut Vec<Warning>,
) {
    let mut drawings: Vec<(usize, String)> = container
        .list_entries(|name| numbered_entry(name, DRAWINGS_DIR, "drawing").is_some())
        .into_iter()
        .filter_map(|name| Some((numbered_entry(&name, DRAWINGS_DIR, "drawing")?, name)))
        .collect();
    drawings.sort_by_key(|(number, _)| *number);

    for (_, drawing) in &drawings {
        let anchors = match container
            .read_text(drawing)
            .and_then(|content| xml::parse(&content))
        {
            Ok(root) => picture_embeds(&root),
            Err(e) => {
                Warning::new(drawing, e.to_string()).record(warnings);
                continue;
            }
        };

        if anchors.is_empty() {
            continue;
        }

        let rels_path = rels_path_for(drawing);
        let rels = match container
            .read_text(&rels_path)
            .and_then(|content| Relationships::parse(&content))
        {
            Ok(rels) => rels,
            Err(e) => {
                Warning::new(&rels_path, e.to_string()).record(warnings);
                continue;
            }
        };

        for anchor in anchors {
            let Some(embed) = anchor else {
                Warning::new(drawing, "picture without embedded image reference").record(warnings);
                continue;
            };

            let Some(rel) = rels.get(&embed).filter(|rel| !rel.external) else {
                Warning::new(drawing, format!("unresolvable image relationship '{}'", embed))
                    .record(warnings);
                continue;
            };

            let media = resolve_target(drawing, &rel.target);
            let written = container
                .read_bytes(&media)
                .and_then(|bytes| sink.write(&media, &bytes));
            if let Err(e) = written {
                Warning::new(&media, e.to_string()).record(warnings);
            }
        }
    }
}

/// The `r:embed` id of every picture in a drawing, in document order.
fn picture_embeds(drawing: &Element) -> Vec<Option<String>> {
    drawing
        .descendants("pic")
        .into_iter()
        .map(|pic| {
            pic.descendants("blip")
                .first()
                .and_then(|blip| blip.attr("r:embed").or_else(|| blip.attr("embed")))
                .map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use office_core::fixture::PackageBuilder;
    use office_core::text::is_column;
    use tempfile::TempDir;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Daily" sheetId="1" r:id="rId1"/>
    <sheet name="Exit" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;

    const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Item</t></si><si><t>Result</t></si><si><r><t>Head</t></r><r><t>lights</t></r></si>
</sst>"#;

    fn worksheet(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    fn base_package() -> PackageBuilder {
        PackageBuilder::new()
            .entry("xl/workbook.xml", WORKBOOK)
            .entry("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML)
            .entry("xl/sharedStrings.xml", SHARED)
    }

    fn extract(package: &PackageBuilder, dir: &TempDir) -> Result<Extraction> {
        SpreadsheetExtractor::new().extract(
            package.build(),
            "items.xlsx",
            &ExtractOptions::new(dir.path(), 3),
        )
    }

    #[test]
    fn test_sheets_in_declaration_order_with_shared_strings() {
        let package = base_package()
            .entry(
                "xl/worksheets/sheet2.xml",
                worksheet(r#"<row r="1"><c r="A1" t="s"><v>1</v></c></row>"#),
            )
            .entry(
                "xl/worksheets/sheet1.xml",
                worksheet(
                    r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
                       <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>42</v></c><c r="AA2" t="inlineStr"><is><t>ok</t></is></c></row>"#,
                ),
            );
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();
        let sheets = extraction.result.sheets().unwrap();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Daily");
        assert_eq!(sheets[0].id, "1");
        assert_eq!(sheets[1].name, "Exit");

        let rows = &sheets[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["A"], "Item");
        assert_eq!(rows[0]["B"], "Result");
        assert_eq!(rows[1]["A"], "Headlights");
        assert_eq!(rows[1]["B"], "42");
        assert_eq!(rows[1]["AA"], "ok");
        assert!(rows.iter().flat_map(|r| r.keys()).all(|k| is_column(k)));
        assert_eq!(sheets[1].rows[0]["A"], "Result");
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_missing_worksheet_is_skipped_with_warning() {
        let package = base_package().entry(
            "xl/worksheets/sheet1.xml",
            worksheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#),
        );
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();
        let sheets = extraction.result.sheets().unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Daily");
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].message.contains("Exit"));
    }

    #[test]
    fn test_falls_back_to_sheet_id_without_relationships() {
        let package = PackageBuilder::new()
            .entry("xl/workbook.xml", WORKBOOK)
            .entry("xl/worksheets/sheet1.xml", worksheet(r#"<row><c r="C7"><v>x</v></c></row>"#))
            .entry("xl/worksheets/sheet2.xml", worksheet(""));
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();
        let sheets = extraction.result.sheets().unwrap();

        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].rows[0]["C"], "x");
        assert!(sheets[1].rows.is_empty());
    }

    #[test]
    fn test_bad_cells_are_skipped() {
        let package = base_package()
            .entry(
                "xl/worksheets/sheet1.xml",
                worksheet(
                    r#"<row r="1"><c><v>no ref</v></c><c r="11"><v>digits only</v></c><c r="B1" t="s"><v>99</v></c><c r="C1"/></row>"#,
                ),
            )
            .entry("xl/worksheets/sheet2.xml", worksheet(""));
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();
        let rows = &extraction.result.sheets().unwrap()[0].rows;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0]["B"], "");
        assert_eq!(extraction.warnings.len(), 2);
    }

    #[test]
    fn test_missing_workbook_is_format_error() {
        let package = PackageBuilder::new().entry("ppt/presentation.xml", "<p/>");
        let dir = TempDir::new().unwrap();

        assert!(matches!(extract(&package, &dir), Err(Error::Format(_))));
    }

    #[test]
    fn test_drawing_images_resolved_through_relationships() {
        let drawing = r#"<xdr:wsDr xmlns:xdr="x" xmlns:a="a" xmlns:r="r">
            <xdr:twoCellAnchor><xdr:pic><xdr:blipFill><a:blip r:embed="rId1"/></xdr:blipFill></xdr:pic></xdr:twoCellAnchor>
            <xdr:twoCellAnchor><xdr:pic><xdr:blipFill><a:blip r:embed="rId9"/></xdr:blipFill></xdr:pic></xdr:twoCellAnchor>
            <xdr:oneCellAnchor><xdr:pic><xdr:blipFill><a:blip r:embed="rId2"/></xdr:blipFill></xdr:pic></xdr:oneCellAnchor>
        </xdr:wsDr>"#;
        let drawing_rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image2.jpeg"/>
        </Relationships>"#;
        let package = base_package()
            .entry("xl/worksheets/sheet1.xml", worksheet(""))
            .entry("xl/worksheets/sheet2.xml", worksheet(""))
            .entry("xl/drawings/drawing1.xml", drawing)
            .entry("xl/drawings/_rels/drawing1.xml.rels", drawing_rels)
            .entry("xl/media/image1.png", [1u8])
            .entry("xl/media/image2.jpeg", [2u8]);
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();

        let names: Vec<&str> = extraction.images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["image_3_1.png", "image_3_2.png"]);
        assert_eq!(extraction.images[1].original_path, "xl/media/image2.jpeg");
        assert_eq!(extraction.result.metadata.image_count, 2);
        assert_eq!(std::fs::read(dir.path().join("image_3_2.png")).unwrap(), vec![2]);
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].message.contains("rId9"));
    }

    #[test]
    fn test_drawing_without_rels_is_warning() {
        let drawing = r#"<xdr:wsDr xmlns:xdr="x" xmlns:a="a" xmlns:r="r"><xdr:pic><a:blip r:embed="rId1"/></xdr:pic></xdr:wsDr>"#;
        let package = base_package()
            .entry("xl/worksheets/sheet1.xml", worksheet(""))
            .entry("xl/worksheets/sheet2.xml", worksheet(""))
            .entry("xl/drawings/drawing1.xml", drawing);
        let dir = TempDir::new().unwrap();

        let extraction = extract(&package, &dir).unwrap();

        assert!(extraction.images.is_empty());
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].location, "xl/drawings/_rels/drawing1.xml.rels");
    }
}
