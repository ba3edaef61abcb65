//! Builders for minimal XLSX packages used by the integration tests
#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct MockSheet<'a> {
    pub name: &'a str,
    /// (cell, target) pairs stored as external hyperlink relationships
    pub links: &'a [(&'a str, &'a str)],
    /// (cell, location) pairs for internal hyperlinks
    pub internal: &'a [(&'a str, &'a str)],
}

impl<'a> MockSheet<'a> {
    pub fn new(name: &'a str, links: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            name,
            links,
            internal: &[],
        }
    }
}

/// Cell holding a formula and a cached value, never linked
pub const PLAIN_CELL: &str = r#"<row r="100"><c r="A100" s="1"><f>SUM(1,2)</f><v>3</v></c></row>"#;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn row_of(cell: &str) -> &str {
    cell.trim_start_matches(|c: char| c.is_ascii_alphabetic())
}

pub fn worksheet_xml(sheet: &MockSheet) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData>"#,
    );
    for (i, (cell, _)) in sheet.links.iter().chain(sheet.internal.iter()).enumerate() {
        xml.push_str(&format!(
            r#"<row r="{}"><c r="{}" t="inlineStr"><is><t>Link {}</t></is></c></row>"#,
            row_of(cell),
            cell,
            i + 1
        ));
    }
    xml.push_str(PLAIN_CELL);
    xml.push_str("</sheetData>");

    if !sheet.links.is_empty() || !sheet.internal.is_empty() {
        xml.push_str("<hyperlinks>");
        for (i, (cell, _)) in sheet.links.iter().enumerate() {
            xml.push_str(&format!(
                r#"<hyperlink ref="{}" r:id="rId{}" display="Link {}"/>"#,
                cell,
                i + 1,
                i + 1
            ));
        }
        for (cell, location) in sheet.internal {
            xml.push_str(&format!(
                r#"<hyperlink ref="{}" location="{}"/>"#,
                cell,
                escape(location)
            ));
        }
        xml.push_str("</hyperlinks>");
    }

    xml.push_str("</worksheet>");
    xml
}

pub fn worksheet_rels_xml(sheet: &MockSheet) -> Option<String> {
    if sheet.links.is_empty() {
        return None;
    }
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, (_, target)) in sheet.links.iter().enumerate() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="{}" TargetMode="External"/>"#,
            i + 1,
            escape(target)
        ));
    }
    xml.push_str("</Relationships>");
    Some(xml)
}

/// Write an XLSX package with the given sheets
pub fn create_mock_xlsx(path: &Path, sheets: &[MockSheet]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    // 1. [Content_Types].xml
    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    // 2. _rels/.rels
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    // 3. xl/workbook.xml
    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            sheet.name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    // 4. xl/_rels/workbook.xml.rels
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1, i + 1
        ));
    }
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    // 5. sheets and their relationships
    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(worksheet_xml(sheet).as_bytes())?;

        if let Some(rels) = worksheet_rels_xml(sheet) {
            zip.start_file(format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1), options)?;
            zip.write_all(rels.as_bytes())?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Decompressed content of one part
pub fn read_part(path: &Path, name: &str) -> anyhow::Result<String> {
    let mut zip = zip::ZipArchive::new(File::open(path)?)?;
    let mut file = zip.by_name(name)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Every part of the package as (name, decompressed bytes), in archive order
pub fn all_parts(path: &Path) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let mut zip = zip::ZipArchive::new(File::open(path)?)?;
    let mut parts = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        parts.push((file.name().to_string(), content));
    }
    Ok(parts)
}

/// Write a one-sheet package from raw worksheet and relationship XML
pub fn create_single_sheet_xlsx(path: &Path, worksheet: &str, rels: &str) -> anyhow::Result<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(br#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#)?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#)?;
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(worksheet.as_bytes())?;
    zip.start_file("xl/worksheets/_rels/sheet1.xml.rels", options)?;
    zip.write_all(rels.as_bytes())?;

    zip.finish()?;
    Ok(())
}
