//! XML parsing of the XLSX parts that carry hyperlinks

use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use zip::ZipArchive;
use zip::result::ZipError;

use super::parser_utils::{attribute, parse_cell_range, parse_cell_ref, rels_part_for, resolve_part_name};
use super::{Cell, Hyperlink, Relationship, Row, Sheet};
use crate::error::PackageError;

pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Read a mandatory part of the package
pub fn read_part(
    archive: &mut ZipArchive<impl Read + Seek>,
    name: &str,
) -> Result<Vec<u8>, PackageError> {
    try_read_part(archive, name)?.ok_or_else(|| PackageError::MissingPart(name.to_string()))
}

/// Read an optional part of the package
pub fn try_read_part(
    archive: &mut ZipArchive<impl Read + Seek>,
    name: &str,
) -> Result<Option<Vec<u8>>, PackageError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|source| PackageError::Read {
            part: name.to_string(),
            source,
        })?;
    Ok(Some(content))
}

/// Read every worksheet of the workbook, in workbook order, with its hyperlinks
pub fn read_sheets(
    archive: &mut ZipArchive<impl Read + Seek>,
) -> Result<Vec<Sheet>, PackageError> {
    let workbook_xml = read_part(archive, WORKBOOK_PART)?;
    let entries = parse_sheet_entries(WORKBOOK_PART, &workbook_xml)?;

    let workbook_rels_part = rels_part_for(WORKBOOK_PART);
    let workbook_rels_xml = read_part(archive, &workbook_rels_part)?;
    let workbook_rels = parse_relationships(&workbook_rels_part, &workbook_rels_xml)?;

    let mut sheets = Vec::with_capacity(entries.len());
    for (name, rel_id) in entries {
        let rel = workbook_rels
            .iter()
            .find(|r| r.id == rel_id)
            .ok_or_else(|| PackageError::UnresolvedSheet {
                sheet: name.clone(),
                rel_id: rel_id.clone(),
            })?;
        let part_name = resolve_part_name(WORKBOOK_PART, &rel.target);
        let rels_part_name = rels_part_for(&part_name);

        let relationships = match try_read_part(archive, &rels_part_name)? {
            Some(xml) => parse_relationships(&rels_part_name, &xml)?,
            None => Vec::new(),
        };

        let sheet_xml = read_part(archive, &part_name)?;
        let mut sheet = Sheet {
            name,
            part_name,
            rels_part_name,
            relationships,
            rows: Vec::new(),
            detached: Vec::new(),
        };
        parse_worksheet(&mut sheet, &sheet_xml)?;
        debug!(
            "Sheet '{}' ({}): {} hyperlink(s)",
            sheet.name,
            sheet.part_name,
            sheet.hyperlinks().count()
        );
        sheets.push(sheet);
    }

    Ok(sheets)
}

/// `(name, r:id)` of every `<sheet>` in `xl/workbook.xml`
fn parse_sheet_entries(part: &str, xml: &[u8]) -> Result<Vec<(String, String)>, PackageError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(part, &e, b"name", false)?.unwrap_or_default();
                // A <sheet> without r:id has no part to follow
                match attribute(part, &e, b"id", true)? {
                    Some(rel_id) => entries.push((name, rel_id)),
                    None => warn!("Sheet '{}' has no relationship id, skipping", name),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PackageError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// Parse a relationship part
pub fn parse_relationships(part: &str, xml: &[u8]) -> Result<Vec<Relationship>, PackageError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                relationships.push(Relationship {
                    id: attribute(part, &e, b"Id", false)?.unwrap_or_default(),
                    rel_type: attribute(part, &e, b"Type", false)?.unwrap_or_default(),
                    target: attribute(part, &e, b"Target", false)?.unwrap_or_default(),
                    external: attribute(part, &e, b"TargetMode", false)?
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PackageError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Collect the cell grid and the hyperlinks of a worksheet into `sheet.rows`
fn parse_worksheet(sheet: &mut Sheet, xml: &[u8]) -> Result<(), PackageError> {
    let part = sheet.part_name.clone();
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut cells: BTreeMap<(u32, u32), Cell> = BTreeMap::new();
    let mut hyperlinks: Vec<Hyperlink> = Vec::new();

    // Row and cell references are optional; missing ones follow the previous
    let mut current_row: Option<u32> = None;
    let mut next_col = 0u32;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let index = attribute(&part, &e, b"r", false)?
                        .and_then(|r| r.trim().parse::<u32>().ok())
                        .and_then(|r| r.checked_sub(1))
                        .unwrap_or_else(|| current_row.map_or(0, |r| r + 1));
                    current_row = Some(index);
                    next_col = 0;
                }
                b"c" => {
                    let (row, col) = match attribute(&part, &e, b"r", false)?
                        .as_deref()
                        .and_then(parse_cell_ref)
                    {
                        Some(pos) => pos,
                        None => (current_row.unwrap_or(0), next_col),
                    };
                    next_col = col + 1;
                    cells.entry((row, col)).or_insert_with(|| Cell::new(row, col));
                }
                b"hyperlink" => hyperlinks.push(parse_hyperlink(&part, &e)?),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PackageError::xml(&part, e)),
            _ => {}
        }
        buf.clear();
    }

    let mut detached = Vec::new();
    for mut hyperlink in hyperlinks {
        if let Some(rel_id) = &hyperlink.rel_id {
            match sheet.relationship(rel_id) {
                Some(rel) if rel.is_hyperlink() => hyperlink.target = Some(rel.target.clone()),
                Some(rel) => warn!(
                    "Hyperlink {} in sheet '{}' uses relationship '{}' of type {}, ignored",
                    hyperlink.reference, sheet.name, rel_id, rel.rel_type
                ),
                None => warn!(
                    "Hyperlink {} in sheet '{}' points to missing relationship '{}'",
                    hyperlink.reference, sheet.name, rel_id
                ),
            }
        }

        // A range hyperlink is anchored on its top-left cell
        let Some((row, col, _, _)) = parse_cell_range(&hyperlink.reference) else {
            warn!(
                "Hyperlink with invalid reference '{}' in sheet '{}' has no anchor cell",
                hyperlink.reference, sheet.name
            );
            detached.push(hyperlink);
            continue;
        };
        let cell = cells.entry((row, col)).or_insert_with(|| Cell::new(row, col));
        if cell.hyperlink.is_some() {
            warn!(
                "Cell {} in sheet '{}' has more than one hyperlink, the first one is anchored",
                cell.reference(),
                sheet.name
            );
            detached.push(hyperlink);
            continue;
        }
        cell.hyperlink = Some(hyperlink);
    }

    let mut rows: Vec<Row> = Vec::new();
    for ((row, _), cell) in cells {
        match rows.last_mut() {
            Some(last) if last.index == row => last.cells.push(cell),
            _ => rows.push(Row {
                index: row,
                cells: vec![cell],
            }),
        }
    }
    sheet.rows = rows;
    sheet.detached = detached;

    Ok(())
}

fn parse_hyperlink(part: &str, e: &BytesStart<'_>) -> Result<Hyperlink, PackageError> {
    Ok(Hyperlink {
        reference: attribute(part, e, b"ref", false)?.unwrap_or_default(),
        rel_id: attribute(part, e, b"id", true)?,
        target: None,
        location: attribute(part, e, b"location", false)?,
        display: attribute(part, e, b"display", false)?,
    })
}
