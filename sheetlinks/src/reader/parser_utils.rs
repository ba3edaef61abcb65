//! Common parsing utilities shared by the package reader and writer

use quick_xml::events::BytesStart;

use crate::error::PackageError;

/// Parse a cell reference like "A1" into (row, col) as 0-based indices
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let cell_ref = cell_ref.trim().trim_start_matches('$');
    let mut col = 0u32;
    let mut row_str = String::new();

    for ch in cell_ref.chars() {
        if ch.is_ascii_alphabetic() {
            if !row_str.is_empty() {
                return None;
            }
            col = col
                .checked_mul(26)?
                .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
        } else if ch.is_ascii_digit() {
            row_str.push(ch);
        } else if ch != '$' {
            return None;
        }
    }

    if row_str.is_empty() || col == 0 {
        return None;
    }

    let row = row_str.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }

    // Convert to 0-based
    Some((row - 1, col - 1))
}

/// Parse a cell range like "A1:B2" into (start_row, start_col, end_row, end_col).
/// A single cell reference is accepted as a one-cell range.
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    match range.split_once(':') {
        Some((start, end)) => {
            let (start_row, start_col) = parse_cell_ref(start)?;
            let (end_row, end_col) = parse_cell_ref(end)?;
            Some((start_row, start_col, end_row, end_col))
        }
        None => {
            let (row, col) = parse_cell_ref(range)?;
            Some((row, col, row, col))
        }
    }
}

/// Render 0-based (row, col) as an A1-style reference
pub fn cell_ref(row: u32, col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}

/// Relationship part that belongs to a package part
/// (`xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`)
pub fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target against the part that owns the relationship.
///
/// Absolute targets (`/xl/worksheets/sheet1.xml`) are taken from the package
/// root, relative ones from the directory of `source_part`; `.` and `..`
/// segments are collapsed.
pub fn resolve_part_name(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !target.starts_with('/') {
        if let Some((dir, _)) = source_part.rsplit_once('/') {
            segments.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

/// Unescaped value of an attribute matched by its local name.
/// `prefixed` selects `r:id` over a plain `id`.
pub fn attribute(
    part: &str,
    element: &BytesStart<'_>,
    local_name: &[u8],
    prefixed: bool,
) -> Result<Option<String>, PackageError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| PackageError::xml(part, e))?;
        if attr.key.local_name().as_ref() == local_name && attr.key.prefix().is_some() == prefixed
        {
            let value = attr
                .unescape_value()
                .map_err(|e| PackageError::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
