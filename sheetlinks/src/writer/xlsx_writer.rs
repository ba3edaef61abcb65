//! XLSX writer: copies the package, rewriting changed hyperlink targets

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::PackageError;
use crate::reader::Sheet;

/// New relationship targets keyed by relationship part, then by relationship id
type TargetRewrites<'a> = HashMap<&'a str, HashMap<&'a str, &'a str>>;

/// Serialize the package with the current hyperlink targets of `sheets`.
///
/// Relationship parts without changed targets, and every other part, are
/// copied raw so their compressed bytes stay identical.
pub fn write_xlsx(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheets: &[Sheet],
) -> Result<Vec<u8>, PackageError> {
    let rewrites = collect_target_rewrites(sheets);
    let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        match rewrites.get(name.as_str()) {
            Some(targets) => {
                let mut content = Vec::new();
                file.read_to_end(&mut content)
                    .map_err(|source| PackageError::Read {
                        part: name.clone(),
                        source,
                    })?;
                let method = match file.compression() {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                };
                let modified = rewrite_relationship_targets(&name, &content, targets)?;

                debug!("Rewrote {} relationship target(s) in {}", targets.len(), name);
                zip_writer.start_file(name.as_str(), SimpleFileOptions::default().compression_method(method))?;
                zip_writer.write_all(&modified).map_err(ZipError::from)?;
            }
            None => zip_writer.raw_copy_file(file)?,
        }
    }

    let cursor = zip_writer.finish()?;
    Ok(cursor.into_inner())
}

fn collect_target_rewrites(sheets: &[Sheet]) -> TargetRewrites<'_> {
    let mut rewrites: TargetRewrites<'_> = HashMap::new();

    for sheet in sheets {
        for hyperlink in sheet.hyperlinks() {
            let (Some(rel_id), Some(target)) = (&hyperlink.rel_id, &hyperlink.target) else {
                continue;
            };
            let Some(rel) = sheet.relationship(rel_id) else {
                continue;
            };
            if rel.target != *target {
                rewrites
                    .entry(sheet.rels_part_name.as_str())
                    .or_default()
                    .insert(rel_id.as_str(), target.as_str());
            }
        }
    }

    rewrites
}

/// Replace the `Target` of the relationships listed in `targets`
pub fn rewrite_relationship_targets(
    part: &str,
    xml: &[u8],
    targets: &HashMap<&str, &str>,
) -> Result<Vec<u8>, PackageError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let elem = retarget_relationship(part, &e, targets)?;
                writer
                    .write_event(Event::Empty(elem))
                    .map_err(|e| PackageError::xml(part, e))?;
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Relationship" => {
                let elem = retarget_relationship(part, &e, targets)?;
                writer
                    .write_event(Event::Start(elem))
                    .map_err(|e| PackageError::xml(part, e))?;
            }
            Ok(Event::Eof) => break,
            Ok(e) => writer
                .write_event(e)
                .map_err(|e| PackageError::xml(part, e))?,
            Err(e) => return Err(PackageError::xml(part, e)),
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

fn retarget_relationship(
    part: &str,
    e: &BytesStart<'_>,
    targets: &HashMap<&str, &str>,
) -> Result<BytesStart<'static>, PackageError> {
    let id = crate::reader::parser_utils::attribute(part, e, b"Id", false)?;
    let new_target = id.as_deref().and_then(|id| targets.get(id)).copied();

    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| PackageError::xml(part, e))?;
        match new_target {
            Some(target) if attr.key.as_ref() == b"Target" => {
                elem.push_attribute(("Target", target));
            }
            _ => elem.push_attribute(attr),
        }
    }

    Ok(elem.into_owned())
}
