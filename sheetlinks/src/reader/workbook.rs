//! Workbook data structures

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use super::parser_utils::cell_ref;
use super::xlsx_parser;
use crate::error::{LinkError, Result};
use crate::writer;

/// Relationship type of cell hyperlinks
pub const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// An XLSX package loaded into memory.
///
/// The raw package is kept so that every part the normalizer does not touch is
/// copied unchanged when the workbook is saved.
pub struct Workbook {
    pub(crate) path: PathBuf,
    pub(crate) archive: ZipArchive<Cursor<Vec<u8>>>,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Load a workbook from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| LinkError::file_access(path, e))?;
        Self::from_bytes(path, bytes)
    }

    /// Parse an in-memory package; `path` is where `save` will write to
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: Vec<u8>) -> Result<Self> {
        let path = path.as_ref();
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| LinkError::format(path, e.into()))?;
        let sheets =
            xlsx_parser::read_sheets(&mut archive).map_err(|e| LinkError::format(path, e))?;

        Ok(Workbook {
            path: path.to_path_buf(),
            archive,
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Overwrite the file the workbook was loaded from
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_as(path)
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = writer::write_xlsx(&mut self.archive, &self.sheets)
            .map_err(|e| LinkError::format(&self.path, e))?;
        writer::persist(path, &bytes)
    }
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("parts", &self.archive.len())
            .field("sheets", &self.sheets)
            .finish()
    }
}

/// Represents a worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    /// Worksheet part inside the package, e.g. `xl/worksheets/sheet1.xml`
    pub part_name: String,
    /// Relationship part of the worksheet, e.g. `xl/worksheets/_rels/sheet1.xml.rels`
    pub rels_part_name: String,
    pub relationships: Vec<Relationship>,
    /// Rows in ascending order
    pub rows: Vec<Row>,
    /// Hyperlinks without a cell of their own: a second link on an
    /// already-linked cell, or a `ref` that does not parse
    pub detached: Vec<Hyperlink>,
}

impl Sheet {
    /// Get a cell at the given position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|r| r.index == row)
            .and_then(|r| r.cells.iter().find(|c| c.col == col))
    }

    pub fn cell_at(&self, reference: &str) -> Option<&Cell> {
        let (row, col) = super::parser_utils::parse_cell_ref(reference)?;
        self.get_cell(row, col)
    }

    pub fn all_cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }

    /// Every hyperlink of the sheet, anchored ones first in cell order
    pub fn hyperlinks(&self) -> impl Iterator<Item = &Hyperlink> {
        self.all_cells()
            .filter_map(|c| c.hyperlink.as_ref())
            .chain(self.detached.iter())
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }
}

/// A worksheet row with its cells in ascending column order
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// 0-based row index
    pub index: u32,
    pub cells: Vec<Cell>,
}

/// Represents a single cell. Only the position and the hyperlink are modelled;
/// values and styles stay in the worksheet part untouched.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub hyperlink: Option<Hyperlink>,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            hyperlink: None,
        }
    }

    /// A1-style reference of the cell
    pub fn reference(&self) -> String {
        cell_ref(self.row, self.col)
    }
}

/// A `<hyperlink>` element of a worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hyperlink {
    /// The `ref` attribute, a cell (`B2`) or a range (`A1:C3`)
    pub reference: String,
    /// `r:id` of the relationship holding the target
    pub rel_id: Option<String>,
    /// Link target resolved through `rel_id`; `None` for internal links
    pub target: Option<String>,
    /// In-workbook location such as `Sheet2!A1`
    pub location: Option<String>,
    pub display: Option<String>,
}

impl Hyperlink {
    /// Target if present and non-empty
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref().filter(|t| !t.is_empty())
    }
}

/// One `<Relationship>` of a relationship part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"`
    pub external: bool,
}

impl Relationship {
    pub fn is_hyperlink(&self) -> bool {
        self.rel_type == HYPERLINK_REL_TYPE || self.rel_type.ends_with("/hyperlink")
    }
}
