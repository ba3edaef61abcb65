//! XLSX reader using custom XML parsers

use std::path::Path;

pub mod parser_utils;
pub mod workbook;
pub mod xlsx_parser;

pub use workbook::{Cell, HYPERLINK_REL_TYPE, Hyperlink, Relationship, Row, Sheet, Workbook};

use crate::error::Result;

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    Workbook::open(path)
}
