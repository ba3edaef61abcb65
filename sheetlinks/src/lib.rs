//! sheetlinks: rewrite XLSX hyperlink targets to bare filenames
//!
//! Absolute or path-qualified hyperlinks (`/home/user/reports/summary.xlsx`,
//! `C:\Users\me\summary.xlsx`) become `summary.xlsx`, so they resolve relative
//! to the directory holding the workbook. Everything else in the package is
//! left byte-for-byte as it was.

pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod reader;
pub mod writer;

use log::{debug, info};
use std::path::Path;

pub use config::NormalizerConfig;
pub use discovery::spreadsheet_files;
pub use error::{LinkError, PackageError, Result};
pub use normalize::{TargetOutcome, bare_filename, classify_target, is_web_url, normalize_target};
pub use reader::{Cell, Hyperlink, Relationship, Row, Sheet, Workbook};

/// Counts of what one normalization pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Hyperlinks seen, including internal ones without a target
    pub hyperlinks: usize,
    pub rewritten: usize,
    /// Web URL targets left untouched
    pub kept_urls: usize,
}

impl NormalizeReport {
    fn merge(&mut self, other: &NormalizeReport) {
        self.hyperlinks += other.hyperlinks;
        self.rewritten += other.rewritten;
        self.kept_urls += other.kept_urls;
    }
}

/// Main normalizer interface
#[derive(Debug, Clone, Default)]
pub struct HyperlinkNormalizer {
    config: NormalizerConfig,
}

impl HyperlinkNormalizer {
    /// Create a normalizer with default configuration
    pub fn new() -> Self {
        Self::with_config(NormalizerConfig::default())
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Rewrite the hyperlink targets of an open workbook in memory
    pub fn normalize_workbook(&self, workbook: &mut Workbook) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        for sheet in &mut workbook.sheets {
            let anchored = sheet
                .rows
                .iter_mut()
                .flat_map(|row| row.cells.iter_mut())
                .filter_map(|cell| cell.hyperlink.as_mut());
            for hyperlink in anchored.chain(sheet.detached.iter_mut()) {
                self.normalize_hyperlink(&sheet.name, hyperlink, &mut report);
            }
        }

        report
    }

    fn normalize_hyperlink(&self, sheet: &str, hyperlink: &mut Hyperlink, report: &mut NormalizeReport) {
        report.hyperlinks += 1;

        let Some(target) = hyperlink.target() else {
            return;
        };
        match classify_target(target, self.config.rewrite_urls) {
            TargetOutcome::Rewrite(filename) => {
                debug!(
                    "{}!{}: '{}' -> '{}'",
                    sheet, hyperlink.reference, target, filename
                );
                hyperlink.target = Some(filename);
                report.rewritten += 1;
            }
            TargetOutcome::KeptUrl => {
                info!(
                    "{}!{}: leaving URL '{}' untouched",
                    sheet, hyperlink.reference, target
                );
                report.kept_urls += 1;
            }
            TargetOutcome::AlreadyBare | TargetOutcome::NoFilename => {}
        }
    }

    /// Normalize one workbook file in place
    pub fn normalize_file<P: AsRef<Path>>(&self, path: P) -> Result<NormalizeReport> {
        let path = path.as_ref();
        let mut workbook = Workbook::open(path)?;
        let report = self.normalize_workbook(&mut workbook);
        workbook.save()?;

        info!(
            "{}: {} of {} hyperlink(s) rewritten",
            path.display(),
            report.rewritten,
            report.hyperlinks
        );
        Ok(report)
    }

    /// Normalize every workbook of `dir`, one at a time, in listing order.
    ///
    /// `on_file` runs after each file is saved. The first failure stops the
    /// run; files not reached yet are left untouched.
    pub fn normalize_dir<P, F>(&self, dir: P, mut on_file: F) -> Result<NormalizeReport>
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &NormalizeReport),
    {
        let dir = dir.as_ref();
        let files = spreadsheet_files(dir, &self.config.suffix())?;
        info!("Found {} workbook(s) in {}", files.len(), dir.display());

        let mut total = NormalizeReport::default();
        for file in &files {
            let report = self.normalize_file(file)?;
            on_file(file, &report);
            total.merge(&report);
        }

        Ok(total)
    }
}
