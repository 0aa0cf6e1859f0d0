//! Spreadsheet rendering for certsuite-claimsheet
//!
//! Turns a [`ReportSummary`] into a two-sheet xlsx workbook:
//!
//! - a results sheet with the summary counts, component versions and one row
//!   per test, failures first;
//! - a suite sheet with per-suite counts and the per-category breakdown.
//!
//! The workbook is assembled in memory and written through a temporary file
//! in the destination directory, so a failed run never leaves a partial
//! report behind.

pub mod results;
mod sheet;
pub mod styles;
pub mod suites;

use claim::{OutputConfig, ReportSummary};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use styles::Styles;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

pub use results::{filter_output, header_row, RESULT_COLUMNS};
pub use sheet::MAX_CELL_CHARS;
pub use suites::{
    category_header_row, suite_statuses, CATEGORY_COLUMNS, SUITE_COLUMNS, SUITE_SHEET_NAME,
};

/// Errors related to report rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write report to '{path}': {reason}")]
    WriteFailed { path: String, reason: String },
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Name used for the results sheet when the output file name is unusable.
pub const DEFAULT_RESULTS_SHEET: &str = "Results";

const MAX_SHEET_NAME_CHARS: usize = 31;
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Make `name` acceptable as an xlsx sheet name.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();

    if cleaned.is_empty()
        || cleaned.eq_ignore_ascii_case("history")
        || cleaned.eq_ignore_ascii_case(SUITE_SHEET_NAME)
    {
        DEFAULT_RESULTS_SHEET.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Results sheet name derived from the output path's file name.
pub fn sheet_name_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_sheet_name(&file_name)
}

/// Builds and writes report workbooks
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    config: OutputConfig,
    job_id: Option<String>,
    sheet_name: String,
}

impl ReportBuilder {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            job_id: None,
            sheet_name: DEFAULT_RESULTS_SHEET.to_string(),
        }
    }

    /// Reference a CI job in the summary block
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = sanitize_sheet_name(name);
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn job_link(&self) -> Option<String> {
        self.job_id
            .as_ref()
            .map(|id| format!("{}{}", self.config.job_url_base, id))
    }

    /// Assemble the workbook in memory.
    pub fn build(
        &self,
        summary: &ReportSummary<'_>,
        versions: &BTreeMap<String, String>,
    ) -> RenderResult<Workbook> {
        let styles = Styles::new();
        let job_link = self.job_link();

        let results = results::results_sheet(
            &self.sheet_name,
            summary,
            versions,
            &self.config,
            job_link.as_deref(),
            &styles,
        )?;
        let suites = suites::suite_sheet(summary, &styles, self.config.max_column_width)?;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(results);
        workbook.push_worksheet(suites);
        Ok(workbook)
    }

    pub fn render(
        &self,
        summary: &ReportSummary<'_>,
        versions: &BTreeMap<String, String>,
    ) -> RenderResult<Vec<u8>> {
        let mut workbook = self.build(summary, versions)?;
        let bytes = workbook.save_to_buffer()?;
        debug!(bytes = bytes.len(), "rendered workbook");
        Ok(bytes)
    }

    /// Render and write the report to `path`.
    pub fn write(
        &self,
        summary: &ReportSummary<'_>,
        versions: &BTreeMap<String, String>,
        path: &Path,
    ) -> RenderResult<()> {
        let bytes = self.render(summary, versions)?;
        persist_atomically(&bytes, path)?;
        info!(
            path = %path.display(),
            tests = summary.tests.len(),
            "wrote report"
        );
        Ok(())
    }
}

/// Temp file beside `path` whose mode matches what a plain create would give:
/// the existing target's permissions, otherwise `0o666` minus the umask.
fn temp_file_for(parent: &Path, path: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let temp_file = builder.tempfile_in(parent)?;

    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_file() {
            temp_file.as_file().set_permissions(existing.permissions())?;
        }
    }

    Ok(temp_file)
}

/// Write `bytes` to a temporary file beside `path`, then rename it into place.
pub fn persist_atomically(bytes: &[u8], path: &Path) -> RenderResult<()> {
    let failed = |reason: String| RenderError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp_file = temp_file_for(parent, path)
        .map_err(|e| failed(format!("Failed to create temp file: {}", e)))?;
    temp_file
        .write_all(bytes)
        .and_then(|_| temp_file.flush())
        .map_err(|e| failed(format!("Failed to write temp file: {}", e)))?;
    temp_file
        .persist(path)
        .map_err(|e| failed(format!("Failed to persist file: {}", e.error)))?;

    Ok(())
}
