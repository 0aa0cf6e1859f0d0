//! The results sheet: summary and version blocks on top, one row per test
//! below.

use crate::sheet::SheetWriter;
use crate::styles::Styles;
use crate::RenderResult;
use claim::{ClassifiedTest, OutputConfig, ReportSummary, TestStatus};
use rust_xlsxwriter::{RowNum, Worksheet};
use std::collections::BTreeMap;

pub const RESULT_COLUMNS: [&str; 8] = [
    "Test_Id",
    "Test_Text",
    "State",
    "Capture_Output",
    "Category_Classification",
    "Exception_Process",
    "Remediation",
    "Best_Practice_Link",
];

/// Summary labels below the `Summary` header, in row order.
const SUMMARY_ROWS: [(&str, Option<TestStatus>); 6] = [
    ("Total", None),
    ("Failed", Some(TestStatus::Failed)),
    ("Error", Some(TestStatus::Error)),
    ("Skipped", Some(TestStatus::Skipped)),
    ("Passed", Some(TestStatus::Passed)),
    ("Unknown", Some(TestStatus::Unknown)),
];

const DATA_ROW_HEIGHT: f64 = 30.0;
const NOT_AVAILABLE: &str = "N/A";

/// Row holding the column headers, leaving one blank row under whichever of
/// the summary or version blocks is taller.
pub fn header_row(version_rows: usize) -> RowNum {
    let summary_end = SUMMARY_ROWS.len() + 1;
    (summary_end.max(version_rows) + 2) as RowNum
}

/// Drop captured-output lines containing `marker`.
pub fn filter_output(output: &str, marker: &str) -> String {
    output
        .trim()
        .lines()
        .filter(|line| marker.is_empty() || !line.contains(marker))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn results_sheet(
    name: &str,
    summary: &ReportSummary<'_>,
    versions: &BTreeMap<String, String>,
    config: &OutputConfig,
    job_link: Option<&str>,
    styles: &Styles,
) -> RenderResult<Worksheet> {
    let mut sheet = SheetWriter::new(name, config.max_column_width)?;

    write_summary_block(&mut sheet, summary, job_link, styles)?;
    write_version_block(&mut sheet, versions, config, styles)?;

    let header = header_row(config.version_fields.len());
    for (col, title) in RESULT_COLUMNS.iter().enumerate() {
        sheet.text(header, col as u16, title, &styles.header)?;
    }

    for (i, test) in summary.tests.iter().enumerate() {
        let row = header + 1 + i as RowNum;
        write_test_row(&mut sheet, row, test, config, styles)?;
        sheet.row_height(row, DATA_ROW_HEIGHT)?;
    }

    sheet.finish()
}

fn write_summary_block(
    sheet: &mut SheetWriter,
    summary: &ReportSummary<'_>,
    job_link: Option<&str>,
    styles: &Styles,
) -> RenderResult<()> {
    sheet.text(0, 0, "Summary", &styles.header)?;

    for (offset, (label, status)) in SUMMARY_ROWS.iter().enumerate() {
        let row = 1 + offset as RowNum;
        let (value, format) = match status {
            Some(status) => (summary.overall.get(*status), styles.status_label(*status)),
            None => (summary.overall.total, &styles.total_label),
        };
        sheet.text(row, 0, label, format)?;
        sheet.count(row, 1, value, &styles.value)?;
    }

    let job_row = 1 + SUMMARY_ROWS.len() as RowNum;
    sheet.text(job_row, 0, "Job-Id", &styles.job_label)?;
    match job_link {
        Some(url) => sheet.link(job_row, 1, url, &styles.link)?,
        None => sheet.text(job_row, 1, NOT_AVAILABLE, &styles.value)?,
    }

    Ok(())
}

fn write_version_block(
    sheet: &mut SheetWriter,
    versions: &BTreeMap<String, String>,
    config: &OutputConfig,
    styles: &Styles,
) -> RenderResult<()> {
    sheet.text(0, 2, "Component", &styles.version_header)?;
    sheet.text(0, 3, "Version", &styles.version_header)?;

    for (offset, field) in config.version_fields.iter().enumerate() {
        let row = 1 + offset as RowNum;
        let value = versions
            .get(&field.key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE);
        sheet.text(row, 2, &field.label, &styles.version_label)?;
        sheet.text(row, 3, value, &styles.value)?;
    }

    Ok(())
}

fn write_test_row(
    sheet: &mut SheetWriter,
    row: RowNum,
    test: &ClassifiedTest<'_>,
    config: &OutputConfig,
    styles: &Styles,
) -> RenderResult<()> {
    let result = test.result;
    let hide_details = config.omit_passed_output && result.status == TestStatus::Passed;

    let output = if hide_details {
        String::new()
    } else {
        filter_output(&result.captured_output, &config.output_filter_marker)
    };
    let best_practice = if hide_details {
        ""
    } else {
        result.catalog.best_practice_reference.as_str()
    };

    sheet.text(row, 0, &result.id, &styles.cell)?;
    sheet.text(row, 1, &result.catalog.description, &styles.cell)?;
    sheet.text(row, 2, result.status.as_str(), styles.status(result.status))?;
    sheet.text(row, 3, &output, &styles.cell)?;
    sheet.text(row, 4, &result.category_summary(), &styles.category_cell)?;
    sheet.text(row, 5, &result.catalog.exception_process, &styles.cell)?;
    sheet.text(row, 6, &result.catalog.remediation, &styles.cell)?;
    sheet.text(row, 7, best_practice, &styles.cell)?;

    Ok(())
}
