use crate::sheet::SheetWriter;
use crate::styles::Styles;
use crate::RenderResult;
use claim::{ReportSummary, TestStatus};
use rust_xlsxwriter::{RowNum, Worksheet};

pub const SUITE_SHEET_NAME: &str = "Suite Summary";

pub const SUITE_COLUMNS: [&str; 6] = ["Suite", "Passed", "Failed", "Error", "Skipped", "Total"];

pub const CATEGORY_COLUMNS: [&str; 4] = [
    "Category (specific tests only)",
    "Total",
    "Mandatory",
    "Optional",
];

const SUITE_STATUSES: [TestStatus; 4] = [
    TestStatus::Passed,
    TestStatus::Failed,
    TestStatus::Error,
    TestStatus::Skipped,
];

/// Row of the category header: after the suite table and one blank row.
pub fn category_header_row(suite_count: usize) -> RowNum {
    (suite_count + 2) as RowNum
}

/// Status columns of the suite table. `Unknown` is only shown when some
/// test has it, so each row's Total is the sum of the cells beside it.
pub fn suite_statuses(summary: &ReportSummary<'_>) -> Vec<TestStatus> {
    let mut statuses = SUITE_STATUSES.to_vec();
    if summary.overall.unknown > 0 {
        statuses.push(TestStatus::Unknown);
    }
    statuses
}

fn status_title(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "Passed",
        TestStatus::Failed => "Failed",
        TestStatus::Error => "Error",
        TestStatus::Skipped => "Skipped",
        TestStatus::Unknown => "Unknown",
    }
}

pub(crate) fn suite_sheet(
    summary: &ReportSummary<'_>,
    styles: &Styles,
    max_width: f64,
) -> RenderResult<Worksheet> {
    let mut sheet = SheetWriter::new(SUITE_SHEET_NAME, max_width)?;
    let statuses = suite_statuses(summary);
    let total_col = 1 + statuses.len() as u16;

    sheet.text(0, 0, SUITE_COLUMNS[0], &styles.header)?;
    for (i, status) in statuses.iter().enumerate() {
        sheet.text(0, 1 + i as u16, status_title(*status), styles.status_label(*status))?;
    }
    sheet.text(0, total_col, "Total", &styles.total_label)?;

    for (i, (suite, counts)) in summary.suites.iter().enumerate() {
        let row = 1 + i as RowNum;
        sheet.text(row, 0, suite, &styles.cell)?;
        for (j, status) in statuses.iter().enumerate() {
            sheet.count(row, 1 + j as u16, counts.get(*status), &styles.count)?;
        }
        sheet.count(row, total_col, counts.total, &styles.value)?;
    }

    let header = category_header_row(summary.suites.len());
    for (col, title) in CATEGORY_COLUMNS.iter().enumerate() {
        sheet.text(header, col as u16, title, &styles.header)?;
    }

    for (i, category) in summary.categories.iter().enumerate() {
        let row = header + 1 + i as RowNum;
        sheet.text(row, 0, &category.name, &styles.cell)?;
        sheet.count(row, 1, category.total, &styles.value)?;
        sheet.count(row, 2, category.mandatory, &styles.count)?;
        sheet.count(row, 3, category.optional, &styles.count)?;
    }

    sheet.finish()
}
