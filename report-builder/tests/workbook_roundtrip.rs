//! Writes real workbooks and reads them back.

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use claim::prelude::*;
use report_builder::{
    category_header_row, header_row, ReportBuilder, RenderError, RESULT_COLUMNS,
    SUITE_SHEET_NAME,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

fn sample_doc() -> ClaimDocument {
    let results = vec![
        TestResult::new("networking-icmp", "networking-icmp")
            .with_status(TestStatus::Passed)
            .with_captured_output("INFO ping ok")
            .with_category("Telco", true)
            .with_catalog(CatalogInfo {
                description: "ICMP connectivity".to_string(),
                best_practice_reference: "https://example.com/icmp".to_string(),
                ..Default::default()
            }),
        TestResult::new("lifecycle-pod-owner", "lifecycle-pod-owner")
            .with_status(TestStatus::Failed)
            .with_tags(["mandatory"])
            .with_captured_output("INFO checking\npod p has no owner")
            .with_category("Extended", true)
            .with_category("Telco", true),
        TestResult::new("observability-crd-status", "observability-crd-status")
            .with_status(TestStatus::Skipped)
            .with_tags(["optional"])
            .with_category("NonTelco", true),
        TestResult::new("lifecycle-scaling", "lifecycle-scaling").with_status(TestStatus::Error),
    ];

    let mut versions = BTreeMap::new();
    versions.insert("ocp".to_string(), "4.14.2".to_string());
    versions.insert("certSuite".to_string(), "v5.1.0".to_string());

    ClaimDocument {
        results: results.into_iter().map(|r| (r.key.clone(), r)).collect(),
        versions,
        warnings: vec![],
    }
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> usize {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f as usize,
        Some(Data::Int(i)) => *i as usize,
        other => panic!("expected a number at ({row}, {col}), got {other:?}"),
    }
}

fn write_sample(path: &Path, job_id: Option<&str>) -> ClaimDocument {
    let doc = sample_doc();
    let config = ReportConfig::default();
    let summary = ReportSummary::build(&doc, &config);
    let mut builder = ReportBuilder::new(config.output.clone()).with_sheet_name("run.xlsx");
    if let Some(job_id) = job_id {
        builder = builder.with_job_id(job_id);
    }
    builder.write(&summary, &doc.versions, path).unwrap();
    doc
}

#[test]
fn test_workbook_has_two_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.xlsx");
    write_sample(&path, None);

    let workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["run.xlsx".to_string(), SUITE_SHEET_NAME.to_string()]
    );
}

#[test]
fn test_results_sheet_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.xlsx");
    let doc = write_sample(&path, Some("job-123"));

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("run.xlsx").unwrap();

    assert_eq!(text(&range, 0, 0), "Summary");
    assert_eq!(text(&range, 1, 0), "Total");
    assert_eq!(number(&range, 1, 1), 4);
    assert_eq!(number(&range, 2, 1), 1); // failed
    assert_eq!(number(&range, 3, 1), 1); // error
    assert_eq!(number(&range, 4, 1), 1); // skipped
    assert_eq!(number(&range, 5, 1), 1); // passed
    assert_eq!(number(&range, 6, 1), 0); // unknown
    assert_eq!(text(&range, 7, 0), "Job-Id");
    assert_eq!(text(&range, 7, 1), "https://www.distributed-ci.io/jobs/job-123");

    assert_eq!(text(&range, 0, 2), "Component");
    assert_eq!(text(&range, 3, 2), "OCP");
    assert_eq!(text(&range, 3, 3), "4.14.2");
    assert_eq!(text(&range, 1, 3), "N/A");

    let header = header_row(6);
    for (col, title) in RESULT_COLUMNS.iter().enumerate() {
        assert_eq!(text(&range, header, col as u32), *title);
    }

    let ids: Vec<String> = (1..=4).map(|i| text(&range, header + i, 0)).collect();
    assert_eq!(
        ids,
        vec![
            "lifecycle-pod-owner",
            "lifecycle-scaling",
            "observability-crd-status",
            "networking-icmp"
        ]
    );

    // Failed row keeps filtered output; passed row hides it.
    assert_eq!(text(&range, header + 1, 2), "failed");
    assert_eq!(text(&range, header + 1, 3), "pod p has no owner");
    assert_eq!(
        text(&range, header + 1, 4),
        "Extended: true, Telco: true"
    );
    assert_eq!(text(&range, header + 4, 3), "");
    assert_eq!(text(&range, header + 4, 7), "");

    let rendered: BTreeSet<String> = ids.into_iter().collect();
    let expected: BTreeSet<String> = doc.results.keys().cloned().collect();
    assert_eq!(rendered, expected);
}

#[test]
fn test_offline_job_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.xlsx");
    write_sample(&path, None);

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("run.xlsx").unwrap();
    assert_eq!(text(&range, 7, 1), "N/A");
}

#[test]
fn test_suite_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.xlsx");
    write_sample(&path, None);

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range(SUITE_SHEET_NAME).unwrap();

    assert_eq!(text(&range, 0, 0), "Suite");
    assert_eq!(text(&range, 0, 5), "Total");

    // Alphabetical: lifecycle, networking, observability.
    assert_eq!(text(&range, 1, 0), "lifecycle");
    assert_eq!(number(&range, 1, 2), 1); // failed
    assert_eq!(number(&range, 1, 3), 1); // error
    assert_eq!(number(&range, 1, 5), 2);
    assert_eq!(text(&range, 2, 0), "networking");
    assert_eq!(number(&range, 2, 1), 1);
    assert_eq!(text(&range, 3, 0), "observability");

    let header = category_header_row(3);
    assert_eq!(text(&range, header, 0), "Category (specific tests only)");
    let row = |name: &str| {
        (1..=4)
            .map(|i| header + i)
            .find(|r| text(&range, *r, 0) == name)
            .unwrap()
    };

    // lifecycle-pod-owner has two flags and is excluded everywhere.
    let extended = row("Extended");
    assert_eq!(number(&range, extended, 1), 0);

    let telco = row("Telco");
    assert_eq!(number(&range, telco, 1), 1);
    assert_eq!(number(&range, telco, 2), 1);

    let non_telco = row("Non-Telco");
    assert_eq!(number(&range, non_telco, 1), 1);
    assert_eq!(number(&range, non_telco, 3), 1);
}

#[test]
fn test_write_to_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let doc = sample_doc();
    let config = ReportConfig::default();
    let summary = ReportSummary::build(&doc, &config);

    let err = ReportBuilder::new(config.output)
        .write(&summary, &doc.versions, dir.path())
        .unwrap_err();
    assert!(matches!(err, RenderError::WriteFailed { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_suite_sheet_shows_unknown_column_when_needed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.xlsx");

    let mut doc = sample_doc();
    let odd = TestResult::new("lifecycle-mystery", "lifecycle-mystery");
    doc.results.insert(odd.key.clone(), odd);

    let config = ReportConfig::default();
    let summary = ReportSummary::build(&doc, &config);
    ReportBuilder::new(config.output.clone())
        .write(&summary, &doc.versions, &path)
        .unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range(SUITE_SHEET_NAME).unwrap();

    assert_eq!(text(&range, 0, 5), "Unknown");
    assert_eq!(text(&range, 0, 6), "Total");

    assert_eq!(text(&range, 1, 0), "lifecycle");
    assert_eq!(number(&range, 1, 5), 1);
    assert_eq!(number(&range, 1, 6), 3);
    for row in 1..=3 {
        let visible: usize = (1..=5).map(|col| number(&range, row, col)).sum();
        assert_eq!(visible, number(&range, row, 6));
    }
}
