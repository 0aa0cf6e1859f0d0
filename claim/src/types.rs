use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Error,
    Unknown,
}

impl TestStatus {
    /// Every status in report order.
    pub const ALL: [TestStatus; 5] = [
        TestStatus::Failed,
        TestStatus::Error,
        TestStatus::Skipped,
        TestStatus::Passed,
        TestStatus::Unknown,
    ];

    /// Normalize a raw `state` string. Matching is case-insensitive and
    /// ignores surrounding whitespace; anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "passed" => TestStatus::Passed,
            "failed" => TestStatus::Failed,
            "skipped" => TestStatus::Skipped,
            "error" => TestStatus::Error,
            _ => TestStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Error => "error",
            TestStatus::Unknown => "unknown",
        }
    }

    /// Position of the status group in the results table.
    pub fn sort_rank(&self) -> u8 {
        match self {
            TestStatus::Failed => 0,
            TestStatus::Error => 1,
            TestStatus::Skipped => 2,
            TestStatus::Passed => 3,
            TestStatus::Unknown => 4,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a test has to pass for certification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Mandatory,
    Optional,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Mandatory => write!(f, "Mandatory"),
            Requirement::Optional => write!(f, "Optional"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogInfo {
    pub description: String,
    pub exception_process: String,
    pub remediation: String,
    pub best_practice_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    /// Key of the entry in `claim.results`.
    pub key: String,
    pub id: String,
    /// Suite named by the claim itself, when present.
    pub declared_suite: Option<String>,
    pub tags: Vec<String>,
    pub status: TestStatus,
    /// State string exactly as it appeared in the claim.
    pub raw_state: String,
    pub captured_output: String,
    pub categories: BTreeMap<String, bool>,
    pub catalog: CatalogInfo,
}

impl TestResult {
    pub fn new(key: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: id.into(),
            declared_suite: None,
            tags: Vec::new(),
            status: TestStatus::Unknown,
            raw_state: String::new(),
            captured_output: String::new(),
            categories: BTreeMap::new(),
            catalog: CatalogInfo::default(),
        }
    }

    pub fn with_status(mut self, status: TestStatus) -> Self {
        self.raw_state = status.as_str().to_string();
        self.status = status;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_declared_suite(mut self, suite: impl Into<String>) -> Self {
        self.declared_suite = Some(suite.into());
        self
    }

    pub fn with_category(mut self, name: impl Into<String>, flag: bool) -> Self {
        self.categories.insert(name.into(), flag);
        self
    }

    pub fn with_captured_output(mut self, output: impl Into<String>) -> Self {
        self.captured_output = output.into();
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogInfo) -> Self {
        self.catalog = catalog;
        self
    }

    /// Category keys flagged true for this test.
    pub fn active_categories(&self) -> BTreeSet<&str> {
        self.categories
            .iter()
            .filter(|(_, flag)| **flag)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Category flags flattened as `Key: value` pairs.
    pub fn category_summary(&self) -> String {
        self.categories
            .iter()
            .map(|(name, flag)| format!("{}: {}", name, flag))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A recoverable anomaly found in a single result entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordWarning {
    pub key: String,
    pub message: String,
}

impl fmt::Display for RecordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub results: BTreeMap<String, TestResult>,
    pub versions: BTreeMap<String, String>,
    pub warnings: Vec<RecordWarning>,
}

impl ClaimDocument {
    pub fn version(&self, component: &str) -> Option<&str> {
        self.versions.get(component).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(TestStatus::parse("passed"), TestStatus::Passed);
        assert_eq!(TestStatus::parse(" FAILED "), TestStatus::Failed);
        assert_eq!(TestStatus::parse("Skipped"), TestStatus::Skipped);
        assert_eq!(TestStatus::parse("error"), TestStatus::Error);
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(TestStatus::parse(""), TestStatus::Unknown);
        assert_eq!(TestStatus::parse("flaky"), TestStatus::Unknown);
        assert_eq!(TestStatus::parse("pass"), TestStatus::Unknown);
    }

    #[test]
    fn test_status_rank_order() {
        let ranks: Vec<u8> = TestStatus::ALL.iter().map(|s| s.sort_rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_active_categories() {
        let test = TestResult::new("k", "networking-icmp")
            .with_category("Extended", false)
            .with_category("Telco", true)
            .with_category("NonTelco", true);

        let active: Vec<&str> = test.active_categories().into_iter().collect();
        assert_eq!(active, vec!["NonTelco", "Telco"]);
    }

    #[test]
    fn test_category_summary_format() {
        let test = TestResult::new("k", "id")
            .with_category("Telco", true)
            .with_category("Extended", false);
        assert_eq!(test.category_summary(), "Extended: false, Telco: true");
        assert_eq!(TestResult::new("k", "id").category_summary(), "");
    }

    #[test]
    fn test_serialization() {
        let test = TestResult::new("k", "lifecycle-pod-owner-type").with_status(TestStatus::Failed);
        let json = serde_json::to_string(&test).unwrap();
        assert!(json.contains("\"failed\""));
        let back: TestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, test);
    }
}
