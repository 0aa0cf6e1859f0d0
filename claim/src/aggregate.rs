use crate::classify::RuleChain;
use crate::config::{CategorySpec, ReportConfig, SuiteNaming};
use crate::types::{ClaimDocument, Requirement, TestResult, TestStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Per-status tally. `total` always equals the sum of the status counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub error: usize,
    pub skipped: usize,
    pub unknown: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: TestStatus) {
        match status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Error => self.error += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Unknown => self.unknown += 1,
        }
        self.total += 1;
    }

    pub fn get(&self, status: TestStatus) -> usize {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Failed => self.failed,
            TestStatus::Error => self.error,
            TestStatus::Skipped => self.skipped,
            TestStatus::Unknown => self.unknown,
        }
    }
}

/// Tests belonging to exactly one category, split by requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub name: String,
    pub key: String,
    pub total: usize,
    pub mandatory: usize,
    pub optional: usize,
}

impl CategoryCounts {
    fn new(spec: &CategorySpec) -> Self {
        Self {
            name: spec.name.clone(),
            key: spec.key.clone(),
            total: 0,
            mandatory: 0,
            optional: 0,
        }
    }

    fn record(&mut self, requirement: Requirement) {
        self.total += 1;
        match requirement {
            Requirement::Mandatory => self.mandatory += 1,
            Requirement::Optional => self.optional += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTest<'a> {
    pub result: &'a TestResult,
    pub suite: String,
    pub requirement: Requirement,
}

/// Everything the report needs, computed in one pass over the claim.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary<'a> {
    pub overall: StatusCounts,
    /// Keyed by suite name, so iteration is alphabetical.
    pub suites: BTreeMap<String, StatusCounts>,
    /// In configured category order.
    pub categories: Vec<CategoryCounts>,
    /// Sorted by status group, then identifier.
    pub tests: Vec<ClassifiedTest<'a>>,
}

impl<'a> ReportSummary<'a> {
    pub fn build(doc: &'a ClaimDocument, config: &ReportConfig) -> Self {
        let chain = RuleChain::from_config(&config.classification);
        Self::build_with(doc, config, &chain)
    }

    pub fn build_with(doc: &'a ClaimDocument, config: &ReportConfig, chain: &RuleChain) -> Self {
        let mut overall = StatusCounts::default();
        let mut suites: BTreeMap<String, StatusCounts> = BTreeMap::new();
        let mut categories: Vec<CategoryCounts> =
            config.categories.iter().map(CategoryCounts::new).collect();
        let mut tests = Vec::with_capacity(doc.results.len());

        for result in doc.results.values() {
            let suite = derive_suite(&config.suites, result);
            let requirement = chain.classify(result);

            overall.record(result.status);
            suites.entry(suite.clone()).or_default().record(result.status);

            if let Some(key) = exclusive_category(result) {
                if let Some(counts) = categories.iter_mut().find(|c| c.key == key) {
                    counts.record(requirement);
                }
            }

            tests.push(ClassifiedTest {
                result,
                suite,
                requirement,
            });
        }

        tests.sort_by(|a, b| {
            a.result
                .status
                .sort_rank()
                .cmp(&b.result.status.sort_rank())
                .then_with(|| a.result.id.cmp(&b.result.id))
                .then_with(|| a.result.key.cmp(&b.result.key))
        });

        info!(
            total = overall.total,
            passed = overall.passed,
            failed = overall.failed,
            error = overall.error,
            skipped = overall.skipped,
            suites = suites.len(),
            "aggregated claim results"
        );

        Self {
            overall,
            suites,
            categories,
            tests,
        }
    }

    /// Sum of per-suite totals; equals `overall.total`.
    pub fn suite_total(&self) -> usize {
        self.suites.values().map(|c| c.total).sum()
    }

    pub fn category(&self, name: &str) -> Option<&CategoryCounts> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Suite a test is grouped under.
///
/// Uses the claim's declared suite when allowed, then the longest known
/// prefix, then the text before the first separator.
pub fn derive_suite(naming: &SuiteNaming, test: &TestResult) -> String {
    if naming.prefer_declared {
        if let Some(suite) = test.declared_suite.as_deref().filter(|s| !s.is_empty()) {
            return suite.to_string();
        }
    }

    let id = test.id.as_str();
    let sep = naming.separator.as_str();

    let known = naming
        .known_prefixes
        .iter()
        .filter(|prefix| {
            !prefix.is_empty()
                && (id == prefix.as_str()
                    || id
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with(sep)))
        })
        .max_by_key(|prefix| prefix.len());
    if let Some(prefix) = known {
        return prefix.clone();
    }

    match id.split_once(sep) {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => id.to_string(),
    }
}

/// The single category flagged true for `test`, or `None` when zero or
/// several flags are set.
pub fn exclusive_category(test: &TestResult) -> Option<&str> {
    let active = test.active_categories();
    if active.len() == 1 {
        active.into_iter().next()
    } else {
        None
    }
}
