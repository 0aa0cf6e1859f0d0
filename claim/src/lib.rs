pub mod aggregate;
pub mod classify;
pub mod config;
pub mod parse;
pub mod types;

pub use aggregate::{
    derive_suite, exclusive_category, CategoryCounts, ClassifiedTest, ReportSummary, StatusCounts,
};
pub use classify::{ClassificationRule, Decision, KeywordRule, RuleChain, RuleField};
pub use config::{
    CategorySpec, ClassificationConfig, OutputConfig, ReportConfig, SuiteNaming, VersionField,
};
pub use parse::{parse_claim, ClaimError, ClaimResult};
pub use types::{CatalogInfo, ClaimDocument, RecordWarning, Requirement, TestResult, TestStatus};

pub mod prelude {
    pub use crate::aggregate::*;
    pub use crate::classify::*;
    pub use crate::config::*;
    pub use crate::parse::*;
    pub use crate::types::*;
}
