use crate::parse::{read_existing, ClaimError, ClaimResult};
use crate::types::Requirement;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Settings for turning a claim document into a report.
///
/// Every section has a default matching the certsuite claim format, so an
/// empty TOML file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub suites: SuiteNaming,
    pub classification: ClassificationConfig,
    pub categories: Vec<CategorySpec>,
    pub output: OutputConfig,
}

/// How a suite name is derived from a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteNaming {
    pub separator: String,
    /// Suite names that may themselves contain the separator.
    pub known_prefixes: Vec<String>,
    /// Use `testID.suite` when the claim provides one.
    pub prefer_declared: bool,
}

impl Default for SuiteNaming {
    fn default() -> Self {
        Self {
            separator: "-".to_string(),
            known_prefixes: [
                "access-control",
                "affiliated-certification",
                "lifecycle",
                "manageability",
                "networking",
                "observability",
                "operator",
                "performance",
                "platform-alteration",
                "preflight",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            prefer_declared: true,
        }
    }
}

/// Keyword lists for the mandatory/optional rule chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub default_requirement: Requirement,
    pub mandatory_tags: Vec<String>,
    pub optional_tags: Vec<String>,
    pub optional_exception_phrases: Vec<String>,
    pub mandatory_id_markers: Vec<String>,
    pub optional_id_markers: Vec<String>,
    pub mandatory_description_phrases: Vec<String>,
    pub optional_description_phrases: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            default_requirement: Requirement::Mandatory,
            mandatory_tags: strings(&["mandatory", "required"]),
            optional_tags: strings(&["optional", "informative"]),
            optional_exception_phrases: strings(&["best practice", "recommendation"]),
            mandatory_id_markers: strings(&["mandatory", "required"]),
            optional_id_markers: strings(&["optional"]),
            mandatory_description_phrases: strings(&["mandatory", "is required", "must be"]),
            optional_description_phrases: strings(&["optional", "recommended", "best practice"]),
        }
    }
}

/// A certification profile: display name plus its key in
/// `categoryClassification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub key: String,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    pub fn defaults() -> Vec<CategorySpec> {
        vec![
            CategorySpec::new("Extended", "Extended"),
            CategorySpec::new("Far-Edge", "FarEdge"),
            CategorySpec::new("Non-Telco", "NonTelco"),
            CategorySpec::new("Telco", "Telco"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionField {
    pub key: String,
    pub label: String,
}

impl VersionField {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Leave captured output and best-practice link blank for passed tests.
    pub omit_passed_output: bool,
    /// Captured-output lines containing this marker are dropped. Empty keeps
    /// every line.
    pub output_filter_marker: String,
    pub job_url_base: String,
    pub max_column_width: f64,
    pub version_fields: Vec<VersionField>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            omit_passed_output: true,
            output_filter_marker: "INFO".to_string(),
            job_url_base: "https://www.distributed-ci.io/jobs/".to_string(),
            max_column_width: 100.0,
            version_fields: vec![
                VersionField::new("k8s", "K8S"),
                VersionField::new("ocClient", "ocClient"),
                VersionField::new("ocp", "OCP"),
                VersionField::new("certSuite", "CERTSUITE"),
                VersionField::new("claimFormat", "claimFormat"),
                VersionField::new("certSuiteGitCommit", "certSuiteGitCommit"),
            ],
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            suites: SuiteNaming::default(),
            classification: ClassificationConfig::default(),
            categories: CategorySpec::defaults(),
            output: OutputConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML configuration. Omitted sections keep their defaults.
    pub fn from_toml_str(text: &str) -> ClaimResult<Self> {
        let config: ReportConfig = toml::from_str(text).map_err(|e| ClaimError::Config {
            message: e.to_string(),
        })?;
        config
            .validate()
            .map_err(|message| ClaimError::Config { message })?;
        Ok(config)
    }

    /// Load a TOML file. Errors name the file.
    pub fn from_path(path: &Path) -> ClaimResult<Self> {
        let bytes = read_existing(path)?;
        let text = String::from_utf8(bytes).map_err(|e| ClaimError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ClaimError::Config { message } => ClaimError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.suites.separator = separator.into();
        self
    }

    pub fn with_known_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suites.known_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_declared_suites(mut self, prefer_declared: bool) -> Self {
        self.suites.prefer_declared = prefer_declared;
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategorySpec>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_default_requirement(mut self, requirement: Requirement) -> Self {
        self.classification.default_requirement = requirement;
        self
    }

    pub fn with_job_url_base(mut self, base: impl Into<String>) -> Self {
        self.output.job_url_base = base.into();
        self
    }

    pub fn with_max_column_width(mut self, width: f64) -> Self {
        self.output.max_column_width = width;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.suites.separator.is_empty() {
            return Err("Suite separator cannot be empty".to_string());
        }

        if self.categories.is_empty() {
            return Err("At least one category must be configured".to_string());
        }

        let mut keys = HashSet::new();
        for category in &self.categories {
            if category.key.is_empty() {
                return Err(format!("Category '{}' has an empty key", category.name));
            }
            if !keys.insert(category.key.as_str()) {
                return Err(format!("Duplicate category key '{}'", category.key));
            }
        }

        let base = &self.output.job_url_base;
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err("Job URL base must start with http:// or https://".to_string());
        }

        if !(self.output.max_column_width > 0.0 && self.output.max_column_width <= 255.0) {
            return Err("Max column width must be between 0 and 255".to_string());
        }

        Ok(())
    }
}
