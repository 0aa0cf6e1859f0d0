//! Claim document decoding and validation.
//!
//! Section-level problems (bad JSON, missing `claim.results` or
//! `claim.versions`) are fatal. Anything wrong inside a single result entry is
//! normalized to a default and recorded as a [`RecordWarning`] so the rest of
//! the run can continue.

use crate::types::{CatalogInfo, ClaimDocument, RecordWarning, TestResult, TestStatus};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid JSON in {origin}: {message}")]
    InvalidJson {
        origin: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid claim file: missing '{section}' section")]
    MissingSection { section: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type ClaimResult<T> = Result<T, ClaimError>;

impl ClaimDocument {
    /// Read and parse a claim file.
    ///
    /// Bytes that are not valid UTF-8 are reported as invalid JSON.
    pub fn from_path(path: &Path) -> ClaimResult<Self> {
        let bytes = read_existing(path)?;
        parse_claim_from(&bytes, &path.display().to_string())
    }
}

pub(crate) fn read_existing(path: &Path) -> ClaimResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        let path = path.display().to_string();
        if e.kind() == io::ErrorKind::NotFound {
            ClaimError::FileNotFound { path }
        } else {
            ClaimError::Io { path, source: e }
        }
    })
}

pub fn parse_claim(text: &str) -> ClaimResult<ClaimDocument> {
    parse_claim_from(text.as_bytes(), "claim document")
}

fn parse_claim_from(bytes: &[u8], origin: &str) -> ClaimResult<ClaimDocument> {
    let root: Value = serde_json::from_slice(bytes).map_err(|e| ClaimError::InvalidJson {
        origin: origin.to_string(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;

    let claim = object_section(&root, "claim", "claim")?;
    let results = object_field(claim, "results", "claim.results")?;
    let versions = object_field(claim, "versions", "claim.versions")?;

    let mut warnings = Vec::new();
    if results.is_empty() {
        warn!("claim.results is empty");
        warnings.push(RecordWarning {
            key: "claim.results".to_string(),
            message: "no test results found".to_string(),
        });
    }

    let results: BTreeMap<String, TestResult> = results
        .iter()
        .map(|(key, entry)| (key.clone(), parse_result(key, entry, &mut warnings)))
        .collect();

    let versions = versions
        .iter()
        .filter_map(|(component, value)| match value {
            Value::String(s) => Some((component.clone(), s.clone())),
            Value::Null => None,
            other => Some((component.clone(), other.to_string())),
        })
        .collect();

    debug!(
        results = results.len(),
        warnings = warnings.len(),
        "parsed {}",
        origin
    );

    Ok(ClaimDocument {
        results,
        versions,
        warnings,
    })
}

fn object_section<'a>(
    parent: &'a Value,
    key: &str,
    path: &str,
) -> ClaimResult<&'a Map<String, Value>> {
    parent
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ClaimError::MissingSection {
            section: path.to_string(),
        })
}

fn object_field<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> ClaimResult<&'a Map<String, Value>> {
    parent
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ClaimError::MissingSection {
            section: path.to_string(),
        })
}

/// Collects warnings for one result entry.
struct EntryWarnings<'w> {
    key: &'w str,
    sink: &'w mut Vec<RecordWarning>,
}

impl EntryWarnings<'_> {
    fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(result = self.key, "{}", message);
        self.sink.push(RecordWarning {
            key: self.key.to_string(),
            message,
        });
    }
}

fn parse_result(key: &str, entry: &Value, warnings: &mut Vec<RecordWarning>) -> TestResult {
    let mut notes = EntryWarnings {
        key,
        sink: warnings,
    };

    let Some(fields) = entry.as_object() else {
        notes.note("result entry is not an object");
        return TestResult::new(key, key);
    };

    let test_id = fields.get("testID");
    let id = match test_id {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Object(obj)) => match non_empty_str(obj.get("id")) {
            Some(id) => id,
            None => {
                notes.note("missing testID.id, using result key");
                key.to_string()
            }
        },
        _ => {
            notes.note("missing testID, using result key");
            key.to_string()
        }
    };

    let declared_suite = test_id.and_then(|v| non_empty_str(v.get("suite")));
    let tags = parse_tags(test_id.and_then(|v| v.get("tags")));

    let raw_state = fields
        .get("state")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let status = TestStatus::parse(&raw_state);
    if status == TestStatus::Unknown {
        if raw_state.is_empty() {
            notes.note("missing state");
        } else {
            notes.note(format!("unrecognized state '{}'", raw_state));
        }
    }

    let captured_output = fields
        .get("capturedTestOutput")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let categories = parse_categories(fields.get("categoryClassification"), &mut notes);

    let catalog = match fields.get("catalogInfo") {
        Some(Value::Object(info)) => CatalogInfo {
            description: text_field(info, "description"),
            exception_process: text_field(info, "exceptionProcess"),
            remediation: text_field(info, "remediation"),
            best_practice_reference: text_field(info, "bestPracticeReference"),
        },
        None | Some(Value::Null) => CatalogInfo::default(),
        Some(_) => {
            notes.note("catalogInfo is not an object");
            CatalogInfo::default()
        }
    };

    TestResult {
        key: key.to_string(),
        id,
        declared_suite,
        tags,
        status,
        raw_state,
        captured_output,
        categories,
        catalog,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Tags arrive either as a comma-separated string or as an array of strings.
fn parse_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(tags)) => tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_categories(value: Option<&Value>, notes: &mut EntryWarnings<'_>) -> BTreeMap<String, bool> {
    let mut flags = BTreeMap::new();
    let map = match value {
        None | Some(Value::Null) => return flags,
        Some(Value::Object(map)) => map,
        Some(_) => {
            notes.note("categoryClassification is not an object, ignoring flags");
            return flags;
        }
    };

    for (name, raw) in map {
        let flag = match raw {
            Value::Bool(b) => *b,
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    notes.note(format!("category '{}' has non-boolean value '{}'", name, s));
                    false
                }
            },
            other => {
                notes.note(format!("category '{}' has non-boolean value {}", name, other));
                false
            }
        };
        flags.insert(name.clone(), flag);
    }

    flags
}
