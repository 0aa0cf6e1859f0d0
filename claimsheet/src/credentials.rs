//! DCI credential resolution.
//!
//! Providers are asked in order. Each one only fills the variables that are
//! still missing, and the search stops as soon as every required variable has
//! a value. The standard chain is the process environment followed by a
//! `dcirc.sh`-style file of `export NAME=value` lines.

use crate::acquire::{AcquisitionError, AcquisitionResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const REQUIRED_VARIABLES: [&str; 3] = ["DCI_CLIENT_ID", "DCI_API_SECRET", "DCI_CS_URL"];

pub const DEFAULT_CREDENTIALS_FILE: &str = "dcirc.sh";

pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Value of `variable` in this source, if any.
    fn lookup(&self, variable: &str) -> Option<String>;
}

/// Reads the current process environment.
#[derive(Debug, Default)]
pub struct ProcessEnvironment;

impl CredentialProvider for ProcessEnvironment {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, variable: &str) -> Option<String> {
        std::env::var(variable).ok()
    }
}

/// Fixed set of values.
#[derive(Default)]
pub struct StaticCredentials {
    name: String,
    values: BTreeMap<String, String>,
}

impl StaticCredentials {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(variable.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, variable: &str) -> Option<String> {
        self.values.get(variable).cloned()
    }
}

/// Shell file of `export NAME=value` lines, read on first lookup.
///
/// A file that does not exist simply provides nothing.
pub struct CredentialsFile {
    path: PathBuf,
    values: OnceLock<BTreeMap<String, String>>,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: OnceLock::new(),
        }
    }

    fn values(&self) -> &BTreeMap<String, String> {
        self.values.get_or_init(|| match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let values = parse_exports(&content);
                info!(
                    path = %self.path.display(),
                    variables = values.len(),
                    "read credentials file"
                );
                values
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no credentials file");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read credentials file: {}", e);
                BTreeMap::new()
            }
        })
    }
}

impl CredentialProvider for CredentialsFile {
    fn name(&self) -> &str {
        "credentials file"
    }

    fn lookup(&self, variable: &str) -> Option<String> {
        self.values().get(variable).cloned()
    }
}

fn export_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*export\s+([A-Za-z_][A-Za-z0-9_]*)=(?:"([^"]*)"|'([^']*)'|(\S*))"#)
            .expect("export regex")
    })
}

/// Collect `export NAME=value` assignments. Later assignments win.
pub fn parse_exports(content: &str) -> BTreeMap<String, String> {
    export_regex()
        .captures_iter(content)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

/// Resolved credential values. `Debug` shows names only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("variables", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct CredentialChain {
    required: Vec<String>,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            providers: Vec::new(),
        }
    }

    /// Environment first, then `credentials_file`.
    pub fn standard(credentials_file: &Path) -> Self {
        Self::new(REQUIRED_VARIABLES)
            .with_provider(Box::new(ProcessEnvironment))
            .with_provider(Box::new(CredentialsFile::new(credentials_file)))
    }

    pub fn with_provider(mut self, provider: Box<dyn CredentialProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn resolve(&self) -> AcquisitionResult<Credentials> {
        let mut values = BTreeMap::new();

        for provider in &self.providers {
            let missing: Vec<&String> = self
                .required
                .iter()
                .filter(|v| !values.contains_key(*v))
                .collect();
            if missing.is_empty() {
                break;
            }

            for variable in missing {
                if let Some(value) = provider.lookup(variable).filter(|v| !v.is_empty()) {
                    debug!(variable = %variable, source = provider.name(), "resolved credential");
                    values.insert(variable.clone(), value);
                }
            }
        }

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|v| !values.contains_key(*v))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AcquisitionError::MissingCredentials { missing });
        }

        Ok(Credentials { values })
    }
}
