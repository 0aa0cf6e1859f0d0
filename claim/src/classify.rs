//! Mandatory/optional classification.
//!
//! A [`RuleChain`] holds an ordered list of rules. Each rule either decides a
//! test's [`Requirement`] or abstains; the first rule that decides wins and
//! later rules are never consulted. When every rule abstains the chain's
//! default applies.
//!
//! The default chain, built from [`ClassificationConfig`], is:
//!
//! 1. tags (exact, case-insensitive tag match)
//! 2. exception process text (best-practice framing means optional)
//! 3. identifier markers
//! 4. description phrases

use crate::config::ClassificationConfig;
use crate::types::{Requirement, TestResult};
use tracing::debug;

pub trait ClassificationRule: Send + Sync {
    fn name(&self) -> &str;

    /// Returns `None` when the rule has nothing to say about `test`.
    fn classify(&self, test: &TestResult) -> Option<Requirement>;
}

/// Which part of a test a [`KeywordRule`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// Whole-tag equality.
    Tags,
    ExceptionProcess,
    Identifier,
    Description,
}

/// Case-insensitive keyword rule. Mandatory keywords are checked before
/// optional ones.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    name: String,
    field: RuleField,
    mandatory: Vec<String>,
    optional: Vec<String>,
}

fn normalized(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

impl KeywordRule {
    pub fn new(name: impl Into<String>, field: RuleField) -> Self {
        Self {
            name: name.into(),
            field,
            mandatory: Vec::new(),
            optional: Vec::new(),
        }
    }

    pub fn with_mandatory(mut self, keywords: &[String]) -> Self {
        self.mandatory = normalized(keywords);
        self
    }

    pub fn with_optional(mut self, keywords: &[String]) -> Self {
        self.optional = normalized(keywords);
        self
    }

    fn matches(&self, test: &TestResult, keywords: &[String]) -> bool {
        if keywords.is_empty() {
            return false;
        }

        match self.field {
            RuleField::Tags => test.tags.iter().any(|tag| {
                let tag = tag.trim().to_lowercase();
                keywords.iter().any(|k| *k == tag)
            }),
            RuleField::ExceptionProcess => contains_any(&test.catalog.exception_process, keywords),
            RuleField::Identifier => contains_any(&test.id, keywords),
            RuleField::Description => contains_any(&test.catalog.description, keywords),
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k.as_str()))
}

impl ClassificationRule for KeywordRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, test: &TestResult) -> Option<Requirement> {
        if self.matches(test, &self.mandatory) {
            Some(Requirement::Mandatory)
        } else if self.matches(test, &self.optional) {
            Some(Requirement::Optional)
        } else {
            None
        }
    }
}

/// Outcome of running the chain over one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub requirement: Requirement,
    /// Name of the deciding rule; `None` when the default applied.
    pub rule: Option<String>,
}

pub struct RuleChain {
    rules: Vec<Box<dyn ClassificationRule>>,
    default: Requirement,
}

impl RuleChain {
    pub fn new(default: Requirement) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    pub fn from_config(config: &ClassificationConfig) -> Self {
        let mut chain = Self::new(config.default_requirement);
        chain.push(Box::new(
            KeywordRule::new("tags", RuleField::Tags)
                .with_mandatory(&config.mandatory_tags)
                .with_optional(&config.optional_tags),
        ));
        chain.push(Box::new(
            KeywordRule::new("exception-process", RuleField::ExceptionProcess)
                .with_optional(&config.optional_exception_phrases),
        ));
        chain.push(Box::new(
            KeywordRule::new("identifier", RuleField::Identifier)
                .with_mandatory(&config.mandatory_id_markers)
                .with_optional(&config.optional_id_markers),
        ));
        chain.push(Box::new(
            KeywordRule::new("description", RuleField::Description)
                .with_mandatory(&config.mandatory_description_phrases)
                .with_optional(&config.optional_description_phrases),
        ));
        chain
    }

    /// Append a rule; it runs after every rule already in the chain.
    pub fn push(&mut self, rule: Box<dyn ClassificationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn decide(&self, test: &TestResult) -> Decision {
        for rule in &self.rules {
            if let Some(requirement) = rule.classify(test) {
                debug!(test = %test.id, rule = rule.name(), %requirement, "classified");
                return Decision {
                    requirement,
                    rule: Some(rule.name().to_string()),
                };
            }
        }

        Decision {
            requirement: self.default,
            rule: None,
        }
    }

    pub fn classify(&self, test: &TestResult) -> Requirement {
        self.decide(test).requirement
    }
}

impl Default for RuleChain {
    fn default() -> Self {
        Self::from_config(&ClassificationConfig::default())
    }
}
