//! Email content auditing
//!
//! Scores one email's subject and HTML against deliverability rules, PECR
//! footer requirements and ASA CAP Code claims.

mod rules;
mod snapshot;

pub use rules::{default_rules, spam_words_in, ContentRule, RuleCategory, RuleCheck, RuleHit, SPAM_WORDS};
pub use snapshot::{ContentSnapshot, Link};

use sendwize_common::config::ContentConfig;
use sendwize_common::types::CheckStatus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Email to audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDocument {
    pub subject: String,
    /// Raw markup
    pub html: String,
}

impl EmailDocument {
    pub fn new(subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// One line of the content report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEntry {
    /// Id of the rule that produced the entry
    pub rule: String,
    pub status: CheckStatus,
    pub title: String,
    pub description: String,
    #[serde(skip)]
    pub delta: i32,
}

/// Entry counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl CheckSummary {
    fn from_checks(checks: &[CheckEntry]) -> Self {
        checks.iter().fold(Self::default(), |mut summary, check| {
            match check.status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Warning => summary.warnings += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Info => {}
            }
            summary
        })
    }
}

/// Content audit outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAuditResult {
    /// 0-100, higher is better
    pub score: u8,
    pub checks: Vec<CheckEntry>,
    pub summary: CheckSummary,
}

impl ContentAuditResult {
    /// Find the entry produced by a rule
    pub fn check(&self, rule: &str) -> Option<&CheckEntry> {
        self.checks.iter().find(|check| check.rule == rule)
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Rule-table driven content auditor
pub struct ContentRuleAuditor {
    rules: Vec<ContentRule>,
    config: ContentConfig,
}

impl ContentRuleAuditor {
    /// Create an auditor with the built-in rules, honouring `disabled_rules`
    pub fn new(config: ContentConfig) -> Self {
        let mut auditor = Self {
            rules: default_rules(),
            config,
        };
        for id in auditor.config.disabled_rules.clone() {
            if !auditor.set_rule_enabled(&id, false) {
                debug!("Unknown content rule {} in disabled_rules", id);
            }
        }
        auditor
    }

    /// Append a custom rule, evaluated after the built-in ones
    pub fn add_rule(&mut self, rule: ContentRule) {
        self.rules.push(rule);
    }

    /// Get all rules
    pub fn rules(&self) -> &[ContentRule] {
        &self.rules
    }

    /// Enable/disable a rule by id
    pub fn set_rule_enabled(&mut self, id: &str, enabled: bool) -> bool {
        for rule in &mut self.rules {
            if rule.id == id {
                rule.enabled = enabled;
                return true;
            }
        }
        false
    }

    /// Audit one email
    pub fn evaluate(&self, document: &EmailDocument) -> ContentAuditResult {
        let snapshot = ContentSnapshot::new(document);
        let mut score: i32 = 100;
        let mut checks = Vec::new();

        for rule in self.rules.iter().filter(|rule| rule.enabled) {
            let Some(hit) = (rule.check)(&snapshot, &self.config) else {
                continue;
            };
            if hit.delta != 0 {
                debug!("Content rule {} fired, delta {}", rule.id, hit.delta);
            }
            score += hit.delta;
            checks.push(CheckEntry {
                rule: rule.id.to_string(),
                status: hit.status,
                title: hit.title,
                description: hit.description,
                delta: hit.delta,
            });
        }

        let summary = CheckSummary::from_checks(&checks);
        ContentAuditResult {
            score: score.clamp(0, 100) as u8,
            checks,
            summary,
        }
    }
}

impl Default for ContentRuleAuditor {
    fn default() -> Self {
        Self::new(ContentConfig::default())
    }
}
