//! List hygiene checking
//!
//! Reconciles a send list against a suppression list and reports
//! suppressed, duplicated, malformed and role-based addresses together
//! with the list that is safe to send to.

use sendwize_common::config::HygieneConfig;
use sendwize_common::types::{is_valid_email, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Administrative mailbox aliases
pub const ROLE_ALIASES: &[&str] = &[
    "info",
    "sales",
    "admin",
    "support",
    "contact",
    "hello",
    "help",
    "service",
    "team",
    "marketing",
    "hr",
    "office",
    "reception",
];

/// Lists to reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionCheckInput {
    pub send_list: Vec<String>,
    pub suppression_list: Vec<String>,
}

/// A derived warning about the send list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HygieneWarning {
    pub severity: Severity,
    pub message: String,
}

/// Result of a suppression check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionCheckResult {
    pub send_list_count: usize,
    pub suppression_list_count: usize,
    /// Send entries present on the suppression list, one per occurrence
    pub matches: Vec<String>,
    pub match_count: usize,
    /// Distinct addresses that occur more than once, in order of first repeat
    pub duplicates: Vec<String>,
    pub duplicate_count: usize,
    pub duplicate_preview: Vec<String>,
    pub invalid_emails: Vec<String>,
    pub invalid_count: usize,
    pub invalid_preview: Vec<String>,
    pub role_emails: Vec<String>,
    pub role_email_count: usize,
    pub role_preview: Vec<String>,
    /// Safe-to-send addresses in original order, first occurrence only
    pub clean_list: Vec<String>,
    pub clean_list_count: usize,
    pub removed_count: usize,
    pub warnings: Vec<HygieneWarning>,
    pub recommendation: String,
}

impl SuppressionCheckResult {
    /// True when nothing has to be removed before sending
    pub fn is_clean(&self) -> bool {
        self.match_count == 0 && self.duplicate_count == 0 && self.invalid_count == 0
    }
}

/// Normalize an address for comparison
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Whether the address belongs to a job function rather than a person
pub fn is_role_address(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, _)) => ROLE_ALIASES.iter().any(|alias| local.eq_ignore_ascii_case(alias)),
        None => false,
    }
}

/// List hygiene checker
#[derive(Debug, Clone, Default)]
pub struct ListHygieneChecker {
    config: HygieneConfig,
}

impl ListHygieneChecker {
    pub fn new(config: HygieneConfig) -> Self {
        Self { config }
    }

    /// Reconcile a send list against a suppression list
    pub fn evaluate<S, T>(&self, send_list: &[S], suppression_list: &[T]) -> SuppressionCheckResult
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let send: Vec<String> = send_list.iter().map(|e| normalize(e.as_ref())).collect();
        let suppressed: HashSet<String> =
            suppression_list.iter().map(|e| normalize(e.as_ref())).collect();

        let mut first_index: HashMap<&str, usize> = HashMap::with_capacity(send.len());
        for (index, email) in send.iter().enumerate() {
            first_index.entry(email.as_str()).or_insert(index);
        }
        let is_first = |index: usize, email: &str| first_index.get(email) == Some(&index);

        let matches: Vec<String> = send
            .iter()
            .filter(|email| suppressed.contains(email.as_str()))
            .cloned()
            .collect();

        let mut seen_duplicates: HashSet<&str> = HashSet::new();
        let duplicates: Vec<String> = send
            .iter()
            .enumerate()
            .filter(|(index, email)| !is_first(*index, email))
            .filter(|(_, email)| seen_duplicates.insert(email.as_str()))
            .map(|(_, email)| email.clone())
            .collect();

        let valid: Vec<bool> = send.iter().map(|e| is_valid_email(e)).collect();

        let invalid_emails: Vec<String> = send
            .iter()
            .zip(&valid)
            .filter(|(_, ok)| !**ok)
            .map(|(email, _)| email.clone())
            .collect();

        let role_emails: Vec<String> = send
            .iter()
            .filter(|email| is_role_address(email))
            .cloned()
            .collect();

        let clean_list: Vec<String> = send
            .iter()
            .enumerate()
            .filter(|(index, email)| {
                is_first(*index, email) && valid[*index] && !suppressed.contains(email.as_str())
            })
            .map(|(_, email)| email.clone())
            .collect();

        debug!(
            "Hygiene check: {} send, {} suppression, {} matches, {} duplicates, {} invalid, {} clean",
            send.len(),
            suppression_list.len(),
            matches.len(),
            duplicates.len(),
            invalid_emails.len(),
            clean_list.len()
        );

        let mut result = SuppressionCheckResult {
            send_list_count: send.len(),
            suppression_list_count: suppression_list.len(),
            match_count: matches.len(),
            matches,
            duplicate_count: duplicates.len(),
            duplicate_preview: preview(&duplicates, self.config.duplicate_preview),
            duplicates,
            invalid_count: invalid_emails.len(),
            invalid_preview: preview(&invalid_emails, self.config.invalid_preview),
            invalid_emails,
            role_email_count: role_emails.len(),
            role_preview: preview(&role_emails, self.config.role_preview),
            role_emails,
            clean_list_count: clean_list.len(),
            removed_count: send.len() - clean_list.len(),
            clean_list,
            warnings: Vec::new(),
            recommendation: String::new(),
        };
        result.warnings = warnings(&result);
        result.recommendation = recommendation(&result);
        result
    }
}

fn preview(items: &[String], limit: usize) -> Vec<String> {
    items.iter().take(limit).cloned().collect()
}

fn warnings(result: &SuppressionCheckResult) -> Vec<HygieneWarning> {
    let mut warnings = Vec::new();

    if result.match_count > 0 {
        warnings.push(HygieneWarning {
            severity: Severity::Critical,
            message: format!(
                "{} emails found in suppression list. Sending to these could result in spam complaints and damage sender reputation.",
                result.match_count
            ),
        });
    }

    if result.duplicate_count > 0 {
        warnings.push(HygieneWarning {
            severity: Severity::Warning,
            message: format!(
                "{} duplicate emails found. Sending duplicates wastes resources and annoys recipients.",
                result.duplicate_count
            ),
        });
    }

    if result.invalid_count > 0 {
        warnings.push(HygieneWarning {
            severity: Severity::Warning,
            message: format!(
                "{} emails have invalid syntax (e.g., missing @, .com). These will hard bounce.",
                result.invalid_count
            ),
        });
    }

    if result.role_email_count > 0 {
        warnings.push(HygieneWarning {
            severity: Severity::Info,
            message: format!(
                "{} role-based emails detected (info@, sales@). These typically have lower engagement rates.",
                result.role_email_count
            ),
        });
    }

    warnings
}

fn recommendation(result: &SuppressionCheckResult) -> String {
    if result.is_clean() {
        "Your send list is clean! Safe to proceed.".to_string()
    } else {
        format!(
            "Clean your list before sending. Remove {} problematic emails.",
            result.removed_count
        )
    }
}
