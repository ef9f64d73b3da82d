//! Audit history records
//!
//! Each completed audit can be handed to a [`HistorySink`] as one row with
//! headline figures and the full result as a JSON blob.

use crate::content::ContentAuditResult;
use crate::hygiene::SuppressionCheckResult;
use crate::report::ConsentAuditReport;
use crate::vendor::VendorCheckReport;
use async_trait::async_trait;
use chrono::NaiveDate;
use sendwize_common::types::Timestamp;
use sendwize_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Kind of audit a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    ConsentAudit,
    SuppressionCheck,
    EmailScan,
    VendorCheck,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::ConsentAudit => "consent_audit",
            HistoryKind::SuppressionCheck => "suppression_check",
            HistoryKind::EmailScan => "email_scan",
            HistoryKind::VendorCheck => "vendor_check",
        }
    }
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub kind: HistoryKind,
    pub user_id: String,
    pub date: NaiveDate,
    /// Headline figures shown in history listings
    pub figures: Map<String, Value>,
    /// Serialized result
    pub results: String,
}

impl HistoryRecord {
    fn new(
        kind: HistoryKind,
        user_id: &str,
        at: Timestamp,
        figures: Value,
        results: &impl Serialize,
    ) -> Result<Self> {
        let figures = match figures {
            Value::Object(map) => map,
            other => return Err(Error::Internal(format!("figures must be an object, got {}", other))),
        };
        let results = serde_json::to_string(results)
            .map_err(|e| Error::Internal(format!("Failed to serialize {} results: {}", kind, e)))?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            user_id: user_id.to_string(),
            date: at.date_naive(),
            figures,
            results,
        })
    }

    pub fn consent_audit(user_id: &str, at: Timestamp, report: &ConsentAuditReport) -> Result<Self> {
        let figures = json!({
            "total": report.total,
            "safe": report.counts.safe,
            "probably": report.counts.probably,
            "risky": report.counts.risky,
            "danger": report.counts.danger,
        });
        Self::new(HistoryKind::ConsentAudit, user_id, at, figures, report)
    }

    pub fn suppression_check(
        user_id: &str,
        at: Timestamp,
        result: &SuppressionCheckResult,
    ) -> Result<Self> {
        let figures = json!({
            "sendListSize": result.send_list_count,
            "suppressionListSize": result.suppression_list_count,
            "matchesFound": result.match_count,
            "duplicatesFound": result.duplicate_count,
            "invalidEmailsFound": result.invalid_count,
            "cleanListSize": result.clean_list_count,
        });
        Self::new(HistoryKind::SuppressionCheck, user_id, at, figures, result)
    }

    pub fn email_scan(
        user_id: &str,
        at: Timestamp,
        subject: &str,
        result: &ContentAuditResult,
    ) -> Result<Self> {
        let figures = json!({
            "subject": subject,
            "score": result.score,
            "checksPassed": result.summary.passed,
            "warnings": result.summary.warnings,
            "criticalIssues": result.summary.failed,
        });
        Self::new(HistoryKind::EmailScan, user_id, at, figures, &json!({ "checks": result.checks }))
    }

    pub fn vendor_check(user_id: &str, at: Timestamp, report: &VendorCheckReport) -> Result<Self> {
        let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
        let figures = json!({
            "vendorsChecked": names.join(", "),
            "vendorCount": report.results.len(),
            "averageScore": report.average_score,
        });
        Self::new(HistoryKind::VendorCheck, user_id, at, figures, &report.results)
    }

    /// Headline figure by name
    pub fn figure(&self, name: &str) -> Option<&Value> {
        self.figures.get(name)
    }
}

/// Destination for audit history
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Persist one record
    async fn save(&self, record: &HistoryRecord) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentRuleAuditor, EmailDocument};
    use crate::vendor::{VendorAssessor, VendorProfile};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_email_scan_record() {
        let result = ContentRuleAuditor::default().evaluate(&EmailDocument::new("Hi", "<p>x</p>"));
        let record = HistoryRecord::email_scan("user-1", now(), "Hi", &result).unwrap();

        assert_eq!(record.kind, HistoryKind::EmailScan);
        assert_eq!(record.date.to_string(), "2026-10-19");
        assert_eq!(record.figure("score"), Some(&json!(result.score)));
        assert_eq!(record.figure("criticalIssues"), Some(&json!(result.summary.failed)));

        let blob: Value = serde_json::from_str(&record.results).unwrap();
        assert_eq!(blob["checks"].as_array().unwrap().len(), result.checks.len());
    }

    #[test]
    fn test_vendor_check_record() {
        let assessor = VendorAssessor::new();
        let report = VendorCheckReport::new(vec![
            assessor.assess(&VendorProfile::new("Mailer")),
            assessor.unverified("Startup CRM"),
        ]);
        let record = HistoryRecord::vendor_check("user-1", now(), &report).unwrap();

        assert_eq!(record.figure("vendorsChecked"), Some(&json!("Mailer, Startup CRM")));
        assert_eq!(record.figure("vendorCount"), Some(&json!(2)));
        assert_eq!(record.figure("averageScore"), Some(&json!(63)));
    }

    #[test]
    fn test_record_serialization() {
        let report = ConsentAuditReport::default();
        let record = HistoryRecord::consent_audit("user-1", now(), &report).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "consent_audit");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["figures"]["total"], 0);
    }
}
