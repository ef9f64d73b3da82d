//! Audit service
//!
//! Owns the engines and exposes one entry point per audit. The `_json`
//! variants parse a request body, run the audit and hand a history record
//! to the configured sink when the caller identified themselves.

use crate::consent::{AuditResult, ConsentRecordAuditor};
use crate::content::{ContentAuditResult, ContentRuleAuditor, EmailDocument};
use crate::history::{HistoryRecord, HistorySink};
use crate::hygiene::{ListHygieneChecker, SuppressionCheckInput, SuppressionCheckResult};
use crate::report::ConsentAuditReport;
use crate::request::{user_id, ConsentAuditRequest, VendorCheckRequest};
use crate::vendor::{VendorAssessor, VendorCheckReport, VendorProfile};
use rayon::prelude::*;
use sendwize_common::logging::init_logging;
use sendwize_common::types::{ConsentAuditConfig, ContactRecord, Timestamp};
use sendwize_common::{Config, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit service
pub struct AuditService {
    config: Config,
    consent: ConsentRecordAuditor,
    hygiene: ListHygieneChecker,
    content: ContentRuleAuditor,
    vendors: VendorAssessor,
    history: Option<Arc<dyn HistorySink>>,
}

impl AuditService {
    /// Create a new audit service
    pub fn new(config: Config) -> Self {
        Self {
            consent: ConsentRecordAuditor::new(),
            hygiene: ListHygieneChecker::new(config.hygiene.clone()),
            content: ContentRuleAuditor::new(config.content.clone()),
            vendors: VendorAssessor::new(),
            history: None,
            config,
        }
    }

    /// Load configuration, initialize logging and build the service
    pub fn bootstrap() -> Result<Self> {
        let config = Config::load()?;
        init_logging(&config.logging)?;
        info!("Sendwize audit service ready");
        Ok(Self::new(config))
    }

    /// Attach a history sink
    pub fn with_history(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    /// Score every contact, in input order
    pub fn evaluate_contacts(
        &self,
        contacts: &[ContactRecord],
        config: &ConsentAuditConfig,
    ) -> Vec<AuditResult> {
        if contacts.len() >= self.config.consent.parallel_threshold {
            debug!("Evaluating {} contacts in parallel", contacts.len());
            contacts
                .par_iter()
                .map(|contact| self.consent.evaluate(contact, config))
                .collect()
        } else {
            contacts
                .iter()
                .map(|contact| self.consent.evaluate(contact, config))
                .collect()
        }
    }

    /// Audit consent for a contact list
    pub fn audit_consent(
        &self,
        contacts: &[ContactRecord],
        config: &ConsentAuditConfig,
    ) -> ConsentAuditReport {
        let results = self.evaluate_contacts(contacts, config);
        let report = ConsentAuditReport::build(results, config.evaluation_date, &self.config.consent);
        info!(
            total = report.total,
            safe = report.counts.safe,
            probably = report.counts.probably,
            risky = report.counts.risky,
            danger = report.counts.danger,
            at_risk = report.at_risk(),
            "Consent audit complete"
        );
        report
    }

    /// Reconcile a send list against a suppression list
    pub fn check_list_hygiene<S, T>(&self, send_list: &[S], suppression_list: &[T]) -> SuppressionCheckResult
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let result = self.hygiene.evaluate(send_list, suppression_list);
        info!(
            send = result.send_list_count,
            matches = result.match_count,
            duplicates = result.duplicate_count,
            invalid = result.invalid_count,
            clean = result.clean_list_count,
            "Suppression check complete"
        );
        result
    }

    /// Score one email
    pub fn audit_content(&self, document: &EmailDocument) -> ContentAuditResult {
        let result = self.content.evaluate(document);
        info!(
            score = result.score,
            failed = result.summary.failed,
            blocked = result.has_failures(),
            "Email scan complete"
        );
        result
    }

    /// Assess a batch of vendors
    pub fn assess_vendors(&self, vendors: &[VendorProfile]) -> VendorCheckReport {
        let results = vendors.iter().map(|vendor| self.vendors.evaluate(vendor)).collect();
        let report = VendorCheckReport::new(results);
        info!(count = report.results.len(), "Vendor check complete");
        report
    }

    pub async fn audit_consent_json(&self, body: &Value, now: Timestamp) -> Result<ConsentAuditReport> {
        let request = ConsentAuditRequest::from_json(body)?;
        let report = self.audit_consent(&request.contacts, &request.config(now));
        if let Some(user) = request.user_id.as_deref() {
            self.record(HistoryRecord::consent_audit(user, now, &report)).await;
        }
        Ok(report)
    }

    pub async fn check_list_hygiene_json(
        &self,
        body: &Value,
        now: Timestamp,
    ) -> Result<SuppressionCheckResult> {
        let input = SuppressionCheckInput::from_json(body)?;
        let result = self.check_list_hygiene(&input.send_list, &input.suppression_list);
        if let Some(user) = user_id(body) {
            self.record(HistoryRecord::suppression_check(&user, now, &result)).await;
        }
        Ok(result)
    }

    pub async fn audit_content_json(&self, body: &Value, now: Timestamp) -> Result<ContentAuditResult> {
        let document = EmailDocument::from_json(body)?;
        let result = self.audit_content(&document);
        if let Some(user) = user_id(body) {
            self.record(HistoryRecord::email_scan(&user, now, &document.subject, &result))
                .await;
        }
        Ok(result)
    }

    pub async fn assess_vendors_json(&self, body: &Value, now: Timestamp) -> Result<VendorCheckReport> {
        let request = VendorCheckRequest::from_json(body)?;
        let report = self.assess_vendors(&request.vendors);
        if let Some(user) = request.user_id.as_deref() {
            self.record(HistoryRecord::vendor_check(user, now, &report)).await;
        }
        Ok(report)
    }

    /// Hand a record to the history sink. Failures are logged, never returned.
    pub async fn record(&self, record: Result<HistoryRecord>) {
        let Some(sink) = &self.history else {
            debug!("No history sink configured, skipping record");
            return;
        };
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to build history record: {}", e);
                return;
            }
        };
        match sink.save(&record).await {
            Ok(()) => debug!(kind = %record.kind, id = %record.id, "Saved history record"),
            Err(e) => warn!(kind = %record.kind, "History save failed: {}", e),
        }
    }
}

impl Default for AuditService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
