//! Sendwize Core - Consent, list hygiene and content audit engines
//!
//! This crate provides the deterministic audit engines for Sendwize,
//! the aggregate consent report, vendor assessment and the service facade
//! that parses requests and hands results to audit history.

pub mod consent;
pub mod content;
pub mod history;
pub mod hygiene;
pub mod report;
pub mod request;
pub mod service;
pub mod vendor;

pub use consent::{AuditResult, ConsentRecordAuditor};
pub use content::{CheckEntry, ContentAuditResult, ContentRuleAuditor, EmailDocument};
pub use history::{HistoryKind, HistoryRecord, HistorySink};
pub use hygiene::{ListHygieneChecker, SuppressionCheckInput, SuppressionCheckResult};
pub use report::ConsentAuditReport;
pub use request::{ConsentAuditRequest, VendorCheckRequest};
pub use service::AuditService;
pub use vendor::{VendorAssessment, VendorAssessor, VendorCheckReport, VendorProfile};
