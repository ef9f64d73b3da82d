//! Consent record auditing
//!
//! Classifies each contact's marketing consent under PECR and produces a
//! 0-100 score, a category label and a risk bucket.

mod auditor;

pub use auditor::{
    derive_facts, is_consumer_domain, screen, Adjustment, AuditResult, ConsentFacts,
    ConsentRecordAuditor, HardViolation, ScoreEffect, CONSUMER_DOMAINS,
};
