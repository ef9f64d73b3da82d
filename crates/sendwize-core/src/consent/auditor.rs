//! Consent record auditor
//!
//! Scores a single contact's marketing consent against PECR. Hard violations
//! short-circuit to a score of 0; everything else is an ordered list of
//! adjustments applied to a starting score of 100.

use sendwize_common::types::{
    Bucket, ConsentAuditConfig, ContactRecord, CustomerType, EmailType, ProductType, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public webmail providers; addresses here are never corporate
pub const CONSUMER_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
    "aol.com",
    "live.com",
    "me.com",
    "googlemail.com",
];

const INVALID_METHODS: &[&str] = &["pre-ticked", "preticked", "pre-tick", "assumed", "implied"];

const PURCHASED_SOURCES: &[&str] = &["purchased", "bought", "third party", "third-party", "broker"];

const MILLIS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Audit outcome for one contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(flatten)]
    pub contact: ContactRecord,
    pub score: u8,
    pub category: String,
    pub bucket: Bucket,
}

impl AuditResult {
    fn new(contact: &ContactRecord, score: u8, category: String) -> Self {
        Self {
            contact: contact.clone(),
            score,
            category,
            bucket: Bucket::from_score(score),
        }
    }
}

/// Violations that void consent outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardViolation {
    MissingConsentDate,
    InvalidConsentDate,
    InvalidMethod,
    PurchasedList,
}

impl HardViolation {
    pub fn category(&self) -> &'static str {
        match self {
            HardViolation::MissingConsentDate => "No consent date – CRITICAL",
            HardViolation::InvalidConsentDate => "Invalid date – CRITICAL",
            HardViolation::InvalidMethod => "Pre-ticked/Invalid method – PECR violation",
            HardViolation::PurchasedList => "Purchased list – No valid consent",
        }
    }
}

/// How an adjustment changes the running score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEffect {
    Deduct(i32),
    /// Raise the score to at least this value
    AtLeast(i32),
    Set(i32),
}

impl ScoreEffect {
    fn apply(self, score: i32) -> i32 {
        match self {
            ScoreEffect::Deduct(points) => score - points,
            ScoreEffect::AtLeast(floor) => score.max(floor),
            ScoreEffect::Set(value) => value,
        }
    }
}

/// Effect of one fired consent rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub effect: ScoreEffect,
    /// Category candidate; the first candidate in rule order wins
    pub category: Option<&'static str>,
    pub reason: Option<&'static str>,
}

/// Derived facts the soft rules read
#[derive(Debug, Clone, Copy)]
pub struct ConsentFacts {
    pub age_years: f64,
    pub is_customer: bool,
    pub product_type: ProductType,
    pub is_b2b: bool,
    /// Heuristic only: dotted local part at a non-webmail domain
    pub looks_personal: bool,
    pub method_documented: bool,
    pub source_documented: bool,
}

type SoftRule = fn(&ConsentFacts) -> Option<Adjustment>;

/// Soft rules in evaluation order
const SOFT_RULES: &[(&str, SoftRule)] = &[
    ("consent_age", consent_age),
    ("soft_opt_in", soft_opt_in),
    ("b2b_classification", b2b_classification),
    ("method_documented", method_documented),
    ("source_documented", source_documented),
];

fn consent_age(facts: &ConsentFacts) -> Option<Adjustment> {
    let (points, reason) = if facts.age_years > 3.0 {
        (50, "3+ years old")
    } else if facts.age_years > 2.0 {
        (30, "2-3 years old")
    } else if facts.age_years > 1.0 {
        (10, "1-2 years old")
    } else {
        return None;
    };
    Some(Adjustment {
        effect: ScoreEffect::Deduct(points),
        category: None,
        reason: Some(reason),
    })
}

// PECR Reg 22(3)
fn soft_opt_in(facts: &ConsentFacts) -> Option<Adjustment> {
    if !facts.is_customer {
        return None;
    }
    let adjustment = match facts.product_type {
        ProductType::Similar => Adjustment {
            effect: ScoreEffect::AtLeast(85),
            category: Some("Soft opt-in (similar products)"),
            reason: None,
        },
        ProductType::Different => Adjustment {
            effect: ScoreEffect::Set(30),
            category: Some("Soft opt-in INVALID (different products) – Need express consent"),
            reason: Some("Marketing different products"),
        },
        ProductType::Mixed => Adjustment {
            effect: ScoreEffect::Deduct(20),
            category: Some("Soft opt-in (verify product similarity)"),
            reason: Some("Unclear if products similar"),
        },
    };
    Some(adjustment)
}

fn b2b_classification(facts: &ConsentFacts) -> Option<Adjustment> {
    if !facts.is_b2b {
        return None;
    }
    if facts.looks_personal {
        Some(Adjustment {
            effect: ScoreEffect::Deduct(15),
            category: None,
            reason: Some("Looks like personal email at work domain"),
        })
    } else {
        Some(Adjustment {
            effect: ScoreEffect::AtLeast(75),
            category: Some("B2B corporate email"),
            reason: None,
        })
    }
}

fn method_documented(facts: &ConsentFacts) -> Option<Adjustment> {
    (!facts.method_documented).then_some(Adjustment {
        effect: ScoreEffect::Deduct(25),
        category: None,
        reason: Some("No consent method documented"),
    })
}

fn source_documented(facts: &ConsentFacts) -> Option<Adjustment> {
    (!facts.source_documented).then_some(Adjustment {
        effect: ScoreEffect::Deduct(15),
        category: None,
        reason: Some("Source not documented"),
    })
}

/// Consent record auditor
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentRecordAuditor;

impl ConsentRecordAuditor {
    pub fn new() -> Self {
        Self
    }

    /// Score one contact. Malformed fields are scoring outcomes, never errors.
    pub fn evaluate(&self, contact: &ContactRecord, config: &ConsentAuditConfig) -> AuditResult {
        let consent_date = match screen(contact) {
            Ok(date) => date,
            Err(violation) => {
                debug!(
                    "Hard consent violation for {}: {:?}",
                    contact.email, violation
                );
                return AuditResult::new(contact, 0, violation.category().to_string());
            }
        };

        let facts = derive_facts(contact, config, consent_date);

        let mut score: i32 = 100;
        let mut categories: Vec<&'static str> = Vec::new();
        let mut reasons: Vec<&'static str> = Vec::new();

        for (name, rule) in SOFT_RULES {
            if let Some(adjustment) = rule(&facts) {
                debug!("Consent rule {} fired for {}: {:?}", name, contact.email, adjustment.effect);
                score = adjustment.effect.apply(score);
                categories.extend(adjustment.category);
                reasons.extend(adjustment.reason);
            }
        }

        let score = score.clamp(0, 100) as u8;
        let category = match categories.first() {
            Some(category) => category.to_string(),
            None if !reasons.is_empty() => reasons.join(", "),
            None => "Express consent".to_string(),
        };

        AuditResult::new(contact, score, category)
    }
}

/// Apply the hard rules in order, returning the parsed consent date when none fires
pub fn screen(contact: &ContactRecord) -> Result<Timestamp, HardViolation> {
    let raw_date = contact
        .consent_date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or(HardViolation::MissingConsentDate)?;

    let consent_date =
        sendwize_common::types::parse_date(raw_date).ok_or(HardViolation::InvalidConsentDate)?;

    let method = lowercase(contact.consent_method.as_deref());
    if INVALID_METHODS.iter().any(|m| method.contains(m)) {
        return Err(HardViolation::InvalidMethod);
    }

    let source = lowercase(contact.source.as_deref());
    if PURCHASED_SOURCES.iter().any(|s| source.contains(s)) {
        return Err(HardViolation::PurchasedList);
    }

    Ok(consent_date)
}

/// Derive the facts used by the soft rules
pub fn derive_facts(
    contact: &ContactRecord,
    config: &ConsentAuditConfig,
    consent_date: Timestamp,
) -> ConsentFacts {
    let email = contact.email.to_lowercase();
    let (local, domain) = email.split_once('@').unwrap_or((email.as_str(), ""));
    let is_consumer = is_consumer_domain(domain);

    let source = lowercase(contact.source.as_deref());
    let is_customer = match config.customer_type {
        CustomerType::All => true,
        CustomerType::Some => source.contains("purchase"),
        CustomerType::None => false,
    };

    let is_b2b = match config.email_type {
        EmailType::B2b => true,
        EmailType::Mixed => !is_consumer,
        EmailType::B2c => false,
    };

    let method = contact.consent_method.as_deref().map(str::trim).unwrap_or("");
    let method_documented = !method.is_empty() && !method.eq_ignore_ascii_case("n/a");

    let source_documented = contact
        .source
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());

    let age_millis = (config.evaluation_date - consent_date).num_milliseconds();

    ConsentFacts {
        age_years: age_millis as f64 / MILLIS_PER_YEAR,
        is_customer,
        product_type: config.product_type,
        is_b2b,
        looks_personal: local.contains('.') && !is_consumer,
        method_documented,
        source_documented,
    }
}

/// Whether the domain belongs to a public webmail provider
pub fn is_consumer_domain(domain: &str) -> bool {
    CONSUMER_DOMAINS
        .iter()
        .any(|d| d.eq_ignore_ascii_case(domain))
}

fn lowercase(value: Option<&str>) -> String {
    value.unwrap_or("").to_lowercase()
}
