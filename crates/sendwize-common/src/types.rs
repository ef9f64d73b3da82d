//! Common types for Sendwize

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp wrapper
pub type Timestamp = DateTime<Utc>;

/// Simple deliverability syntax check: `local@domain.tld`, no whitespace,
/// exactly one `@`, and a dot inside the domain with text on both sides.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(pos, c)| c == '.' && pos > 0 && pos + 1 < domain.len())
}

/// One marketing contact as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ContactRecord {
    /// Create a contact with only an email address
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            consent_date: None,
            consent_method: None,
            source: None,
        }
    }

    pub fn with_consent_date(mut self, date: impl Into<String>) -> Self {
        self.consent_date = Some(date.into());
        self
    }

    pub fn with_consent_method(mut self, method: impl Into<String>) -> Self {
        self.consent_method = Some(method.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Parsed consent date, `None` when it cannot be understood
    pub fn parsed_consent_date(&self) -> Option<Timestamp> {
        self.consent_date.as_deref().and_then(parse_date)
    }
}

/// Parse a consent date.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, `YYYY/MM/DD`
/// and day-first `DD/MM/YYYY`. Date-only values are midnight UTC.
pub fn parse_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// How many contacts are existing customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    All,
    Some,
    None,
}

/// How the marketed products relate to what customers bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Similar,
    Different,
    Mixed,
}

/// Audience of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    B2b,
    B2c,
    Mixed,
}

/// Parameters for one consent audit call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentAuditConfig {
    pub customer_type: CustomerType,
    pub product_type: ProductType,
    pub email_type: EmailType,
    /// Injected "now" used for consent age and expiry projection
    pub evaluation_date: Timestamp,
}

/// Risk bucket derived from a consent score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Safe,
    Probably,
    Risky,
    Danger,
}

impl Bucket {
    /// Map a score to its bucket: safe >= 90, probably >= 70, risky >= 40
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Bucket::Safe,
            70..=89 => Bucket::Probably,
            40..=69 => Bucket::Risky,
            _ => Bucket::Danger,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Safe => "safe",
            Bucket::Probably => "probably",
            Bucket::Risky => "risky",
            Bucket::Danger => "danger",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one content or vendor check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
    Info,
}

/// Severity of a list hygiene warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.co.uk"));
        assert!(is_valid_email("a@b.com."));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_bucket_thresholds() {
        assert_eq!(Bucket::from_score(100), Bucket::Safe);
        assert_eq!(Bucket::from_score(90), Bucket::Safe);
        assert_eq!(Bucket::from_score(89), Bucket::Probably);
        assert_eq!(Bucket::from_score(70), Bucket::Probably);
        assert_eq!(Bucket::from_score(69), Bucket::Risky);
        assert_eq!(Bucket::from_score(40), Bucket::Risky);
        assert_eq!(Bucket::from_score(39), Bucket::Danger);
        assert_eq!(Bucket::from_score(0), Bucket::Danger);
    }

    #[test]
    fn test_parse_date_formats() {
        let iso = parse_date("2023-04-05").unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2023, 4, 5));
        assert_eq!(iso.hour(), 0);

        let uk = parse_date("05/04/2023").unwrap();
        assert_eq!(uk, iso);

        let slashed = parse_date("2023/04/05").unwrap();
        assert_eq!(slashed, iso);

        let rfc = parse_date("2023-04-05T10:30:00+01:00").unwrap();
        assert_eq!(rfc.hour(), 9);

        let naive = parse_date("2023-04-05T10:30:00").unwrap();
        assert_eq!(naive.hour(), 10);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
        assert!(parse_date("last spring").is_none());
        assert!(parse_date("2023-13-40").is_none());
    }

    #[test]
    fn test_contact_deserialize_camel_case() {
        let contact: ContactRecord = serde_json::from_value(serde_json::json!({
            "email": "a@b.com",
            "consentDate": "2024-01-01",
            "consentMethod": "Double opt-in"
        }))
        .unwrap();
        assert_eq!(contact.consent_date.as_deref(), Some("2024-01-01"));
        assert_eq!(contact.consent_method.as_deref(), Some("Double opt-in"));
        assert!(contact.source.is_none());
    }
}
