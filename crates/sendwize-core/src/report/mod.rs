//! Aggregate consent report
//!
//! Groups audited contacts by bucket, projects consent expiry over the
//! coming months and rates each acquisition source.

use crate::consent::AuditResult;
use chrono::{Datelike, Months};
use sendwize_common::config::ConsentConfig;
use sendwize_common::types::{Bucket, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Source label for contacts without one
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Number of contacts per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub safe: usize,
    pub probably: usize,
    pub risky: usize,
    pub danger: usize,
}

/// Projected consent lapses per month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryTimeline {
    /// `"<Mon> <YYYY>"`, starting at the evaluation month
    pub labels: Vec<String>,
    pub data: Vec<usize>,
}

impl ExpiryTimeline {
    pub fn total(&self) -> usize {
        self.data.iter().sum()
    }
}

/// Rating of an acquisition source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRating {
    Excellent,
    Good,
    Poor,
    Critical,
}

impl SourceRating {
    pub fn from_average(avg: u8) -> Self {
        match avg {
            85..=u8::MAX => SourceRating::Excellent,
            70..=84 => SourceRating::Good,
            50..=69 => SourceRating::Poor,
            _ => SourceRating::Critical,
        }
    }
}

/// Consent quality for one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuality {
    pub source: String,
    pub total: usize,
    pub avg_score: u8,
    pub rating: SourceRating,
}

/// Consent audit report over a whole contact list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentAuditReport {
    pub total: usize,
    pub safe: Vec<AuditResult>,
    pub probably: Vec<AuditResult>,
    pub risky: Vec<AuditResult>,
    pub danger: Vec<AuditResult>,
    pub counts: BucketCounts,
    pub expiry_timeline: ExpiryTimeline,
    pub source_quality: Vec<SourceQuality>,
}

impl ConsentAuditReport {
    /// Build the report from per-contact results, kept in input order
    pub fn build(results: Vec<AuditResult>, evaluation_date: Timestamp, config: &ConsentConfig) -> Self {
        let total = results.len();
        let source_quality = source_quality(&results);

        let mut report = Self {
            total,
            source_quality,
            ..Self::default()
        };
        for result in results {
            match result.bucket {
                Bucket::Safe => report.safe.push(result),
                Bucket::Probably => report.probably.push(result),
                Bucket::Risky => report.risky.push(result),
                Bucket::Danger => report.danger.push(result),
            }
        }
        report.counts = BucketCounts {
            safe: report.safe.len(),
            probably: report.probably.len(),
            risky: report.risky.len(),
            danger: report.danger.len(),
        };
        report.expiry_timeline = expiry_timeline(
            report.risky.iter().chain(report.probably.iter()),
            evaluation_date,
            config,
        );
        report
    }

    /// Contacts scoring below the probably threshold
    pub fn at_risk(&self) -> usize {
        self.counts.risky + self.counts.danger
    }
}

fn month_label(year: i32, month0: u32) -> String {
    format!("{} {}", MONTH_NAMES[month0 as usize % 12], year)
}

/// Count contacts whose consent lapses in each of the next months.
///
/// Expiry is the consent date plus the configured lifetime. Lapses on an
/// earlier day or beyond the horizon are not counted.
pub fn expiry_timeline<'a>(
    results: impl IntoIterator<Item = &'a AuditResult>,
    evaluation_date: Timestamp,
    config: &ConsentConfig,
) -> ExpiryTimeline {
    let horizon = config.expiry_horizon_months as usize;
    let start = evaluation_date.year() * 12 + evaluation_date.month0() as i32;

    let labels = (0..horizon as i32)
        .map(|offset| {
            let index = start + offset;
            month_label(index.div_euclid(12), index.rem_euclid(12) as u32)
        })
        .collect();
    let mut data = vec![0; horizon];

    let lifetime = Months::new(config.consent_lifetime_years.saturating_mul(12));
    for result in results {
        let Some(expiry) = result
            .contact
            .parsed_consent_date()
            .and_then(|date| date.checked_add_months(lifetime))
        else {
            continue;
        };
        if expiry.date_naive() < evaluation_date.date_naive() {
            continue;
        }
        let offset = expiry.year() * 12 + expiry.month0() as i32 - start;
        if let Some(slot) = usize::try_from(offset).ok().and_then(|i| data.get_mut(i)) {
            *slot += 1;
        }
    }

    ExpiryTimeline { labels, data }
}

/// Rate each source by the rounded mean score of its contacts
pub fn source_quality(results: &[AuditResult]) -> Vec<SourceQuality> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, (usize, u64)> = HashMap::new();

    for result in results {
        let source = match result.contact.source.as_deref().map(str::trim) {
            Some(source) if !source.is_empty() => source.to_string(),
            _ => UNKNOWN_SOURCE.to_string(),
        };
        let entry = stats.entry(source.clone()).or_insert_with(|| {
            order.push(source);
            (0, 0)
        });
        entry.0 += 1;
        entry.1 += u64::from(result.score);
    }

    let mut quality: Vec<SourceQuality> = order
        .into_iter()
        .filter_map(|source| {
            let (total, sum) = stats.get(&source).copied()?;
            let avg_score = (sum as f64 / total as f64).round() as u8;
            Some(SourceQuality {
                source,
                total,
                avg_score,
                rating: SourceRating::from_average(avg_score),
            })
        })
        .collect();
    // stable sort keeps first-appearance order for ties
    quality.sort_by(|a, b| b.avg_score.cmp(&a.avg_score));
    quality
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use sendwize_common::types::ContactRecord;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn result(email: &str, date: Option<&str>, source: Option<&str>, score: u8) -> AuditResult {
        let mut contact = ContactRecord::new(email);
        contact.consent_date = date.map(str::to_string);
        contact.source = source.map(str::to_string);
        AuditResult {
            contact,
            score,
            category: "test".to_string(),
            bucket: Bucket::from_score(score),
        }
    }

    #[test]
    fn test_timeline_labels() {
        let timeline = expiry_timeline(Vec::<AuditResult>::new().iter(), now(), &ConsentConfig::default());
        assert_eq!(timeline.labels.len(), 12);
        assert_eq!(timeline.labels[0], "Oct 2026");
        assert_eq!(timeline.labels[2], "Dec 2026");
        assert_eq!(timeline.labels[3], "Jan 2027");
        assert_eq!(timeline.labels[11], "Sep 2027");
        assert_eq!(timeline.data, vec![0; 12]);
    }

    #[test]
    fn test_timeline_counts() {
        let results = vec![
            // expires Nov 2026
            result("a@x.com", Some("2024-11-03"), None, 75),
            // expired Oct 1 2026, before the evaluation date
            result("b@x.com", Some("2024-10-01"), None, 75),
            // expires later this month
            result("c@x.com", Some("2024-10-25"), None, 50),
            // expires Oct 2027, past the horizon
            result("d@x.com", Some("2025-10-25"), None, 50),
            // no date
            result("e@x.com", None, None, 50),
        ];
        let timeline = expiry_timeline(&results, now(), &ConsentConfig::default());
        assert_eq!(timeline.data[0], 1);
        assert_eq!(timeline.data[1], 1);
        assert_eq!(timeline.total(), 2);
    }

    #[test]
    fn test_expiry_on_evaluation_day_counts() {
        let results = vec![result("a@x.com", Some("2024-10-19"), None, 75)];
        let timeline = expiry_timeline(&results, now(), &ConsentConfig::default());
        assert_eq!(timeline.data[0], 1);

        let results = vec![result("b@x.com", Some("2024-10-18"), None, 75)];
        let timeline = expiry_timeline(&results, now(), &ConsentConfig::default());
        assert_eq!(timeline.total(), 0);
    }

    #[test]
    fn test_report_buckets_and_timeline_scope() {
        let results = vec![
            result("safe@x.com", Some("2024-11-03"), Some("Website"), 95),
            result("probably@x.com", Some("2024-11-03"), Some("Website"), 75),
            result("risky@x.com", Some("2024-12-03"), Some("Event"), 45),
            result("danger@x.com", Some("2024-12-03"), Some("Event"), 10),
        ];
        let report = ConsentAuditReport::build(results, now(), &ConsentConfig::default());

        assert_eq!(report.total, 4);
        assert_eq!(
            report.counts,
            BucketCounts {
                safe: 1,
                probably: 1,
                risky: 1,
                danger: 1
            }
        );
        assert_eq!(report.safe[0].contact.email, "safe@x.com");
        // only risky and probably contacts are projected
        assert_eq!(report.expiry_timeline.total(), 2);
        assert_eq!(report.expiry_timeline.data[1], 1);
        assert_eq!(report.expiry_timeline.data[2], 1);
        assert_eq!(report.at_risk(), 2);
    }

    #[test]
    fn test_source_quality() {
        let results = vec![
            result("a@x.com", None, Some("Event"), 60),
            result("b@x.com", None, None, 90),
            result("c@x.com", None, Some("  "), 81),
            result("d@x.com", None, Some("Event"), 45),
            result("e@x.com", None, Some("Website"), 72),
            result("f@x.com", None, Some("Referral"), 72),
        ];
        let quality = source_quality(&results);

        let summary: Vec<(&str, usize, u8, SourceRating)> = quality
            .iter()
            .map(|q| (q.source.as_str(), q.total, q.avg_score, q.rating))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Unknown", 2, 86, SourceRating::Excellent),
                ("Website", 1, 72, SourceRating::Good),
                ("Referral", 1, 72, SourceRating::Good),
                ("Event", 2, 53, SourceRating::Poor),
            ]
        );
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(SourceRating::from_average(85), SourceRating::Excellent);
        assert_eq!(SourceRating::from_average(84), SourceRating::Good);
        assert_eq!(SourceRating::from_average(70), SourceRating::Good);
        assert_eq!(SourceRating::from_average(69), SourceRating::Poor);
        assert_eq!(SourceRating::from_average(50), SourceRating::Poor);
        assert_eq!(SourceRating::from_average(49), SourceRating::Critical);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ConsentAuditReport::build(
            vec![result("a@x.com", Some("2024-11-03"), Some("Web"), 75)],
            now(),
            &ConsentConfig::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["counts"]["probably"], 1);
        assert_eq!(json["expiryTimeline"]["labels"][0], "Oct 2026");
        assert_eq!(json["sourceQuality"][0]["avgScore"], 75);
        assert_eq!(json["probably"][0]["consentDate"], "2024-11-03");
        assert_eq!(json["probably"][0]["score"], 75);
    }
}
