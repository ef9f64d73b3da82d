//! Built-in content rule table
//!
//! Each rule is an independent predicate over a [`ContentSnapshot`]. A rule
//! that has something to say returns a [`RuleHit`]; rules never look at each
//! other's outcome.

use super::snapshot::{pattern, ContentSnapshot, Link};
use regex::Regex;
use sendwize_common::config::ContentConfig;
use sendwize_common::types::CheckStatus;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Group a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Critical,
    Compliance,
    Subject,
    Body,
    BestPractice,
}

/// Evidence produced by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub status: CheckStatus,
    pub title: String,
    pub description: String,
    /// Score change, zero for pass entries
    pub delta: i32,
}

impl RuleHit {
    pub fn pass(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, title, description, 0)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>, delta: i32) -> Self {
        Self::new(CheckStatus::Warning, title, description, delta)
    }

    pub fn fail(title: impl Into<String>, description: impl Into<String>, delta: i32) -> Self {
        Self::new(CheckStatus::Fail, title, description, delta)
    }

    fn new(
        status: CheckStatus,
        title: impl Into<String>,
        description: impl Into<String>,
        delta: i32,
    ) -> Self {
        Self {
            status,
            title: title.into(),
            description: description.into(),
            delta,
        }
    }
}

/// Rule predicate
pub type RuleCheck = fn(&ContentSnapshot<'_>, &ContentConfig) -> Option<RuleHit>;

/// A content rule
#[derive(Debug, Clone)]
pub struct ContentRule {
    /// Stable identifier, used to disable the rule from configuration
    pub id: &'static str,
    pub category: RuleCategory,
    pub enabled: bool,
    pub check: RuleCheck,
}

impl ContentRule {
    pub fn new(id: &'static str, category: RuleCategory, check: RuleCheck) -> Self {
        Self {
            id,
            category,
            enabled: true,
            check,
        }
    }
}

/// Subject trigger words, matched as whole words
pub const SPAM_WORDS: &[&str] = &[
    "free",
    "winner",
    "claim",
    "act now",
    "urgent",
    "limited time",
    "click here",
    "buy now",
    "guarantee",
    "cash",
    "$$$",
    "100%",
    "risk-free",
    "no obligation",
    "order now",
];

static SPAM_WORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SPAM_WORDS
        .iter()
        .map(|word| {
            let source = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(word));
            (*word, pattern(&source))
        })
        .collect()
});

static UNSUBSCRIBE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)unsubscribe|opt-out|opt out"));
static UK_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)[A-Z]{1,2}\d{1,2}\s?\d[A-Z]{2}"));
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)address|registered office"));
static PRIVACY: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)privacy|data protection|gdpr"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<html"));
static BODY_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<body"));
static REPEATED_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| pattern(r"[!?]{2,}"));
static SHORTENER: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(?:bit\.ly|tinyurl|t\.co)\b"));
static HIDDEN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)display:\s*none|visibility:\s*hidden|font-size:\s*0(?:px|pt|em|rem|%)?(?:[\s!;"'}]|$)"#)
});
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<script"));
static FORM_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<form"));
static FREE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bfree\b"));
static TERMS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)terms|conditions|t&c|t&amp;c"));
static URGENCY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)limited time|ends soon|last chance|today only"));
static EXPLICIT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\d{1,2}/\d{1,2}/\d{4}|\d{1,2}\s(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)")
});
static LIMITED_STOCK: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)limited stock|while supplies last|only \d+ left"));
static PREHEADER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)<div[^>]*style=["'][^"']*display:\s*none[^"']*["'][^>]*>[^<]{20,}"#)
});
static VIEWPORT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<meta[^>]*viewport"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\{\{|\[\[|lorem ipsum|todo"));

/// The built-in rules in report order
pub fn default_rules() -> Vec<ContentRule> {
    use RuleCategory::*;

    vec![
        ContentRule::new("unsubscribe_missing", Critical, unsubscribe_missing),
        ContentRule::new("unsubscribe_broken", Critical, unsubscribe_broken),
        ContentRule::new("postal_address", Critical, postal_address),
        ContentRule::new("privacy_link", Compliance, privacy_link),
        ContentRule::new("html_structure", Critical, html_structure),
        ContentRule::new("spam_words_high", Subject, spam_words_high),
        ContentRule::new("spam_words", Subject, spam_words),
        ContentRule::new("subject_caps", Subject, subject_caps),
        ContentRule::new("subject_punctuation", Subject, subject_punctuation),
        ContentRule::new("subject_too_long", Subject, subject_too_long),
        ContentRule::new("subject_too_short", Subject, subject_too_short),
        ContentRule::new("image_only", Body, image_only),
        ContentRule::new("low_text_ratio", Body, low_text_ratio),
        ContentRule::new("missing_alt_text", Body, missing_alt_text),
        ContentRule::new("insecure_links", Body, insecure_links),
        ContentRule::new("url_shorteners", Body, url_shorteners),
        ContentRule::new("too_many_links", Body, too_many_links),
        ContentRule::new("hidden_text", Body, hidden_text),
        ContentRule::new("script_tag", Body, script_tag),
        ContentRule::new("form_tag", Body, form_tag),
        ContentRule::new("free_without_terms", Compliance, free_without_terms),
        ContentRule::new("vague_time_limit", Compliance, vague_time_limit),
        ContentRule::new("limited_stock", Compliance, limited_stock),
        ContentRule::new("preheader_missing", BestPractice, preheader_missing),
        ContentRule::new("viewport_missing", BestPractice, viewport_missing),
        ContentRule::new("oversize", BestPractice, oversize),
        ContentRule::new("placeholders", BestPractice, placeholders),
    ]
}

/// Subject trigger words found in the subject line, in list order
pub fn spam_words_in(subject: &str) -> Vec<&'static str> {
    SPAM_WORD_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(subject))
        .map(|(word, _)| *word)
        .collect()
}

fn is_unsubscribe_link(link: &Link<'_>) -> bool {
    UNSUBSCRIBE.is_match(link.href) || UNSUBSCRIBE.is_match(link.label)
}

fn is_dead_href(href: &str) -> bool {
    let href = href.trim();
    href == "#" || href.to_ascii_lowercase().starts_with("javascript:void")
}

fn has_broken_unsubscribe(snapshot: &ContentSnapshot<'_>) -> bool {
    snapshot
        .links
        .iter()
        .any(|link| is_unsubscribe_link(link) && is_dead_href(link.href))
}

fn is_image_only(snapshot: &ContentSnapshot<'_>) -> bool {
    snapshot.image_count > 0 && snapshot.text_length < 100
}

// ---- critical -------------------------------------------------------------

fn unsubscribe_missing(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    if !UNSUBSCRIBE.is_match(snapshot.html) {
        return Some(RuleHit::fail(
            "No Unsubscribe Link",
            "PECR Regulation 22 requires clear unsubscribe mechanism. Add unsubscribe link immediately.",
            -10,
        ));
    }
    // a broken link is reported by its own rule
    (!has_broken_unsubscribe(snapshot))
        .then(|| RuleHit::pass("Unsubscribe Link Present", "Valid unsubscribe mechanism found."))
}

fn unsubscribe_broken(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (UNSUBSCRIBE.is_match(snapshot.html) && has_broken_unsubscribe(snapshot)).then(|| {
        RuleHit::fail(
            "Broken Unsubscribe Link",
            "Unsubscribe link goes nowhere. This violates PECR and traps users.",
            -10,
        )
    })
}

fn postal_address(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    if UK_POSTCODE.is_match(snapshot.html) || ADDRESS.is_match(snapshot.html) {
        Some(RuleHit::pass("Postal Address Found", "Company address included in email."))
    } else {
        Some(RuleHit::fail(
            "No Postal Address in Footer",
            "PECR requires company postal address. This is a legal violation - add your registered address.",
            -10,
        ))
    }
}

fn privacy_link(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    if PRIVACY.is_match(snapshot.html) {
        Some(RuleHit::pass("Privacy Policy Linked", "Privacy information provided."))
    } else {
        Some(RuleHit::warning(
            "No Privacy Policy Link",
            "Best practice: Link to privacy policy to show transparency.",
            -5,
        ))
    }
}

fn html_structure(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    if HTML_TAG.is_match(snapshot.html) && BODY_TAG.is_match(snapshot.html) {
        Some(RuleHit::pass("Valid HTML Structure", "Proper HTML document structure."))
    } else {
        Some(RuleHit::fail(
            "Invalid HTML Structure",
            "Missing basic HTML tags. Email may not render correctly.",
            -10,
        ))
    }
}

// ---- subject --------------------------------------------------------------

fn spam_words_high(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let found = spam_words_in(snapshot.subject);
    (found.len() > 2).then(|| {
        RuleHit::fail(
            "High Spam Score in Subject",
            format!(
                "Found {} spam trigger words: {}. Remove these to improve deliverability.",
                found.len(),
                found.join(", ")
            ),
            -10,
        )
    })
}

fn spam_words(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let found = spam_words_in(snapshot.subject);
    match found.len() {
        0 => Some(RuleHit::pass(
            "Clean Subject Line",
            "No obvious spam trigger words detected.",
        )),
        1 | 2 => Some(RuleHit::warning(
            "Spam Words in Subject",
            format!("Found: {}. Consider rewording.", found.join(", ")),
            -5,
        )),
        _ => None,
    }
}

fn subject_caps(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let caps = snapshot.subject.chars().filter(char::is_ascii_uppercase).count();
    let total = snapshot.subject.chars().filter(|c| !c.is_whitespace()).count();
    (total > 0 && caps * 2 > total).then(|| {
        RuleHit::warning(
            "Excessive Caps in Subject",
            "More than 50% uppercase. Looks like shouting and triggers spam filters.",
            -5,
        )
    })
}

fn subject_punctuation(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    REPEATED_PUNCTUATION.is_match(snapshot.subject).then(|| {
        RuleHit::warning(
            "Excessive Punctuation",
            "Multiple exclamation or question marks look unprofessional and spammy.",
            -3,
        )
    })
}

fn subject_too_long(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let length = snapshot.subject.chars().count();
    (length > 70).then(|| {
        RuleHit::warning(
            "Subject Line Too Long",
            format!(
                "{} characters. Mobile devices truncate at ~40 chars. Shorten for better open rates.",
                length
            ),
            -3,
        )
    })
}

fn subject_too_short(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (snapshot.subject.chars().count() < 20).then(|| {
        RuleHit::warning(
            "Subject Line Too Short",
            "Very short subjects often underperform. Aim for 40-50 characters.",
            -2,
        )
    })
}

// ---- body -----------------------------------------------------------------

fn image_only(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    is_image_only(snapshot).then(|| {
        RuleHit::fail(
            "Image-Only Email",
            "Less than 100 chars of text. Spam filters block image-only emails. Add more text content.",
            -10,
        )
    })
}

fn low_text_ratio(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let ratio_exceeded = snapshot.image_count as f64 > snapshot.text_length as f64 / 50.0;
    (!is_image_only(snapshot) && ratio_exceeded).then(|| {
        RuleHit::warning(
            "Low Text-to-Image Ratio",
            "Too many images vs text. Aim for 60% text, 40% images.",
            -5,
        )
    })
}

fn missing_alt_text(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let missing = snapshot.images_without_alt;
    (missing > 0).then(|| {
        RuleHit::warning(
            "Missing Alt Text on Images",
            format!(
                "{} images missing alt text. Required for accessibility and helps deliverability.",
                missing
            ),
            -5,
        )
    })
}

fn insecure_links(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    let insecure = snapshot
        .links
        .iter()
        .filter(|link| link.href.to_ascii_lowercase().starts_with("http:"))
        .count();
    (insecure > 0).then(|| {
        RuleHit::warning(
            "Insecure HTTP Links",
            format!(
                "{} links use HTTP instead of HTTPS. Modern email clients may block these.",
                insecure
            ),
            -5,
        )
    })
}

fn url_shorteners(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    snapshot
        .links
        .iter()
        .any(|link| SHORTENER.is_match(link.tag))
        .then(|| {
            RuleHit::warning(
                "URL Shorteners Detected",
                "Shortened URLs (bit.ly, etc) trigger spam filters. Use full URLs.",
                -3,
            )
        })
}

fn too_many_links(snapshot: &ContentSnapshot<'_>, config: &ContentConfig) -> Option<RuleHit> {
    let count = snapshot.links.len();
    (count > config.max_links).then(|| {
        RuleHit::warning(
            "Too Many Links",
            format!(
                "{} links found. More than {} looks spammy. Focus on 1-3 main CTAs.",
                count, config.max_links
            ),
            -5,
        )
    })
}

fn hidden_text(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    HIDDEN_TEXT.is_match(snapshot.html).then(|| {
        RuleHit::fail(
            "Hidden Text Detected",
            "CSS hiding text is a spam technique. Remove display:none, visibility:hidden, or font-size:0.",
            -10,
        )
    })
}

fn script_tag(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    SCRIPT_TAG.is_match(snapshot.html).then(|| {
        RuleHit::fail(
            "JavaScript in Email",
            "Email clients block JavaScript. Remove all <script> tags - they will not work.",
            -10,
        )
    })
}

fn form_tag(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    FORM_TAG.is_match(snapshot.html).then(|| {
        RuleHit::warning(
            "Form in Email",
            "Most email clients do not support forms. Link to a landing page instead.",
            -5,
        )
    })
}

// ---- compliance (ASA CAP Code) --------------------------------------------

fn free_without_terms(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (FREE.is_match(snapshot.subject) && !TERMS.is_match(snapshot.html)).then(|| {
        RuleHit::warning(
            "\"Free\" Claim Without T&Cs",
            "ASA CAP Code requires terms when claiming \"free\". Add link to terms & conditions.",
            -5,
        )
    })
}

fn vague_time_limit(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (URGENCY.is_match(snapshot.html) && !EXPLICIT_DATE.is_match(snapshot.html)).then(|| {
        RuleHit::warning(
            "Vague Time Limit",
            "Claims like \"limited time\" must specify exact end date/time (CAP Code 3.7).",
            -5,
        )
    })
}

fn limited_stock(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    LIMITED_STOCK.is_match(snapshot.html).then(|| {
        RuleHit::warning(
            "Limited Stock Claim",
            "Must be able to prove stock levels if challenged. Ensure this is accurate.",
            -3,
        )
    })
}

// ---- best practice --------------------------------------------------------

fn preheader_missing(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (!PREHEADER.is_match(snapshot.html)).then(|| {
        RuleHit::warning(
            "No Preheader Text",
            "Add hidden preheader text for better inbox preview.",
            -2,
        )
    })
}

fn viewport_missing(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    (!VIEWPORT.is_match(snapshot.html)).then(|| {
        RuleHit::warning(
            "Not Mobile Optimized",
            "Missing viewport meta tag. 60%+ of emails are opened on mobile.",
            -3,
        )
    })
}

fn oversize(snapshot: &ContentSnapshot<'_>, config: &ContentConfig) -> Option<RuleHit> {
    (snapshot.byte_size > config.max_bytes).then(|| {
        RuleHit::warning(
            "Email Too Large",
            format!(
                "{}KB. Gmail clips emails over 102KB. Optimize images and reduce HTML.",
                (snapshot.byte_size as f64 / 1000.0).round()
            ),
            -5,
        )
    })
}

fn placeholders(snapshot: &ContentSnapshot<'_>, _: &ContentConfig) -> Option<RuleHit> {
    PLACEHOLDER.is_match(snapshot.html).then(|| {
        RuleHit::fail(
            "Template Placeholders Found",
            "Unfinished template detected. Replace all {{placeholders}}, Lorem ipsum, or TODO items.",
            -10,
        )
    })
}
