//! Risk/vendor scoring.
//!
//! A pure, total function over a record's merged fields: a fixed, ordered
//! list of weighted indicator rules contributes points to a risk total
//! clamped to [0, 100]; the highest-weight matching type rule picks the
//! vendor category. Identical inputs always produce identical outputs.

mod rules;

use crate::config::ScoringConfig;
use crate::models::{FieldMap, VendorType};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use self::rules::*;
use serde_json::Value;

static NAME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(www|shop|store|buy|get)").expect("invalid name prefix pattern"));
static NAME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(shop|store|site|web)$").expect("invalid name suffix pattern"));

/// Scorer output triple
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub vendor_type: Option<VendorType>,
    pub vendor_name: Option<String>,
    pub risk_score: u8,
}

/// Score a record's merged fields
pub fn score(domain: &str, fields: &FieldMap, config: &ScoringConfig) -> ScoreOutcome {
    score_at(domain, fields, config, Utc::now())
}

/// Whether the outcome marks a likely vendor site rather than a domain that
/// was merely mentioned in discussions
pub fn is_likely_vendor(
    domain: &str,
    fields: &FieldMap,
    outcome: &ScoreOutcome,
    config: &ScoringConfig,
) -> bool {
    if outcome.risk_score >= config.vendor_threshold {
        return true;
    }
    let domain = domain.to_lowercase();
    if STRONG_VENDOR_KEYWORDS.iter().any(|kw| domain.contains(kw)) {
        return true;
    }
    has_items(fields.get("vendor_keywords"))
}

pub(crate) fn score_at(
    domain: &str,
    fields: &FieldMap,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> ScoreOutcome {
    let domain = domain.to_lowercase();

    ScoreOutcome {
        vendor_type: detect_vendor_type(&domain),
        vendor_name: extract_vendor_name(&domain, fields),
        risk_score: risk_score(&domain, fields, config, now),
    }
}

/// Highest-weight matching type rule wins; a strictly-greater comparison
/// keeps the first-declared rule on ties.
fn detect_vendor_type(domain: &str) -> Option<VendorType> {
    let mut best: Option<&TypeRule> = None;

    for rule in TYPE_RULES {
        if rule.keywords.iter().any(|kw| domain.contains(kw)) {
            if best.map_or(true, |b| rule.weight > b.weight) {
                best = Some(rule);
            }
        }
    }
    best.map(|rule| rule.vendor_type)
}

/// Deterministic name precedence: explicit `vendor_name` field, else an
/// organization/registrant field, else a cleaned second-level-domain
/// heuristic, else absent.
fn extract_vendor_name(domain: &str, fields: &FieldMap) -> Option<String> {
    for field in ["vendor_name", "organization", "registrant_org", "org"] {
        if let Some(name) = fields.get(field).and_then(Value::as_str) {
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return None;
    }
    let sld = parts[parts.len() - 2];
    let stripped = NAME_PREFIX.replace(sld, "");
    let stripped = NAME_SUFFIX.replace(&stripped, "");
    if stripped.len() > 2 {
        return Some(capitalize(&stripped));
    }
    None
}

fn risk_score(domain: &str, fields: &FieldMap, config: &ScoringConfig, now: DateTime<Utc>) -> u8 {
    let weights = &config.weights;
    let mut total: i32 = 0;

    for keyword in STRONG_VENDOR_KEYWORDS {
        if domain.contains(keyword) {
            total += weights.strong_keyword;
        }
    }
    for keyword in MEDIUM_VENDOR_KEYWORDS {
        if domain.contains(keyword) {
            total += weights.medium_keyword;
        }
    }

    if has_items(fields.get("vendor_keywords")) {
        total += weights.content_keywords;
    }
    if has_items(fields.get("pricing_indicators")) {
        total += weights.pricing_indicators;
    }

    if let Some(payment) = field_lower(fields, "payment_processor") {
        if contains_any(&payment, CRYPTO_PAYMENT_INDICATORS) {
            total += weights.crypto_payment;
        } else if contains_any(&payment, MAINSTREAM_PAYMENT_PROCESSORS) {
            total += weights.mainstream_payment;
        }
    }

    let hosting = [
        field_lower(fields, "isp").unwrap_or_default(),
        field_lower(fields, "host_name").unwrap_or_default(),
    ]
    .join(" ");
    if !hosting.trim().is_empty() {
        if contains_any(&hosting, OFFSHORE_HOSTING_INDICATORS) {
            total += weights.offshore_hosting;
        } else if contains_any(&hosting, MAINSTREAM_HOSTING_PROVIDERS) {
            total += weights.mainstream_hosting;
        }
    }

    if let Some(registrar) = field_lower(fields, "registrar") {
        if contains_any(&registrar, PRIVACY_REGISTRAR_INDICATORS) {
            total += weights.privacy_registrar;
        } else if contains_any(&registrar, MAINSTREAM_REGISTRARS) {
            total += weights.mainstream_registrar;
        }
    }

    if let Some(created) = parse_creation_date(fields) {
        if (now - created).num_days() < config.young_domain_days {
            total += weights.young_domain;
        }
    }

    for site in MENTION_ONLY_SITES {
        if domain.contains(site) {
            total += weights.mention_only;
            break;
        }
    }

    total.clamp(0, 100) as u8
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn field_lower(fields: &FieldMap, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(|s| s.to_lowercase())
}

/// Non-empty array or non-empty string counts as present
fn has_items(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}

fn parse_creation_date(fields: &FieldMap) -> Option<DateTime<Utc>> {
    let raw = fields.get("creation_date").and_then(Value::as_str)?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Date-only and "date time" WHOIS formats
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
