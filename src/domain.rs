use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Well-known TLDs accepted without further shape checks. Not exhaustive;
/// unknown 2-4 letter TLDs are accepted by the shape rule below.
static VALID_TLDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "com", "org", "net", "edu", "gov", "mil", "int", "io", "co", "ai", "app", "dev", "tech",
        "online", "xyz", "info", "biz", "me", "tv", "cc", "ws", "uk", "us", "ca", "au", "de",
        "fr", "jp", "cn", "ru", "in", "br", "mx", "es", "it", "nl", "se", "no", "dk", "fi", "pl",
        "cz", "gr", "ie", "pt", "be", "ch", "at", "nz", "sg", "hk", "kr", "tw", "th", "vn", "ph",
        "id", "my", "ae", "sa", "il", "tr", "za", "eg", "ng", "ke", "gh", "ma", "tn", "ro", "hu",
        "bg", "hr", "sk", "si", "lt", "lv", "ee", "is", "lu", "mt", "cy", "li", "mc", "ad", "sm",
        "va", "by", "ua", "kz", "ge", "am", "az", "md", "al", "mk", "rs", "ba", "xk", "club",
        "site", "website", "store", "shop", "blog", "news", "media", "email", "cloud", "host",
    ]
    .into_iter()
    .collect()
});

/// Patterns that mark a candidate as not a real domain: asset files, bare IPs,
/// private hosts, and script artifacts that commonly leak out of scraped pages.
static INVALID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\.(jpg|jpeg|png|gif|pdf|txt|zip|rar|exe|dll|css|js|json|xml|asp|php|html|svg|ico|woff|ttf|eot)$",
        r"^[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+$",
        r"^localhost",
        r"^127\.",
        r"^192\.168\.",
        r"^10\.",
        r"^172\.(1[6-9]|2[0-9]|3[01])\.",
        r"\.prototype\.",
        r"\.style\.",
        r"\.(create|push|tolowercase)$",
        r"^(meta|img|button)\.",
        r"^manifest\.",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid domain pattern"))
    .collect()
});

/// A normalized domain name.
///
/// Two subjects normalizing to the same string are the same entity; parsing an
/// already-normalized subject returns it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    /// Parse and normalize a raw domain string.
    ///
    /// Strips scheme, `www.` prefix, path/query/fragment, and a trailing dot,
    /// lowercases, then validates the result. An unusable subject is the one
    /// hard error of the enrichment flow.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);

        if normalized.is_empty() {
            return Err(AppError::Validation("empty subject".to_string()));
        }
        if !normalized.contains('.') {
            return Err(AppError::Validation(format!(
                "subject '{}' is not a domain name",
                normalized
            )));
        }
        if normalized.len() < 4 || normalized.len() > 253 {
            return Err(AppError::Validation(format!(
                "subject '{}' has invalid length",
                normalized
            )));
        }
        for pattern in INVALID_PATTERNS.iter() {
            if pattern.is_match(&normalized) {
                return Err(AppError::Validation(format!(
                    "subject '{}' is not a routable domain",
                    normalized
                )));
            }
        }
        if !has_valid_tld(&normalized) {
            return Err(AppError::Validation(format!(
                "subject '{}' has an invalid TLD",
                normalized
            )));
        }

        Ok(Subject(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Second-level label, e.g. `example` for `shop.example.com`.
    pub fn second_level(&self) -> Option<&str> {
        let parts: Vec<&str> = self.0.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2])
        } else {
            None
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize(raw: &str) -> String {
    let mut s = raw.trim().to_lowercase();

    for prefix in ["https://", "http://"] {
        if let Some(stripped) = s.strip_prefix(prefix) {
            s = stripped.to_string();
        }
    }
    if let Some(stripped) = s.strip_prefix("www.") {
        s = stripped.to_string();
    }

    // Cut paths, query strings and fragments
    for sep in ['/', '?', '#'] {
        if let Some(idx) = s.find(sep) {
            s.truncate(idx);
        }
    }

    s.trim_end_matches('.').to_string()
}

fn has_valid_tld(domain: &str) -> bool {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    let tld = parts[parts.len() - 1];
    if tld.len() < 2 {
        return false;
    }
    if VALID_TLDS.contains(tld) {
        return true;
    }
    // Country codes and newer TLDs not in the table
    if tld.len() <= 4 && tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return true;
    }
    false
}
