use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Field map supplied by source adapters. Ordered so that repeated enrichment
/// with identical inputs serializes byte-identically.
pub type FieldMap = BTreeMap<String, Value>;

/// Vendor categories the scorer can assign
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VendorType {
    SyntheticIdentity,
    Deepfake,
    Impersonation,
}

/// Output of one source adapter for one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    /// Source name
    pub source: String,

    /// Fields the source supplied
    pub fields: FieldMap,

    /// Fetch duration (milliseconds)
    pub duration_ms: u64,

    /// Success status
    pub success: bool,

    /// Failure reason if failed
    pub error: Option<String>,
}

impl SourceResult {
    pub fn success(source: String, fields: FieldMap, duration_ms: u64) -> Self {
        Self {
            source,
            fields,
            duration_ms,
            success: true,
            error: None,
        }
    }

    pub fn failure(source: String, duration_ms: u64, error: String) -> Self {
        Self {
            source,
            fields: FieldMap::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// A source that failed during enrichment, kept on the record for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source name
    pub source: String,

    /// Classified failure reason
    pub reason: String,
}

/// The merged, scored view of one subject
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnrichedRecord {
    /// Normalized subject domain
    pub domain: String,

    /// Union of all successful source field maps, folded by source priority
    pub fields: FieldMap,

    /// Vendor category assigned by the scorer
    pub vendor_type: Option<VendorType>,

    /// Vendor name extracted by the scorer
    pub vendor_name: Option<String>,

    /// Risk score in [0, 100]
    pub risk_score: u8,

    /// Sources that supplied fields
    pub sources_succeeded: Vec<String>,

    /// Sources skipped by the rate limiter
    pub sources_skipped: Vec<String>,

    /// Sources that failed, with reasons
    pub sources_failed: Vec<SourceFailure>,

    /// Enrichment timestamp
    pub enriched_at: DateTime<Utc>,

    /// Enrichment duration (milliseconds)
    pub enrichment_duration_ms: u64,
}

impl EnrichedRecord {
    /// Create an empty record for a normalized subject
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            enriched_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Fold a successful source result into the record. Only fields the
    /// source itself supplied are written; with sources folded in ascending
    /// priority order, the later (higher-priority) source wins collisions.
    pub fn merge_source(&mut self, result: &SourceResult) {
        for (key, value) in &result.fields {
            self.fields.insert(key.clone(), value.clone());
        }
        self.sources_succeeded.push(result.source.clone());
    }

    /// String view of a field, if present and a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Total sources attempted (succeeded + skipped + failed)
    pub fn total_sources(&self) -> usize {
        self.sources_succeeded.len() + self.sources_skipped.len() + self.sources_failed.len()
    }

    /// Fraction of attempted sources that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_sources() == 0 {
            return 0.0;
        }
        self.sources_succeeded.len() as f64 / self.total_sources() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_creation() {
        let record = EnrichedRecord::new("example.com");

        assert_eq!(record.domain, "example.com");
        assert!(record.fields.is_empty());
        assert_eq!(record.risk_score, 0);
        assert!(record.vendor_type.is_none());
    }

    #[test]
    fn test_merge_source_only_supplied_fields() {
        let mut record = EnrichedRecord::new("example.com");
        record
            .fields
            .insert("registrar".to_string(), json!("Old Registrar"));

        let mut fields = FieldMap::new();
        fields.insert("host_name".to_string(), json!("HostCo"));
        let result = SourceResult::success("ip-geo".to_string(), fields, 12);

        record.merge_source(&result);

        // Untouched field survives; supplied field lands
        assert_eq!(record.field_str("registrar"), Some("Old Registrar"));
        assert_eq!(record.field_str("host_name"), Some("HostCo"));
        assert_eq!(record.sources_succeeded, vec!["ip-geo".to_string()]);
    }

    #[test]
    fn test_later_merge_wins_collision() {
        let mut record = EnrichedRecord::new("example.com");

        let mut low = FieldMap::new();
        low.insert("cdn".to_string(), json!("LowCdn"));
        record.merge_source(&SourceResult::success("low".to_string(), low, 1));

        let mut high = FieldMap::new();
        high.insert("cdn".to_string(), json!("HighCdn"));
        record.merge_source(&SourceResult::success("high".to_string(), high, 1));

        assert_eq!(record.field_str("cdn"), Some("HighCdn"));
    }

    #[test]
    fn test_success_rate() {
        let mut record = EnrichedRecord::new("example.com");
        record.sources_succeeded.push("a".to_string());
        record.sources_succeeded.push("b".to_string());
        record.sources_skipped.push("c".to_string());
        record.sources_failed.push(SourceFailure {
            source: "d".to_string(),
            reason: "timeout".to_string(),
        });

        assert_eq!(record.total_sources(), 4);
        assert_eq!(record.success_rate(), 0.5);
    }

    #[test]
    fn test_vendor_type_serialization() {
        let json = serde_json::to_string(&VendorType::SyntheticIdentity).unwrap();
        assert_eq!(json, r#""synthetic_identity""#);
        assert_eq!(VendorType::Deepfake.to_string(), "deepfake");
    }

    #[test]
    fn test_field_order_is_stable() {
        let mut a = EnrichedRecord::new("example.com");
        a.fields.insert("z".to_string(), json!(1));
        a.fields.insert("a".to_string(), json!(2));

        let mut b = EnrichedRecord::new("example.com");
        b.fields.insert("a".to_string(), json!(2));
        b.fields.insert("z".to_string(), json!(1));

        assert_eq!(
            serde_json::to_string(&a.fields).unwrap(),
            serde_json::to_string(&b.fields).unwrap()
        );
    }
}
