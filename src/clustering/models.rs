use crate::models::EnrichedRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder token for a missing signature component. Always emitted so the
/// component ordering stays stable.
pub const PLACEHOLDER: &str = "-";

/// Fixed, ordered signature components: (label, record field)
pub(crate) const SIGNATURE_FIELDS: &[(&str, &str)] = &[
    ("host", "host_name"),
    ("cdn", "cdn"),
    ("registrar", "registrar"),
    ("payment", "payment_processor"),
];

/// Deterministic fingerprint of a record's infrastructure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfrastructureSignature {
    /// `host:X|cdn:Y|registrar:Z|payment:W`, placeholders included
    pub value: String,

    /// True when every component is the placeholder
    pub all_placeholder: bool,
}

impl InfrastructureSignature {
    pub fn of(record: &EnrichedRecord) -> Self {
        let mut parts = Vec::with_capacity(SIGNATURE_FIELDS.len());
        let mut all_placeholder = true;

        for (label, field) in SIGNATURE_FIELDS {
            let value = record
                .field_str(field)
                .map(str::trim)
                .filter(|v| !v.is_empty());
            match value {
                Some(v) => {
                    all_placeholder = false;
                    parts.push(format!("{}:{}", label, v));
                }
                None => parts.push(format!("{}:{}", label, PLACEHOLDER)),
            }
        }

        Self {
            value: parts.join("|"),
            all_placeholder,
        }
    }

    /// Short stable id derived from the signature
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.value)
    }
}

pub(crate) fn fingerprint_of(signature: &str) -> String {
    let digest = Sha256::digest(signature.as_bytes());
    let mut out = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// A set of subjects sharing an infrastructure signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Shared infrastructure signature
    pub signature: String,

    /// Short stable id derived from the signature
    pub fingerprint: String,

    /// Member domains, sorted for reproducible output
    pub domains: Vec<String>,

    /// Member count
    pub domain_count: usize,

    /// Signature split into its components
    pub infrastructure: Vec<String>,

    /// Distinct vendor types observed among members
    pub vendor_types: Vec<String>,

    /// Count of distinct vendor types
    pub vendor_type_count: usize,

    /// True for the bucket of records with no known infrastructure.
    /// Unknown infrastructure is itself a grouping signal, but callers
    /// usually want to filter it out.
    pub low_confidence: bool,
}
