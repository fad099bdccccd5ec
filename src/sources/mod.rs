/// Source adapter contract and the generic HTTP adapter
///
/// A source fetches one kind of metadata for a subject from an external
/// origin. Adapters declare their rate-limit class and cache policy; the
/// enrichment pipeline treats them polymorphically.
pub mod http_api;

pub use http_api::HttpApiSource;

use crate::domain::Subject;
use crate::models::FieldMap;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Classified adapter failures. All of them are non-fatal to enrichment;
/// the pipeline records the reason on the subject's record and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("timeout")]
    Timeout,

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("not found")]
    NotFound,

    #[error("quota exceeded")]
    QuotaExceeded,
}

/// Cache behavior a source declares for its results
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    /// Whether successful results may be cached at all
    pub cacheable: bool,

    /// TTL for cached results; `None` falls back to the deployment default
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// Cacheable with an explicit TTL
    pub fn cached(ttl: Duration) -> Self {
        Self {
            cacheable: true,
            ttl: Some(ttl),
        }
    }

    /// Cacheable with the deployment default TTL
    pub fn cached_default() -> Self {
        Self {
            cacheable: true,
            ttl: None,
        }
    }

    /// Never cached; the source always wants a fresh read
    pub fn uncached() -> Self {
        Self {
            cacheable: false,
            ttl: None,
        }
    }
}

/// Trait for metadata source adapters
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Source name (unique per deployment)
    fn name(&self) -> &str;

    /// Rate-limit class of the source's external origin. Sources sharing an
    /// origin share a class; the default is a class of the source's own.
    fn rate_limit_class(&self) -> &str {
        self.name()
    }

    /// Cache behavior for this source's results
    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::cached_default()
    }

    /// Fetch metadata for the subject
    async fn fetch(&self, subject: &Subject) -> Result<FieldMap, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_policy_constructors() {
        let cached = CachePolicy::cached(Duration::from_secs(60));
        assert!(cached.cacheable);
        assert_eq!(cached.ttl, Some(Duration::from_secs(60)));

        let uncached = CachePolicy::uncached();
        assert!(!uncached.cacheable);
        assert!(uncached.ttl.is_none());
    }

    #[test]
    fn test_source_error_reasons() {
        assert_eq!(SourceError::Timeout.to_string(), "timeout");
        assert_eq!(SourceError::NotFound.to_string(), "not found");
        assert_eq!(SourceError::QuotaExceeded.to_string(), "quota exceeded");
        assert_eq!(
            SourceError::BadResponse("status 502".to_string()).to_string(),
            "bad response: status 502"
        );
    }
}
