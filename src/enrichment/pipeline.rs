use crate::cache::SourceCache;
use crate::config::{CacheConfig, PipelineConfig, ScoringConfig};
use crate::domain::Subject;
use crate::error::Result;
use crate::models::{EnrichedRecord, SourceFailure, SourceResult};
use crate::ratelimit::RateLimiter;
use crate::scoring;
use crate::sources::Source;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Enrichment orchestrator.
///
/// Source calls fan out with bounded concurrency; outcomes are collected
/// behind the join and folded by declared source priority, so the merged
/// record is independent of completion order. A single source failing,
/// timing out, or being rate-limited never aborts the subject; `enrich`
/// only errs on an invalid subject.
pub struct EnrichmentPipeline {
    /// Registered sources; position is the default merge priority
    sources: Vec<Arc<dyn Source>>,

    /// Shared source-result cache
    cache: Arc<SourceCache>,

    /// Shared per-class rate limiter
    limiter: Arc<RateLimiter>,

    config: PipelineConfig,
    cache_config: CacheConfig,
    scoring: ScoringConfig,
}

enum SourceRun {
    Succeeded(SourceResult),
    Skipped(String),
    Failed(String, String),
}

impl EnrichmentPipeline {
    pub fn new(
        cache: Arc<SourceCache>,
        limiter: Arc<RateLimiter>,
        config: PipelineConfig,
        cache_config: CacheConfig,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            sources: Vec::new(),
            cache,
            limiter,
            config,
            cache_config,
            scoring,
        }
    }

    /// Register a source adapter. Registration order is the default merge
    /// priority: later sources overwrite earlier ones on field collisions.
    pub fn register_source(&mut self, source: Arc<dyn Source>) {
        debug!(source = %source.name(), class = %source.rate_limit_class(), "Registered source");
        self.sources.push(source);
    }

    /// Reorder sources to the configured priority list. Sources not listed
    /// keep registration order and fold before listed ones; the last listed
    /// source has the highest precedence.
    pub fn sort_by_declared_priority(&mut self) {
        if self.config.priority.is_empty() {
            return;
        }
        let priority = &self.config.priority;
        self.sources.sort_by_key(|source| {
            priority
                .iter()
                .position(|name| name == source.name())
                .map(|index| index as i64)
                .unwrap_or(-1)
        });
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Enrich a subject with all registered sources.
    ///
    /// Always returns a record, in the worst case one containing only the
    /// normalized domain and default scorer outputs.
    pub async fn enrich(&self, raw_subject: &str) -> Result<EnrichedRecord> {
        let subject = Subject::parse(raw_subject)?;
        let start = Instant::now();
        let mut record = EnrichedRecord::new(subject.as_str());

        if self.sources.is_empty() {
            warn!(subject = %subject, "No sources registered");
        } else {
            info!(subject = %subject, sources = self.sources.len(), "Enriching subject");

            let subject_ref = &subject;
            let mut runs: Vec<(usize, SourceRun)> =
                stream::iter(self.sources.iter().enumerate())
                    .map(|(position, source)| async move {
                        (position, self.run_source(source, subject_ref).await)
                    })
                    .buffer_unordered(self.config.max_concurrent.max(1))
                    .collect()
                    .await;

            // Deterministic fold: declared priority, not arrival order
            runs.sort_by_key(|(position, _)| *position);
            for (_, run) in runs {
                match run {
                    SourceRun::Succeeded(result) => record.merge_source(&result),
                    SourceRun::Skipped(source) => record.sources_skipped.push(source),
                    SourceRun::Failed(source, reason) => {
                        record.sources_failed.push(SourceFailure { source, reason })
                    }
                }
            }
        }

        let outcome = scoring::score(&record.domain, &record.fields, &self.scoring);
        record.vendor_type = outcome.vendor_type;
        record.vendor_name = outcome.vendor_name;
        record.risk_score = outcome.risk_score;
        record.enrichment_duration_ms = start.elapsed().as_millis() as u64;

        info!(
            subject = %record.domain,
            succeeded = record.sources_succeeded.len(),
            skipped = record.sources_skipped.len(),
            failed = record.sources_failed.len(),
            risk_score = record.risk_score,
            duration_ms = record.enrichment_duration_ms,
            "Enrichment complete"
        );
        Ok(record)
    }

    async fn run_source(&self, source: &Arc<dyn Source>, subject: &Subject) -> SourceRun {
        let name = source.name().to_string();
        let policy = source.cache_policy();

        // A cache hit never consumes rate budget
        if policy.cacheable {
            if let Some(cached) = self.cache.get(&name, subject.as_str()) {
                debug!(source = %name, subject = %subject, "Using cached result");
                return SourceRun::Succeeded(cached);
            }
        }

        let class = source.rate_limit_class();
        let admitted = if self.config.wait_max_ms > 0 {
            self.limiter
                .wait_for_slot(class, Duration::from_millis(self.config.wait_max_ms))
                .await
        } else {
            self.limiter.allow(class)
        };
        if !admitted {
            debug!(source = %name, class = %class, "Source skipped: rate-limited");
            return SourceRun::Skipped(name);
        }

        let started = Instant::now();
        let fetch_timeout = Duration::from_secs(self.config.source_timeout_secs);
        match timeout(fetch_timeout, source.fetch(subject)).await {
            Ok(Ok(fields)) => {
                let result = SourceResult::success(
                    name.clone(),
                    fields,
                    started.elapsed().as_millis() as u64,
                );
                if policy.cacheable {
                    let ttl = policy
                        .ttl
                        .unwrap_or(Duration::from_secs(self.cache_config.default_ttl_secs));
                    self.cache.put(&name, subject.as_str(), result.clone(), ttl);
                }
                SourceRun::Succeeded(result)
            }
            Ok(Err(e)) => {
                warn!(source = %name, subject = %subject, error = %e, "Source failed");
                SourceRun::Failed(name, e.to_string())
            }
            Err(_) => {
                warn!(
                    source = %name,
                    subject = %subject,
                    timeout_secs = self.config.source_timeout_secs,
                    "Source timed out"
                );
                SourceRun::Failed(name, "timeout".to_string())
            }
        }
    }
}
