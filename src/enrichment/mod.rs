/// Multi-source enrichment orchestration
///
/// Runs every registered source adapter for a subject through the cache and
/// rate limiter, merges partial results into one record, and tolerates
/// individual source failures.
pub mod pipeline;

pub use pipeline::EnrichmentPipeline;
