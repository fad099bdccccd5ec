//! Domain Sentry: domain metadata enrichment, vendor risk scoring, and
//! infrastructure clustering.
//!
//! The crate collects per-domain metadata from independent, rate-limited
//! source adapters, merges the partial results into one canonical
//! [`models::EnrichedRecord`], scores it for risk/vendor classification, and
//! groups records sharing infrastructure fingerprints into clusters.
//!
//! Core components:
//! - [`ratelimit::RateLimiter`]: per-source-class request budgets
//! - [`cache::SourceCache`]: (source, subject) result cache with TTLs
//! - [`enrichment::EnrichmentPipeline`]: partial-failure-tolerant orchestrator
//! - [`scoring`]: pure risk/vendor scorer
//! - [`clustering::ClusteringEngine`]: infrastructure-signature clustering

pub mod cache;
pub mod clustering;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod scoring;
pub mod sources;
pub mod store;

pub use cache::{CacheStats, SourceCache};
pub use clustering::{Cluster, ClusteringEngine};
pub use config::Config;
pub use domain::Subject;
pub use enrichment::EnrichmentPipeline;
pub use error::{AppError, Result};
pub use models::{EnrichedRecord, SourceResult, VendorType};
pub use ratelimit::RateLimiter;
pub use sources::{HttpApiSource, Source};
pub use store::{create_store, RecordStore};
