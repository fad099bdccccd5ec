use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Enrichment pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Source cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-class rate budgets (class name -> budget)
    #[serde(default)]
    pub rate_limits: HashMap<String, RateBudgetConfig>,

    /// Risk/vendor scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Infrastructure clustering configuration
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP source adapter definitions
    #[serde(default)]
    pub sources: Vec<HttpSourceConfig>,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: DOMAIN_SENTRY_)
            .add_source(
                config::Environment::with_prefix("DOMAIN_SENTRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Enrichment pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum concurrent source fetches per subject
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-source fetch timeout (seconds)
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,

    /// Maximum time to wait for a rate-limit slot before skipping the
    /// source (milliseconds, 0 = never wait)
    #[serde(default)]
    pub wait_max_ms: u64,

    /// Merge priority as an ordered list of source names: fields are folded
    /// in list order, so the last listed source wins collisions. Sources not
    /// listed keep registration order and fold before listed ones. An empty
    /// list means registration order is the priority order.
    #[serde(default)]
    pub priority: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            source_timeout_secs: default_source_timeout(),
            wait_max_ms: 0,
            priority: Vec::new(),
        }
    }
}

/// Source cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable caching of source results
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fallback TTL for sources that do not declare one (seconds)
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Rate budget for one source class
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateBudgetConfig {
    /// Calls permitted per window
    pub max_calls: u32,

    /// Window length (seconds)
    pub window_secs: u64,
}

/// Risk/vendor scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Rule weights
    #[serde(default)]
    pub weights: ScoringWeights,

    /// Domains younger than this are treated as a risk indicator (days)
    #[serde(default = "default_young_domain_days")]
    pub young_domain_days: i64,

    /// Risk score at or above which a record is considered a likely vendor
    #[serde(default = "default_vendor_threshold")]
    pub vendor_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            young_domain_days: default_young_domain_days(),
            vendor_threshold: default_vendor_threshold(),
        }
    }
}

/// Point contribution of each scoring rule. Negative values are credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_w_strong_keyword")]
    pub strong_keyword: i32,

    #[serde(default = "default_w_medium_keyword")]
    pub medium_keyword: i32,

    #[serde(default = "default_w_content_keywords")]
    pub content_keywords: i32,

    #[serde(default = "default_w_pricing_indicators")]
    pub pricing_indicators: i32,

    #[serde(default = "default_w_crypto_payment")]
    pub crypto_payment: i32,

    #[serde(default = "default_w_mainstream_payment")]
    pub mainstream_payment: i32,

    #[serde(default = "default_w_offshore_hosting")]
    pub offshore_hosting: i32,

    #[serde(default = "default_w_mainstream_hosting")]
    pub mainstream_hosting: i32,

    #[serde(default = "default_w_privacy_registrar")]
    pub privacy_registrar: i32,

    #[serde(default = "default_w_mainstream_registrar")]
    pub mainstream_registrar: i32,

    #[serde(default = "default_w_young_domain")]
    pub young_domain: i32,

    #[serde(default = "default_w_mention_only")]
    pub mention_only: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            strong_keyword: default_w_strong_keyword(),
            medium_keyword: default_w_medium_keyword(),
            content_keywords: default_w_content_keywords(),
            pricing_indicators: default_w_pricing_indicators(),
            crypto_payment: default_w_crypto_payment(),
            mainstream_payment: default_w_mainstream_payment(),
            offshore_hosting: default_w_offshore_hosting(),
            mainstream_hosting: default_w_mainstream_hosting(),
            privacy_registrar: default_w_privacy_registrar(),
            mainstream_registrar: default_w_mainstream_registrar(),
            young_domain: default_w_young_domain(),
            mention_only: default_w_mention_only(),
        }
    }
}

/// Infrastructure clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Minimum member count for a bucket to become a cluster
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: default_min_cluster_size(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sled,
}

/// Definition of one generic JSON-over-HTTP source adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Source name (unique per deployment)
    pub name: String,

    /// URL template; `{domain}` is replaced with the normalized subject
    pub url: String,

    /// Rate-limit class the source's external origin belongs to
    #[serde(default)]
    pub rate_limit_class: Option<String>,

    /// Whether successful results may be cached
    #[serde(default = "default_true")]
    pub cacheable: bool,

    /// Cache TTL (seconds); falls back to `cache.default_ttl_secs`
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Request timeout (seconds)
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    5
}

fn default_source_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    86_400
}

fn default_young_domain_days() -> i64 {
    180
}

fn default_vendor_threshold() -> u8 {
    40
}

fn default_min_cluster_size() -> usize {
    2
}

fn default_w_strong_keyword() -> i32 {
    25
}

fn default_w_medium_keyword() -> i32 {
    10
}

fn default_w_content_keywords() -> i32 {
    20
}

fn default_w_pricing_indicators() -> i32 {
    15
}

fn default_w_crypto_payment() -> i32 {
    20
}

fn default_w_mainstream_payment() -> i32 {
    -5
}

fn default_w_offshore_hosting() -> i32 {
    20
}

fn default_w_mainstream_hosting() -> i32 {
    -5
}

fn default_w_privacy_registrar() -> i32 {
    15
}

fn default_w_mainstream_registrar() -> i32 {
    -3
}

fn default_w_young_domain() -> i32 {
    15
}

fn default_w_mention_only() -> i32 {
    -30
}
