use clap::{Parser, Subcommand};
use domain_sentry::config::Config;
use domain_sentry::{
    create_store, ClusteringEngine, EnrichmentPipeline, HttpApiSource, RateLimiter, SourceCache,
};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "domain-sentry", version, about = "Domain enrichment, risk scoring, and infrastructure clustering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich one or more domains and print the records
    Enrich {
        /// Domains to enrich
        #[arg(required = true)]
        domains: Vec<String>,

        /// Save enriched records to the configured store
        #[arg(long)]
        save: bool,
    },

    /// Cluster stored records by shared infrastructure
    Cluster {
        /// Override the configured minimum cluster size
        #[arg(long)]
        min_size: Option<usize>,

        /// Include the low-confidence unknown-infrastructure cluster
        #[arg(long)]
        include_low_confidence: bool,
    },

    /// Show declared rate budgets and remaining quota
    Budgets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domain_sentry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    let cli = Cli::parse();
    match cli.command {
        Command::Enrich { domains, save } => enrich(&config, domains, save).await,
        Command::Cluster {
            min_size,
            include_low_confidence,
        } => cluster(&config, min_size, include_low_confidence).await,
        Command::Budgets => budgets(&config),
    }
}

fn build_pipeline(config: &Config, limiter: Arc<RateLimiter>) -> anyhow::Result<EnrichmentPipeline> {
    let cache = Arc::new(SourceCache::new(config.cache.enabled));
    let mut pipeline = EnrichmentPipeline::new(
        cache,
        limiter,
        config.pipeline.clone(),
        config.cache.clone(),
        config.scoring.clone(),
    );

    for source_config in &config.sources {
        pipeline.register_source(Arc::new(HttpApiSource::from_config(source_config)?));
    }
    pipeline.sort_by_declared_priority();

    Ok(pipeline)
}

async fn enrich(config: &Config, domains: Vec<String>, save: bool) -> anyhow::Result<()> {
    let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
    let pipeline = build_pipeline(config, limiter)?;
    let store = if save {
        Some(create_store(&config.store).await?)
    } else {
        None
    };

    for domain in domains {
        match pipeline.enrich(&domain).await {
            Ok(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
                if let Some(store) = &store {
                    store.save(&record).await?;
                }
            }
            Err(e) => eprintln!("{}: {}", domain, e),
        }
    }
    Ok(())
}

async fn cluster(
    config: &Config,
    min_size: Option<usize>,
    include_low_confidence: bool,
) -> anyhow::Result<()> {
    let store = create_store(&config.store).await?;
    let records = store.load_all().await?;
    tracing::info!(records = records.len(), "Loaded record snapshot");

    let engine = ClusteringEngine::new(config.clustering.clone());
    let min_size = min_size.unwrap_or(config.clustering.min_cluster_size);
    let clusters: Vec<_> = engine
        .cluster_with_min_size(&records, min_size)
        .into_iter()
        .filter(|c| include_low_confidence || !c.low_confidence)
        .collect();

    println!("{}", serde_json::to_string_pretty(&clusters)?);
    Ok(())
}

fn budgets(config: &Config) -> anyhow::Result<()> {
    let limiter = RateLimiter::new(config.rate_limits.clone());

    let mut rows: Vec<_> = limiter
        .budgets()
        .map(|(class, budget)| {
            json!({
                "class": class,
                "max_calls": budget.max_calls,
                "window_secs": budget.window.as_secs(),
                "remaining": limiter.remaining(class),
            })
        })
        .collect();
    rows.sort_by_key(|row| row["class"].as_str().map(str::to_string));

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
