use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use goals_dao::JsonGoalsRepository;
use goals_models::CustomerClass;
use goals_queries::GoalsQuery;
use goals_query_handlers::{GoalsConfig, GoalsQueryHandler};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "goals-report")]
#[command(about = "Print a seller's customer-goals view built from a fixture dataset")]
struct Cli {
    /// JSON dataset with static, periodic and live fragments per seller-year
    #[arg(short, long, default_value = "binaries/goals-report/fixtures/sample.json")]
    dataset: PathBuf,

    /// JSON config file (tier TTLs, cache bounds, policy, failure policy)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seller: String,

    #[arg(long)]
    year: i32,

    /// Sub-period month (default: derived from today's date)
    #[arg(long)]
    month: Option<u32>,

    /// Restrict to one customer class (A, B, C or INACTIVE)
    #[arg(long)]
    class: Option<CustomerClass>,

    /// attention, gap, target or achievement
    #[arg(long)]
    order_by: Option<String>,

    /// Run the query this many times against the same caches
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

async fn load_config(path: Option<&Path>) -> Result<GoalsConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => GoalsConfig::default(),
    };
    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

impl Cli {
    fn query(&self) -> GoalsQuery {
        GoalsQuery {
            seller_id: self.seller.clone(),
            year: self.year,
            month: self.month,
            classification: self.class,
            order_by: self.order_by.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;
    let repository = JsonGoalsRepository::from_path(&cli.dataset)
        .await
        .with_context(|| format!("loading {}", cli.dataset.display()))?;
    info!(dataset = %cli.dataset.display(), "dataset loaded");

    let handler = GoalsQueryHandler::new(Arc::new(repository), &config)?;
    let sweepers = handler.spawn_sweepers();

    let mut last = None;
    for run in 1..=cli.repeat.max(1) {
        let response = handler.execute(cli.query()).await?;
        info!(
            run,
            static_hit = response.cache.static_hit,
            periodic_hit = response.cache.periodic_hit,
            live_hit = response.cache.live_hit,
            degraded = response.cache.degraded,
            query_time_ms = response.cache.query_time_ms,
            "query served"
        );
        last = Some(response);
    }

    for (tier, stats) in handler.cache_stats() {
        info!(
            %tier,
            hits = stats.hits,
            misses = stats.misses,
            computes = stats.computes,
            "cache stats"
        );
    }
    for sweeper in sweepers {
        sweeper.abort();
    }

    if let Some(response) = last {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}
