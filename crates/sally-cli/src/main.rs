mod export;
mod seeds;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use sally_client::{GraphProfileClient, ReqwestFetcher};
use sally_core::crawl::DEFAULT_CONCURRENCY;
use sally_core::profile::DEFAULT_PROFILE_DELAY;
use sally_core::{
    BatchReport, CrawlService, CrawlTarget, NullStore, ProfileService, ScoringConfig,
    TracingBatchReporter, UrlFilter,
};
use sally_db::{Database, DatabaseConfig, LeadRepository};

#[derive(Parser)]
#[command(name = "sally", version, about = "Lead crawler: web pages and social profiles to scored leads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl seed domains and score each site as a lead
    Crawl {
        #[command(flatten)]
        batch: BatchArgs,

        /// Maximum number of sites fetched at once
        #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },

    /// Look up social page profiles linked in the seed file
    Profiles {
        #[command(flatten)]
        batch: BatchArgs,

        /// Graph API access token
        #[arg(short, long, env = "SALLY_GRAPH_TOKEN", hide_env_values = true)]
        token: String,

        /// Graph API base URL
        #[arg(long, env = "SALLY_GRAPH_URL", default_value = "https://graph.facebook.com")]
        graph_url: String,

        /// Seconds to wait between profile lookups
        #[arg(long, default_value_t = DEFAULT_PROFILE_DELAY.as_secs())]
        delay_secs: u64,
    },

    /// Show saved leads, newest first
    History {
        /// Only leads for this website
        #[arg(short, long)]
        website: Option<String>,

        /// Number of results to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// File with one seed (domain, URL, or profile link) per line
    #[arg(short, long)]
    seeds: PathBuf,

    /// JSON settings file with weights and domain lists
    #[arg(short, long, env = "SALLY_CONFIG", default_value = "settings.json")]
    config: PathBuf,

    /// Write CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save leads to the database (requires DATABASE_URL)
    #[arg(long, default_value_t = false)]
    save: bool,

    /// Move the seed file here once every seed was processed
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl BatchArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sally=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl { batch, concurrency } => cmd_crawl(&batch, concurrency).await,
        Commands::Profiles {
            batch,
            token,
            graph_url,
            delay_secs,
        } => cmd_profiles(&batch, &token, &graph_url, Duration::from_secs(delay_secs)).await,
        Commands::History { website, limit } => {
            let repo = connect_db().await?;
            cmd_history(website.as_deref(), limit, &repo).await
        }
    }
}

/// Connect to PostgreSQL using DATABASE_URL and apply migrations.
async fn connect_db() -> Result<LeadRepository> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db.lead_repo())
}

fn load_config(path: &Path) -> Result<Arc<ScoringConfig>> {
    let config = ScoringConfig::from_file(path)?;
    tracing::info!(
        path = %path.display(),
        allowed = config.allowed_domains.len(),
        disallowed = config.disallowed_domains.len(),
        keywords = config.allowed_keywords.len(),
        "Settings loaded"
    );
    Ok(Arc::new(config))
}

/// Token cancelled on Ctrl+C. In-flight items finish; nothing new starts.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            on_signal.cancel();
        }
    });
    token
}

async fn cmd_crawl(batch: &BatchArgs, concurrency: usize) -> Result<()> {
    // Settings errors must surface before any fetch.
    let config = load_config(&batch.config)?;
    let seeds = seeds::read_seed_lines(&batch.seeds)?;

    let targets: Vec<CrawlTarget> = UrlFilter::from_config(&config)?
        .filter(&seeds)
        .into_iter()
        .collect();
    tracing::info!(seeds = seeds.len(), targets = targets.len(), "Seeds filtered");

    let fetcher =
        ReqwestFetcher::with_timeout(batch.timeout()).context("Failed to create HTTP client")?;
    let cancel = shutdown_token();
    let reporter = TracingBatchReporter;

    let report = if batch.save {
        let repo = connect_db().await?;
        CrawlService::with_store(fetcher, repo, config)?
            .run_batch(&targets, concurrency, &cancel, &reporter)
            .await
    } else {
        CrawlService::<_, NullStore>::new(fetcher, config)?
            .run_batch(&targets, concurrency, &cancel, &reporter)
            .await
    };

    finish(batch, &report)
}

async fn cmd_profiles(
    batch: &BatchArgs,
    token: &str,
    graph_url: &str,
    delay: Duration,
) -> Result<()> {
    let config = load_config(&batch.config)?;
    let lines = seeds::read_seed_lines(&batch.seeds)?;

    let client =
        GraphProfileClient::with_base_url(token, graph_url)?.with_timeout(batch.timeout())?;
    let cancel = shutdown_token();
    let reporter = TracingBatchReporter;

    let report = if batch.save {
        let repo = connect_db().await?;
        ProfileService::with_store(client, repo, &config)
            .with_delay(delay)
            .run_batch(&lines, &cancel, &reporter)
            .await
    } else {
        ProfileService::<_, NullStore>::new(client, &config)
            .with_delay(delay)
            .run_batch(&lines, &cancel, &reporter)
            .await
    };

    finish(batch, &report)
}

/// Export the batch and archive the seed file if the batch ran to the end.
fn finish(batch: &BatchArgs, report: &BatchReport) -> Result<()> {
    export::export_leads(batch.output.as_deref(), &report.records)?;

    for failure in &report.failures {
        tracing::debug!(item = %failure.item, error = %failure.error, "No lead");
    }

    match &batch.archive_dir {
        Some(_) if report.was_cancelled() => {
            tracing::warn!(
                pending = report.pending,
                seeds = %batch.seeds.display(),
                "Batch cancelled, seed file left in place"
            );
        }
        Some(dir) => {
            let archived = seeds::archive_seed_file(&batch.seeds, dir)?;
            tracing::info!(path = %archived.display(), "Seed file archived");
        }
        None => {}
    }

    Ok(())
}

async fn cmd_history(website: Option<&str>, limit: usize, repo: &LeadRepository) -> Result<()> {
    let leads = match website {
        Some(website) => repo.history(website, limit).await?,
        None => repo.recent(limit).await?,
    };

    if leads.is_empty() {
        match website {
            Some(website) => println!("No leads found for {website}"),
            None => println!("No leads saved yet"),
        }
        return Ok(());
    }

    match website {
        Some(website) => println!("Lead history for {website}:\n"),
        None => println!("Most recent leads:\n"),
    }

    for lead in &leads {
        let record = &lead.record;
        println!(
            "  [{}] score {} | {} | {} ({}, crawled {})",
            lead.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            record.score,
            record.website.as_deref().unwrap_or("-"),
            record.name.as_deref().unwrap_or("-"),
            record.source,
            record.crawl_date.format("%Y-%m-%d"),
        );
        if let Some(page) = &record.page {
            println!(
                "      platform {} | cart {} | payment links {} | social links {}",
                page.platform,
                if page.cart_markers.is_empty() { "no" } else { "yes" },
                page.payment_links.len(),
                page.social_links.len(),
            );
        }
    }

    println!("\nTotal: {} leads", leads.len());

    Ok(())
}
