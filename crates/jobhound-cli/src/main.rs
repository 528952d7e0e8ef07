use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobhound_client::{ReqwestFetcher, build_sources};
use jobhound_core::config::ScrapeConfig;
use jobhound_core::export::write_applied_csv;
use jobhound_core::mock::{DEFAULT_MOCK_COUNT, MAX_MOCK_COUNT, generate_mock};
use jobhound_core::models::{JobBoard, JobSearch};
use jobhound_core::scrape::ScrapeOrchestrator;
use jobhound_core::trigger::{ScrapeTrigger, spawn_mock};
use jobhound_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "jobhound", version, about = "Job-board scraper with deduplicated storage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the configured job boards
    Scrape {
        /// Boards to scrape (overrides JOBHOUND_SOURCES), e.g. "dice,indeed"
        #[arg(short, long, value_delimiter = ',')]
        source: Vec<JobBoard>,

        /// JSON file of selector sets overriding the built-in presets
        #[arg(long, env = "JOBHOUND_SELECTORS_FILE")]
        selectors: Option<PathBuf>,

        /// Overall deadline in seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Reconcile against and save to the database (requires DATABASE_URL)
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Allow fetching from loopback and private network addresses
        #[arg(long, default_value_t = false)]
        allow_private: bool,
    },

    /// Generate synthetic job records
    Mock {
        /// Number of records to generate
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_MOCK_COUNT,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(0..=MAX_MOCK_COUNT as u64)
        )]
        count: usize,

        /// Save to the database instead of printing (requires DATABASE_URL)
        #[arg(long, default_value_t = false)]
        save: bool,
    },

    /// Search stored jobs
    Search {
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long)]
        company: Option<String>,
    },

    /// Export a user's applied jobs as CSV
    Export {
        /// Owner of the saved jobs
        #[arg(short, long, env = "JOBHOUND_USER")]
        user: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobhound=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            source,
            selectors,
            deadline,
            save,
            allow_private,
        } => {
            let mut config = ScrapeConfig::from_env()?;
            if !source.is_empty() {
                config.sources = source;
            }
            if selectors.is_some() {
                config.selectors_file = selectors;
            }
            if let Some(secs) = deadline {
                anyhow::ensure!(secs > 0, "--deadline must be at least 1 second");
                config.overall_deadline = Duration::from_secs(secs);
            }
            cmd_scrape(&config, save, allow_private).await?;
        }
        Commands::Mock { count, save } => cmd_mock(count, save).await?,
        Commands::Search {
            keyword,
            location,
            company,
        } => {
            let db = connect_db().await?;
            let search = JobSearch {
                keyword,
                location,
                company,
            };
            let jobs = db.jobs().search(&search).await?;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Commands::Export { user, output } => {
            let db = connect_db().await?;
            cmd_export(&db, &user, output).await?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL and apply migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_scrape(config: &ScrapeConfig, save: bool, allow_private: bool) -> Result<()> {
    let mut fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
    if allow_private {
        fetcher = fetcher.allow_private_urls();
    }
    let sources = build_sources(config)?;
    let orchestrator = ScrapeOrchestrator::new(fetcher, sources);

    if save {
        let db = connect_db().await?;
        let trigger = ScrapeTrigger::new(orchestrator, db.jobs(), config.trigger_config());
        let outcome = trigger.run_batch().await;
        println!("{outcome}");
        return Ok(());
    }

    let outcome = orchestrator
        .scrape_all(config.per_source_timeout, config.overall_deadline)
        .await;

    for (label, error) in &outcome.per_source_errors {
        tracing::warn!(source = %label, %error, "Source failed");
    }
    if outcome.timed_out {
        tracing::warn!(pending = ?outcome.pending_sources, "Deadline reached before all sources finished");
    }
    tracing::info!(records = outcome.records.len(), "Scrape complete");

    println!("{}", serde_json::to_string_pretty(&outcome.records)?);
    Ok(())
}

async fn cmd_mock(count: usize, save: bool) -> Result<()> {
    if !save {
        println!("{}", serde_json::to_string_pretty(&generate_mock(count))?);
        return Ok(());
    }

    let db = connect_db().await?;
    let summary = spawn_mock(db.jobs(), count)?.wait().await?;
    println!(
        "Mock scraping completed! Saved {} new jobs, skipped {} duplicates.",
        summary.saved, summary.duplicates
    );
    Ok(())
}

async fn cmd_export(db: &Database, user: &str, output: Option<PathBuf>) -> Result<()> {
    let applied = db.saved_jobs().applied(user).await?;

    let written = match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let rows = write_applied_csv(&applied, file)?;
            tracing::info!(rows, path = %path.display(), "Exported applied jobs");
            rows
        }
        None => write_applied_csv(&applied, std::io::stdout().lock())?,
    };

    if written == 0 {
        tracing::info!(%user, "No applied jobs to export");
    }
    Ok(())
}
