mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobs::matches::run_create_matches;
use jobs::points::{run_calc_codelink_rank_in_domain, run_calc_point};
use jobs::ranking::list_codelink_ranking;
use jobs::rescore::run_rescore;
use jobs::scoreboard::{ScoreboardRequest, build_scoreboard};
use jobs::store::PgStore;
use jobs::{CancelFlag, JobContext, TracingReporter};
use scoring::CodelinkRule;
use std::path::PathBuf;
use std::sync::Arc;
use storage::Database;
use storage::dto::matches::CreateMatchesRequest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "codelink")]
#[command(about = "Codelink contest scoring and domain ranking jobs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Recompute points and codelink ranks of one domain, or all domains
    CalcPoint {
        #[arg(long)]
        domain: Option<String>,
    },
    /// Recompute codelink ranks from stored points
    CodelinkRank {
        #[arg(long)]
        domain: String,
    },
    /// Recompute and store the standings of one contest
    Rescore {
        #[arg(long)]
        domain: String,

        #[arg(long)]
        contest: Uuid,
    },
    /// Print a contest scoreboard as JSON, or as CSV with --export
    Scoreboard {
        #[arg(long)]
        domain: String,

        #[arg(long)]
        contest: Uuid,

        #[arg(long)]
        export: bool,

        #[arg(long)]
        show_display_name: bool,

        /// Show the board participants see while it is locked
        #[arg(long)]
        frozen: bool,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print one page of the domain's codelink ranking
    Ranking {
        #[arg(long)]
        domain: String,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create rated matches for a group from a template contest
    CreateMatches {
        #[arg(long)]
        domain: String,

        #[arg(long)]
        group: String,

        #[arg(long)]
        template: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "codelink={0},jobs={0},scoring={0},storage={0}",
                log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::settings_from_env()?;

    tracing::info!("Connecting to database...");
    let database = Database::new(&cli.database_url)
        .await
        .context("Failed to connect to the database")?;

    if let Commands::Migrate = cli.command {
        database.run_migrations().await.context("Failed to run migrations")?;
        tracing::info!("✓ Migrations applied");
        return Ok(());
    }

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping at the next checkpoint");
            on_signal.cancel();
        }
    });

    let store = Arc::new(PgStore::new(database.pool().clone()));
    let ctx = JobContext::new(store, Arc::new(TracingReporter))
        .with_settings(settings)
        .with_cancel(cancel);
    let rule = CodelinkRule::default();

    match cli.command {
        Commands::Migrate => {}
        Commands::CalcPoint { domain } => {
            run_calc_point(&ctx, domain.as_deref()).await?;
            tracing::info!("✓ Points calculated");
        }
        Commands::CodelinkRank { domain } => {
            run_calc_codelink_rank_in_domain(&ctx, &domain).await?;
            tracing::info!("✓ Codelink ranks calculated for {}", domain);
        }
        Commands::Rescore { domain, contest } => {
            let summary = run_rescore(&ctx, &rule, &domain, contest).await?;
            tracing::info!(
                "✓ Rescored {} participants ({} written)",
                summary.participants,
                summary.written
            );
        }
        Commands::Scoreboard {
            domain,
            contest,
            export,
            show_display_name,
            frozen,
            output,
        } => {
            let request = ScoreboardRequest {
                domain_id: domain,
                contest_id: contest,
                is_export: export,
                show_display_name,
                frozen,
            };
            let board = build_scoreboard(&ctx, &rule, &request).await?;

            let mut rendered = Vec::new();
            if export {
                board.write_csv(&mut rendered)?;
            } else {
                serde_json::to_writer_pretty(&mut rendered, &board)?;
            }
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Scoreboard written to: {}", path.display());
                }
                None => println!("{}", String::from_utf8_lossy(&rendered)),
            }
        }
        Commands::Ranking { domain, page } => {
            let ranking = list_codelink_ranking(&ctx, &domain, page).await?;
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        }
        Commands::CreateMatches {
            domain,
            group,
            template,
        } => {
            let request = CreateMatchesRequest {
                domain_id: domain,
                group_name: group,
                template_tid: template,
            };
            let created = run_create_matches(&ctx, &request).await?;
            tracing::info!("✓ Created {} matches", created.len());
        }
    }

    Ok(())
}
