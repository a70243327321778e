//! Operator CLI for the review engine
//!
//! Runs schema migrations and repair jobs (aggregate recompute, vote counter
//! reconciliation). Prints one JSON object per line for scripting.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use review_engine::common::{BusinessId, ReviewId};
use review_engine::config::Config;
use review_engine::domains::businesses::{recompute_business_aggregates, Business};
use review_engine::domains::reviews::Review;
use review_engine::domains::votes::reconcile_vote_counts;
use review_engine::kernel::ServerDeps;
use serde::Serialize;
use tracing::error;

#[derive(Parser)]
#[command(name = "review_admin")]
#[command(about = "Maintenance CLI for ratings, votes and claims")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Recompute aggregate ratings for one business, or all with --all
    Recompute {
        business_id: Option<BusinessId>,
        #[arg(long, conflicts_with = "business_id")]
        all: bool,
    },

    /// Recount helpfulness votes for one review, or all with --all
    ReconcileVotes {
        review_id: Option<ReviewId>,
        #[arg(long, conflicts_with = "review_id")]
        all: bool,
    },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
}

fn output(resp: Response) {
    match serde_json::to_string(&resp) {
        Ok(line) => println!("{}", line),
        Err(e) => error!(error = %e, "Failed to serialize CLI response"),
    }
}

fn report<T: Serialize>(id: String, result: Result<T, impl std::fmt::Display>) -> bool {
    match result {
        Ok(value) => {
            output(Response {
                success: true,
                id: Some(id),
                message: None,
                result: serde_json::to_value(value).ok(),
            });
            true
        }
        Err(e) => {
            output(Response {
                success: false,
                id: Some(id),
                message: Some(e.to_string()),
                result: None,
            });
            false
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("review_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let (deps, worker) = ServerDeps::from_config(&config).await?;

    let all_ok = match cli.command {
        Commands::Migrate => {
            sqlx::migrate!("./migrations")
                .run(&deps.db_pool)
                .await
                .context("Failed to run migrations")?;
            output(Response {
                success: true,
                id: None,
                message: Some("migrations applied".to_string()),
                result: None,
            });
            true
        }

        Commands::Recompute { business_id, all } => {
            let ids = match (business_id, all) {
                (Some(id), _) => vec![id],
                (None, true) => Business::find_all_ids(&deps.db_pool).await?,
                (None, false) => anyhow::bail!("pass a business id or --all"),
            };
            let mut ok = true;
            for id in ids {
                ok &= report(id.to_string(), recompute_business_aggregates(id, &deps).await);
            }
            ok
        }

        Commands::ReconcileVotes { review_id, all } => {
            let ids = match (review_id, all) {
                (Some(id), _) => vec![id],
                (None, true) => Review::find_all_ids(&deps.db_pool).await?,
                (None, false) => anyhow::bail!("pass a review id or --all"),
            };
            let mut ok = true;
            for id in ids {
                ok &= report(id.to_string(), reconcile_vote_counts(id, &deps).await);
            }
            ok
        }
    };

    // Let queued notifications drain before exiting
    drop(deps);
    let _ = worker.await;

    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}
