#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use anyhow::{anyhow, Context};
use bills_model::{BillPage, FavoriteBill, Language};
use clap::{Parser, Subcommand};
use oireachtas_bills::{config::Config, favorites::MutationOutcome, BillsApp};
use tracing_subscriber::EnvFilter;

/// Browse Irish legislation and keep a local list of favorite bills.
#[derive(Debug, Parser)]
#[command(name = "bills", version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show one page of bills, optionally filtered by bill type.
    Browse {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Exact bill type, e.g. "Public". Filters the fetched page only.
        #[arg(long, default_value = "")]
        bill_type: String,
    },
    /// List the bill types accepted by --bill-type, including any seen on a page.
    Types {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// List favorite bills.
    Favorites,
    /// Favorite a bill from the given page.
    Favorite {
        id: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// Remove a bill from favorites.
    Unfavorite { id: String },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&cli.config).map_err(|e| anyhow!("{e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "bills starting up");

    let app = BillsApp::from_config(&config).context("failed to set up the bills client")?;
    let default_limit = config.api.default_limit;

    match cli.command {
        Command::Browse {
            limit,
            skip,
            bill_type,
        } => {
            let limit = limit.unwrap_or(default_limit);
            let page = app.fetch_filtered(limit, skip, &bill_type).await?;
            print_page(&app, &page, limit, skip);
        }
        Command::Types { limit, skip } => {
            let page = app
                .fetch_bill_page(limit.unwrap_or(default_limit), skip)
                .await?;
            for option in BillsApp::bill_type_choices(&page) {
                let value = if option.value.is_empty() {
                    "(empty)"
                } else {
                    option.value
                };
                println!("{value:<10} {}", option.label);
            }
        }
        Command::Favorites => {
            let favorites = app.favorites();
            println!("Favorites ({})", favorites.len());
            for favorite in favorites {
                println!(
                    "  {:<14} {:<6} {:<8} {:<12} {}",
                    favorite.id,
                    favorite.bill_no,
                    favorite.bill_type,
                    favorite.status,
                    favorite.english_title
                );
            }
        }
        Command::Favorite { id, limit, skip } => {
            let page = app
                .fetch_bill_page(limit.unwrap_or(default_limit), skip)
                .await?;
            let bill = page
                .find(&id)
                .ok_or_else(|| anyhow!("bill {id} is not on this page; check --limit and --skip"))?;
            let outcome = app.add_favorite(FavoriteBill::from(bill)).await;
            report(&outcome, &format!("Added {} to favorites", bill.bill_no));
        }
        Command::Unfavorite { id } => {
            if !app.is_favorite(&id) {
                println!("{id} is not a favorite");
                return Ok(());
            }
            let outcome = app.remove_favorite(&id).await;
            report(&outcome, &format!("Removed {id} from favorites"));
        }
    }

    Ok(())
}

fn print_page(app: &BillsApp, page: &BillPage, limit: u32, skip: u32) {
    let total = page.head.result_count;
    let page_number = skip / limit + 1;
    let page_count = total.div_ceil(u64::from(limit)).max(1);

    println!(
        "Page {page_number} of {page_count} ({total} bills, {} shown)",
        page.results.len()
    );
    for bill in &page.results {
        let marker = if app.is_favorite(&bill.id) { '*' } else { ' ' };
        println!(
            "{marker} {:<14} {:<6} {:<8} {:<12} {:<24} {}",
            bill.id,
            bill.bill_no,
            bill.bill_type,
            bill.status,
            bill.sponsor_or_unknown(),
            bill.title(Language::English)
        );
    }
}

fn report(outcome: &MutationOutcome, success: &str) {
    match outcome {
        MutationOutcome::Committed => println!("{success}"),
        MutationOutcome::RolledBack(notice) => println!("warning: {}", notice.message),
        MutationOutcome::Interrupted => println!("warning: confirmation did not finish"),
    }
}
