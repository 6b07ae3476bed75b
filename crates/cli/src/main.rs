//! Cozy Furniture CLI - Session migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! cozy-cli migrate sessions
//!
//! # Query a catalog fixture
//! cozy-cli catalog query --fixture crates/cli/fixtures/catalog.yaml --sort price-asc
//!
//! # Dump the live CMS catalog
//! cozy-cli catalog fetch
//! ```
//!
//! # Commands
//!
//! - `migrate sessions` - Create the tower-sessions table
//! - `catalog query` - Run a listing query, print the page as JSON
//! - `catalog fetch` - Print the full CMS catalog as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

use commands::catalog::QueryOptions;

#[derive(Parser)]
#[command(name = "cozy-cli")]
#[command(author, version, about = "Cozy Furniture CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store table
    Sessions,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Filter, sort, and paginate products
    Query {
        /// YAML product list to query instead of the CMS
        #[arg(short, long)]
        fixture: Option<PathBuf>,

        #[command(flatten)]
        filters: QueryArgs,
    },
    /// Fetch products and reference data from the CMS
    Fetch,
}

#[derive(Args)]
struct QueryArgs {
    /// Free-text search over name and description
    #[arg(short, long)]
    search: Option<String>,

    /// Category name (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Color name (repeatable)
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Material name (repeatable)
    #[arg(long = "material")]
    materials: Vec<String>,

    #[arg(long)]
    min_price: Option<Decimal>,

    #[arg(long)]
    max_price: Option<Decimal>,

    /// Hide out-of-stock products
    #[arg(long)]
    in_stock: bool,

    /// `featured`, `price-asc`, `price-desc`, `name-asc`, `name-desc`,
    /// `newest`, `bestseller`, or `rating`
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = cozy_furniture_core::catalog::DEFAULT_PER_PAGE)]
    per_page: usize,
}

impl From<QueryArgs> for QueryOptions {
    fn from(args: QueryArgs) -> Self {
        Self {
            search: args.search,
            categories: args.categories,
            colors: args.colors,
            materials: args.materials,
            min_price: args.min_price,
            max_price: args.max_price,
            in_stock: args.in_stock,
            sort: args.sort,
            page: args.page,
            per_page: args.per_page,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Query { fixture, filters } => {
                commands::catalog::query(fixture.as_deref(), &filters.into()).await?;
            }
            CatalogAction::Fetch => commands::catalog::fetch().await?,
        },
    }
    Ok(())
}
