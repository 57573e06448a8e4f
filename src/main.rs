use std::num::NonZeroU32;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table as ComfyTable;
use database::{ConnectionProvider, LenientRepository, SalesRepository, Table};

/// The main entry point for the sales insights CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, when there is one.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    configuration::init_tracing("info");

    // Parse command-line arguments
    let cli = Cli::parse();

    let provider = Arc::new(ConnectionProvider::from_env());
    let repo = SalesRepository::connect(provider);

    let table = if cli.lenient {
        run_lenient(cli.command, LenientRepository::new(repo)).await
    } else {
        run_strict(cli.command, repo).await?
    };

    print_table(&table, cli.format)?;
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Analytical reports over the sales database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// How to print the result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Print an empty result instead of failing when a query errors.
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transactions and revenue per country.
    ByCountry,
    /// The best-selling products of each category.
    TopProducts {
        /// How many products to show per category.
        #[arg(long, default_value_t = database::DEFAULT_TOP_PRODUCTS_LIMIT)]
        limit: NonZeroU32,
    },
    /// Month-over-month revenue growth.
    MonthlyGrowth,
    /// The activity report of a single customer.
    CustomerReport {
        /// The customer's ID.
        #[arg(long)]
        id: i32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run_strict(command: Commands, repo: SalesRepository) -> anyhow::Result<Table> {
    let table = match command {
        Commands::ByCountry => repo.sales_summary_by_country().await?,
        Commands::TopProducts { limit } => repo.top_products_per_category(limit).await?,
        Commands::MonthlyGrowth => repo.monthly_sales_growth().await?,
        Commands::CustomerReport { id } => repo.customer_report(id).await?,
    };
    Ok(table)
}

async fn run_lenient(command: Commands, repo: LenientRepository) -> Table {
    match command {
        Commands::ByCountry => repo.sales_summary_by_country().await,
        Commands::TopProducts { limit } => repo.top_products_per_category(limit).await,
        Commands::MonthlyGrowth => repo.monthly_sales_growth().await,
        Commands::CustomerReport { id } => repo.customer_report(id).await,
    }
}

fn print_table(table: &Table, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputFormat::Table => {
            if table.is_empty() {
                println!("(no rows)");
                return Ok(());
            }
            let mut output = ComfyTable::new();
            output.set_header(table.columns());
            for row in table.rows() {
                output.add_row(row.iter().map(ToString::to_string));
            }
            println!("{output}");
        }
    }
    Ok(())
}
