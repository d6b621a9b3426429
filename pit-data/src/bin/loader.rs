use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pit_data::{HealthBracketLoader, ZusRatesLoader};
use pit_store_sqlite::SqliteStore;

/// Load rate-table data into the tax database.
///
/// The health-bracket CSV has the columns tax_year, min_revenue,
/// max_revenue (empty for the open-ended top bracket) and
/// basis_multiplier. The ZUS CSV has tax_year, standard, reduced_plus and
/// preferential, one row per tax year.
#[derive(Parser, Debug)]
#[command(name = "pit-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL (e.g. sqlite:taxes.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:taxes.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// Path to a CSV file with health-insurance revenue brackets
    #[arg(long)]
    health_csv: Option<PathBuf>,

    /// Path to a CSV file with ZUS plan amounts
    #[arg(long)]
    zus_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let store = SqliteStore::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        store
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        store
            .run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if let Some(path) = &args.health_csv {
        println!("Loading health brackets from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = HealthBracketLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let written = HealthBracketLoader::load(&store, &records)
            .await
            .context("Failed to load health brackets into database")?;

        println!("Successfully loaded {} health brackets.", written);
    }

    if let Some(path) = &args.zus_csv {
        println!("Loading ZUS rates from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = ZusRatesLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let written = ZusRatesLoader::load(&store, &records)
            .await
            .context("Failed to load ZUS rates into database")?;

        println!("Successfully loaded {} ZUS rate rows.", written);
    }

    Ok(())
}
