//! CLI for the Initial Balance breakout engine.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ib_breakout::{
    fetch::{DEFAULT_BASE_URL, DEFAULT_SYMBOL},
    generate_recommendations, magnet_levels, report, EngineConfig, ExchangeCalendar, FetchCache,
    MarketDataClient,
};

#[derive(Parser, Debug)]
#[command(name = "ib-breakout")]
#[command(about = "Initial Balance breakout recommendations for ES futures")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch recent bars and print recommendations for the latest trading days
    Recommend {
        /// Massive API key
        #[arg(long, env = "MASSIVE_API_KEY")]
        api_key: String,

        /// Continuous futures symbol
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,

        /// Calendar days of minute data to fetch
        #[arg(short, long, default_value = "8")]
        days: i64,

        /// Trading days to evaluate
        #[arg(short, long, default_value = "5")]
        lookback: usize,

        /// Write the recommendation table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Re-run every N seconds; refreshes inside the cache TTL reuse the
        /// previous fetch instead of hitting the provider again
        #[arg(short, long)]
        watch: Option<u64>,
    },

    /// Print the magnet-level ladder around a price
    Magnets {
        /// Reference price
        #[arg(short, long)]
        price: f64,
    },

    /// Fetch recent bars and dump them to CSV
    Fetch {
        /// Massive API key
        #[arg(long, env = "MASSIVE_API_KEY")]
        api_key: String,

        /// Continuous futures symbol
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,

        /// Calendar days of minute data to fetch
        #[arg(short, long, default_value = "8")]
        days: i64,

        /// Output CSV path
        #[arg(short, long, default_value = "bars.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Commands::Recommend {
            api_key,
            symbol,
            days,
            lookback,
            output,
            watch,
        } => run_recommend(api_key, symbol, days, lookback, output, watch).await,
        Commands::Magnets { price } => run_magnets(price),
        Commands::Fetch {
            api_key,
            symbol,
            days,
            output,
        } => run_fetch(api_key, symbol, days, output).await,
    }
}

async fn run_recommend(
    api_key: String,
    symbol: String,
    days: i64,
    lookback: usize,
    output: Option<PathBuf>,
    watch: Option<u64>,
) -> Result<()> {
    let calendar = ExchangeCalendar::default();
    let client = MarketDataClient::new(api_key, DEFAULT_BASE_URL.to_string());
    let config = EngineConfig {
        lookback_days: lookback,
        ..Default::default()
    };
    let mut cache = FetchCache::default();

    loop {
        let series = cache
            .get_or_fetch(&symbol, || client.fetch_minute_bars(&symbol, days, &calendar))
            .await?;

        let recommendations = generate_recommendations(&series, &calendar, &config);
        info!(
            "Generated {} recommendations from {} bars",
            recommendations.len(),
            series.len()
        );

        report::print_report(&recommendations);

        if let Some(path) = &output {
            report::write_recommendations_csv(&recommendations, path)?;
        }

        match watch {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => break,
        }
    }

    Ok(())
}

fn run_magnets(price: f64) -> Result<()> {
    let levels = magnet_levels(price);
    println!("Magnet levels around {:.2}:", price);
    for level in levels {
        let marker = if level == levels[2] { "  <- nearest" } else { "" };
        println!("  {:>10.2}{}", level, marker);
    }
    Ok(())
}

async fn run_fetch(api_key: String, symbol: String, days: i64, output: PathBuf) -> Result<()> {
    let calendar = ExchangeCalendar::default();
    let client = MarketDataClient::new(api_key, DEFAULT_BASE_URL.to_string());

    let series = client.fetch_minute_bars(&symbol, days, &calendar).await?;
    if series.is_empty() {
        info!("No bars returned; nothing to write");
        return Ok(());
    }

    report::write_bars_csv(&series, &output)?;
    Ok(())
}
