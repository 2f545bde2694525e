//! Rates CLI
//!
//! Command-line interface for the currency rates API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use rates_client::RatesClient;
use rates_types::{Pair, PairInput, RatesResponse};

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Currency rates API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Rates API
    #[arg(long, env = "RATES_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Print one `PAIR RATE` line per result instead of JSON
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch rates through the query-string endpoint
    Get {
        /// Pairs as BASE:QUOTE, e.g. USD:EUR. None means the server defaults.
        #[arg(value_parser = parse_pair)]
        pairs: Vec<Pair>,
    },
    /// Submit pairs through the JSON endpoint; the server validates them
    Post {
        /// Pairs as BASE:QUOTE
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Check API health
    Health,
}

fn parse_pair(s: &str) -> Result<Pair, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn to_input(raw: &str) -> PairInput {
    let (base, quote) = raw.split_once(':').unwrap_or((raw, ""));
    PairInput {
        base: base.to_string(),
        quote: quote.to_string(),
    }
}

fn print_rates(rates: &RatesResponse, plain: bool) -> Result<()> {
    if plain {
        for rate in &rates.data {
            println!("{} {}", rate.pair, rate.rate);
        }
        for failure in &rates.failures {
            eprintln!("✗ {}: {}", failure.base, failure.error);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(rates)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = RatesClient::new(&cli.api_url);

    let rates = match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!(
                "✓ API is healthy (cache {})",
                if health.cache { "up" } else { "unavailable" }
            );
            return Ok(());
        }
        Commands::Get { pairs } => client.get_rates(&pairs).await?,
        Commands::Post { pairs } => {
            let inputs = pairs.iter().map(|p| to_input(p)).collect();
            client.post_rates(inputs).await?
        }
    };

    print_rates(&rates, cli.plain)?;
    if rates.data.is_empty() && !rates.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
