use ccbot::api::{PriceFeed, ZaifClient};
use ccbot::backtest::{Optimizer, OptimizerConfig};
use ccbot::live::{LiveConfig, LiveTrader};
use ccbot::notify::IftttNotifier;
use ccbot::persistence::file_store::default_data_dir;
use ccbot::persistence::{JsonParamStore, ParamStore, PriceStore, RedisStore};
use ccbot::models::PairInfo;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::time::Duration;

#[derive(Parser)]
#[command(name = "ccbot", about = "Moving-average crossover trading bot")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch live prices and trade every active pair
    Watch {
        /// Quote currency to trade against
        #[arg(long, default_value = "jpy")]
        quote: String,
        /// Seconds between ticks
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Replay stored history against candidate parameters and persist the
    /// ranking
    Optimize {
        /// Optimize a single pair instead of every active one
        #[arg(long)]
        pair: Option<String>,
        #[arg(long, default_value = "jpy")]
        quote: String,
        /// Candidates per round
        #[arg(long, default_value_t = 10)]
        population: usize,
        /// Seconds between rounds
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Print the latest stored quote and top-ranked parameters per pair
    Stat {
        #[arg(long, default_value = "jpy")]
        quote: String,
    },
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ccbot=info")),
        )
        .init();
}

/// Active pairs quoted in `quote`, or just the named one.
async fn discover_pairs(
    feed: &ZaifClient,
    quote: &str,
    only: Option<&str>,
) -> anyhow::Result<Vec<PairInfo>> {
    let pairs: Vec<PairInfo> = feed
        .currency_pairs()
        .await?
        .into_iter()
        .filter(|p| {
            p.is_active()
                && match only {
                    Some(name) => p.currency_pair == name,
                    None => p.is_quoted_in(quote),
                }
        })
        .collect();
    anyhow::ensure!(!pairs.is_empty(), "no matching active pairs found");
    Ok(pairs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    match cli.command {
        Command::Watch {
            quote,
            interval_secs,
        } => {
            let feed = ZaifClient::new();
            let pairs = discover_pairs(&feed, &quote, None).await?;
            tracing::info!("watching {} pairs quoted in {}", pairs.len(), quote);

            let price_store = RedisStore::new(&redis_url).await?;
            let notifier = std::env::var("IFTTT_KEY").ok().map(IftttNotifier::new);

            let mut tasks = Vec::new();
            for pair in pairs {
                tracing::info!("  - {}", pair.currency_pair);
                let trader = LiveTrader::new(
                    pair,
                    feed.clone(),
                    price_store.clone(),
                    JsonParamStore::new(default_data_dir()),
                    notifier.clone(),
                    LiveConfig::default(),
                );
                tasks.push(tokio::spawn(
                    trader.run(Duration::from_secs(interval_secs)),
                ));
            }
            for task in tasks {
                task.await?;
            }
        }

        Command::Optimize {
            pair,
            quote,
            population,
            interval_secs,
        } => {
            let feed = ZaifClient::new();
            let pairs = discover_pairs(&feed, &quote, pair.as_deref()).await?;
            tracing::info!("optimizing {} pairs", pairs.len());

            let price_store = RedisStore::new(&redis_url).await?;

            let mut tasks = Vec::new();
            for pair in pairs {
                let config = OptimizerConfig {
                    population_size: population,
                    ..OptimizerConfig::default()
                };
                let optimizer = Optimizer::new(
                    pair,
                    price_store.clone(),
                    JsonParamStore::new(default_data_dir()),
                    config,
                );
                tasks.push(tokio::spawn(
                    optimizer.run(Duration::from_secs(interval_secs)),
                ));
            }
            for task in tasks {
                task.await?;
            }
        }

        Command::Stat { quote } => {
            let feed = ZaifClient::new();
            let pairs = discover_pairs(&feed, &quote, None).await?;
            let mut price_store = RedisStore::new(&redis_url).await?;
            let mut param_store = JsonParamStore::new(default_data_dir());

            for pair in pairs {
                let name = &pair.currency_pair;
                let points = price_store
                    .fetch_since(name, DateTime::<Utc>::UNIX_EPOCH, 1000)
                    .await?;
                match points.first() {
                    Some(latest) => println!(
                        "{}\task={} bid={}\t{} records",
                        name,
                        latest.ask,
                        latest.bid,
                        points.len()
                    ),
                    None => println!("{}\tno records", name),
                }

                let ranked = param_store.find_ranked(name).await?;
                for (rank, entry) in ranked.iter().take(2).enumerate() {
                    println!(
                        "{}\tparam#{} {}\tprofit:{}",
                        name,
                        rank + 1,
                        serde_json::to_string(&entry.param)?,
                        entry.profit
                    );
                }
            }
        }
    }

    Ok(())
}
