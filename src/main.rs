//! Crypto Clash game bot
//!
//! Runs the Telegram prediction game.

use clap::{Parser, Subcommand};
use crypto_clash_bot::{
    config::Config,
    notify::Notifier,
    oracle::{CoinGeckoClient, PriceOracle},
    profile::ProfileStore,
    round::RoundManager,
    telegram::{BotCommand, ChatContext, CommandHandler, TelegramBot},
    types::Symbol,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crypto-clash-bot")]
#[command(about = "Telegram crypto price prediction game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot until Ctrl-C
    Run,
    /// Fetch one spot price from the oracle
    Price {
        /// Coin ticker, e.g. BTC
        symbol: String,
    },
    /// Print the effective config with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(Config::load(&cli.config)?).await,
        Commands::Price { symbol } => show_price(Config::read(&cli.config)?, &symbol).await,
        Commands::Config => show_config(Config::read(&cli.config)?),
    }
}

async fn run_bot(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Crypto Clash bot");

    let oracle: Arc<dyn PriceOracle> = Arc::new(CoinGeckoClient::new(&config.oracle)?);
    tracing::info!(
        "Price oracle: {} tier, {}s cooldown",
        oracle.tier(),
        config.game.cooldown_secs(oracle.tier())
    );

    // Create command channel
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<(ChatContext, BotCommand)>(100);

    let telegram_bot = Arc::new(TelegramBot::new(&config.telegram, cmd_tx)?);
    let notifier = Notifier::new(telegram_bot.clone());

    let profiles = Arc::new(ProfileStore::new(config.game.clone()));
    let rounds = Arc::new(RoundManager::new(
        config.game.clone(),
        oracle,
        profiles.clone(),
        notifier.clone(),
    ));
    let handler = Arc::new(CommandHandler::new(config.game.clone(), rounds.clone(), profiles.clone()));

    let listener = tokio::spawn(telegram_bot.start_polling());
    tracing::info!("Telegram command listener started");

    loop {
        tokio::select! {
            received = cmd_rx.recv() => {
                let Some((ctx, cmd)) = received else {
                    tracing::warn!("Command channel closed");
                    break;
                };
                let handler = handler.clone();
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    let reply = handler.handle(&ctx, cmd).await;
                    notifier.send(ctx.chat_id, &reply).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    listener.abort();
    let cancelled = rounds.shutdown();
    tracing::info!(
        "Stopped with {} player(s), {} round(s) cancelled",
        profiles.len(),
        cancelled
    );
    Ok(())
}

async fn show_price(config: Config, symbol: &str) -> anyhow::Result<()> {
    let symbol: Symbol = symbol.parse()?;
    let oracle = CoinGeckoClient::new(&config.oracle)?;

    let started = Instant::now();
    let price = oracle.spot_price(symbol).await?;

    println!("\n💰 {} = ${}", symbol, price);
    println!("Tier: {} | {}ms", oracle.tier(), started.elapsed().as_millis());
    Ok(())
}

fn show_config(config: Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    if let Err(e) = config.validate() {
        println!("\n⚠️ {}", e);
    }
    Ok(())
}
