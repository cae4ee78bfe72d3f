//! Dashboard CLI - a headless consumer of the synchronization layer.
//!
//! Commands:
//! - `watch` (default) - subscribe to the live resources and print every change
//! - `snapshot` - fetch every resource once and print a summary
//! - `reset`, `toggle-bot`, `enable`, `disable`, `bot-update` - run one mutation

use clap::{Parser, Subcommand};
use dashboard::debug::{self, LogConfig};
use dashboard::sync::cache::CacheEntry;
use dashboard::{
    Dashboard, DashboardSnapshot, EntryStatus, Notice, NoticeLevel, ResourceId, ResourceKey,
    ResourceValue, SyncConfig, SyncError,
};
use shared::dto::BotSettingsUpdate;
use shared::utils::{format_amount, format_change, format_price};
use std::process::ExitCode;
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(
    name = "dashboard",
    about = "Paper-trading dashboard client for the account server"
)]
struct Cli {
    /// Base URL of the account API
    #[arg(long, env = "DASHBOARD_API_URL")]
    api_url: Option<String>,

    /// Session cookie value (log in through the web UI to obtain one)
    #[arg(long, env = "DASHBOARD_SESSION", hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep live resources subscribed and print each change until Ctrl-C.
    Watch,
    /// Fetch every resource once and print a summary.
    Snapshot,
    /// Reset the paper portfolio to its starting balance.
    Reset,
    /// Start or stop the trading bot.
    ToggleBot,
    /// Allow the bot to trade a coin.
    Enable {
        /// Coin symbol (e.g., ETH)
        symbol: String,
    },
    /// Stop the bot from trading a coin.
    Disable {
        /// Coin symbol (e.g., ETH)
        symbol: String,
    },
    /// Change bot parameters. Unset flags are left unchanged.
    BotUpdate {
        /// Quote amount spent per buy
        #[arg(long)]
        trade_amount: Option<f64>,

        /// Percent drop that triggers a buy
        #[arg(long)]
        buy_threshold: Option<f64>,

        /// Percent gain that triggers a sell
        #[arg(long)]
        sell_threshold: Option<f64>,

        /// Maximum simultaneous open positions
        #[arg(long)]
        max_positions: Option<u32>,
    },
}

/// Resources the watch command keeps subscribed
const WATCHED: [ResourceKey; 6] = [
    ResourceKey::MarketPrices,
    ResourceKey::Portfolio,
    ResourceKey::Transactions,
    ResourceKey::BotSettings,
    ResourceKey::EnabledCoins,
    ResourceKey::CoinPrices,
];

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is best-effort: the CLI still works without a writable log directory
    let _log_guard = match debug::init_logger(&LogConfig::from_env()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    let mut config = SyncConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    if let Some(session) = cli.session.filter(|s| !s.trim().is_empty()) {
        config = config.with_session(session);
    }

    let dashboard = match Dashboard::new(&config) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&dashboard).await,
        Commands::Snapshot => snapshot(&dashboard).await,
        Commands::Reset => mutate(&dashboard, dashboard.mutator().reset_portfolio()).await,
        Commands::ToggleBot => mutate(&dashboard, dashboard.mutator().toggle_bot()).await,
        Commands::Enable { symbol } => {
            mutate(&dashboard, dashboard.mutator().enable_coin(&symbol)).await
        }
        Commands::Disable { symbol } => {
            mutate(&dashboard, dashboard.mutator().disable_coin(&symbol)).await
        }
        Commands::BotUpdate {
            trade_amount,
            buy_threshold,
            sell_threshold,
            max_positions,
        } => {
            let update = BotSettingsUpdate {
                trade_amount,
                buy_threshold,
                sell_threshold,
                max_positions,
            };
            mutate(&dashboard, dashboard.mutator().update_bot_settings(update)).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Run one mutation and print the notice it produced
async fn mutate<T>(
    dashboard: &Dashboard,
    mutation: impl std::future::Future<Output = dashboard::Result<T>>,
) -> dashboard::Result<()> {
    let notices = dashboard.notices();
    let outcome = mutation.await;
    while let Ok(notice) = notices.try_recv() {
        print_notice(&notice);
    }
    outcome.map(|_| ())
}

async fn snapshot(dashboard: &Dashboard) -> dashboard::Result<()> {
    for (key, outcome) in dashboard.load_all().await {
        if let Err(e) = outcome {
            eprintln!("{}: {}", key, e);
        }
    }
    print_snapshot(&dashboard.snapshot());
    Ok(())
}

async fn watch(dashboard: &Dashboard) -> dashboard::Result<()> {
    let mut tasks: JoinSet<dashboard::Result<()>> = JoinSet::new();

    for key in WATCHED {
        let mut subscription = dashboard.subscribe(&ResourceId::of(key));
        tasks.spawn(async move {
            loop {
                let entry = subscription.changed().await?;
                print_entry(key, &entry);
            }
        });
    }

    let notices = dashboard.notices();
    tasks.spawn(async move {
        while let Ok(notice) = notices.recv().await {
            print_notice(&notice);
        }
        Ok(())
    });

    tracing::info!(resources = WATCHED.len(), "Watching");
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| SyncError::Config(format!("failed to listen for Ctrl-C: {}", e)))?;
            tracing::info!("Interrupted, unsubscribing");
        }
        Some(joined) = tasks.join_next() => {
            if let Ok(Err(e)) = joined {
                return Err(e);
            }
        }
    }
    tasks.shutdown().await;
    tracing::debug!(active_tasks = debug::active_task_count(), "Watch stopped");
    Ok(())
}

fn print_notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
        NoticeLevel::Info => "info",
    };
    println!("[{}] {}", tag, notice.message);
}

fn print_entry(key: ResourceKey, entry: &CacheEntry) {
    match (entry.status, &entry.value) {
        (EntryStatus::Fresh, Some(value)) => println!("{:<16} {}", key.name(), summarize(value)),
        (EntryStatus::Error, _) => println!(
            "{:<16} error: {}",
            key.name(),
            entry
                .error
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string)
        ),
        (status, _) => tracing::debug!(resource = %key, ?status, "Entry changed"),
    }
}

fn summarize(value: &ResourceValue) -> String {
    if value.is_absent() {
        return "(none)".to_string();
    }
    match value {
        ResourceValue::MarketPrices(prices) => prices
            .iter()
            .map(|p| {
                let change = p.change_24h.map(format_change).unwrap_or_default();
                format!("{} {} {}", p.symbol, format_price(p.price), change)
            })
            .collect::<Vec<_>>()
            .join(" | "),
        ResourceValue::Portfolio(Some(p)) => format!(
            "balance {} {}, total {}, {} holdings",
            format_price(p.balance),
            p.quote_currency,
            format_price(p.total_value),
            p.holdings.len()
        ),
        ResourceValue::Transactions(Some(list)) => match list.first() {
            Some(last) => format!(
                "{} trades, latest {:?} {} {} @ {}",
                list.len(),
                last.side,
                format_amount(last.amount),
                last.symbol,
                format_price(last.price)
            ),
            None => "no trades".to_string(),
        },
        ResourceValue::BotSettings(Some(s)) => format!(
            "{} | amount {} buy {}% sell {}% max {}",
            if s.is_active { "running" } else { "stopped" },
            format_price(s.trade_amount),
            s.buy_threshold,
            s.sell_threshold,
            s.max_positions
        ),
        ResourceValue::AvailableCoins(coins) => coins
            .iter()
            .map(|c| c.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        ResourceValue::EnabledCoins(symbols) => symbols.join(", "),
        ResourceValue::CoinPrices(prices) => prices
            .iter()
            .map(|p| match p.balance {
                Some(balance) => format!(
                    "{} {} (held {})",
                    p.symbol,
                    format_price(p.price),
                    format_amount(balance)
                ),
                None => format!("{} {}", p.symbol, format_price(p.price)),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        ResourceValue::Portfolio(None)
        | ResourceValue::Transactions(None)
        | ResourceValue::BotSettings(None) => "(none)".to_string(),
    }
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    if snapshot.is_logged_out() {
        println!("Not logged in: account resources are empty");
    }
    for key in ResourceKey::ALL {
        let value = match key {
            ResourceKey::MarketPrices => ResourceValue::MarketPrices(snapshot.market_prices.clone()),
            ResourceKey::Portfolio => ResourceValue::Portfolio(snapshot.portfolio.clone()),
            ResourceKey::Transactions => {
                ResourceValue::Transactions(Some(snapshot.transactions.clone()))
            }
            ResourceKey::BotSettings => ResourceValue::BotSettings(snapshot.bot_settings.clone()),
            ResourceKey::AvailableCoins => {
                ResourceValue::AvailableCoins(snapshot.available_coins.clone())
            }
            ResourceKey::EnabledCoins => ResourceValue::EnabledCoins(snapshot.enabled_coins.clone()),
            ResourceKey::CoinPrices => ResourceValue::CoinPrices(snapshot.coin_prices.clone()),
        };
        println!("{:<16} {}", key.name(), summarize(&value));
    }
    for (key, err) in &snapshot.errors {
        println!("{:<16} error: {}", key.name(), err);
    }
}
