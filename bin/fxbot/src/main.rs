use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{alert, Config, MarketDataSource, Notifier};
use engine::{Scanner, YahooClient};
use strategy::StrategyFileConfig;
use telegram_alerts::TelegramNotifier;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().unwrap_or_else(|e| panic!("Startup aborted: {e}"));
    let strategy_cfg = match &cfg.strategy_config_path {
        Some(path) => StrategyFileConfig::load(path)
            .unwrap_or_else(|e| panic!("Failed to load strategy config '{path}': {e}")),
        None => StrategyFileConfig::default(),
    };
    info!(
        symbols = cfg.symbols.len(),
        interval_secs = cfg.scan_interval.as_secs(),
        cooldown_secs = cfg.cooldown.as_secs(),
        adx_min = strategy_cfg.binary.adx_min,
        forex = strategy_cfg.forex.enabled,
        "FxBot starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let source: Arc<dyn MarketDataSource> = Arc::new(
        YahooClient::new(&cfg.yahoo_base_url, cfg.fetch_timeout)
            .unwrap_or_else(|e| panic!("Failed to build market data client: {e}")),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(
        TelegramNotifier::new(&cfg.bot_token, &cfg.chat_id)
            .unwrap_or_else(|e| panic!("Invalid Telegram settings: {e}")),
    );

    // ── Liveness endpoint ─────────────────────────────────────────────────────
    let port = cfg.port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api::AppState::new(), port).await {
            error!(error = %e, "Liveness endpoint stopped");
        }
    });

    // ── Scanner ───────────────────────────────────────────────────────────────
    if let Err(e) = notifier.send(&alert::startup_message(Utc::now())).await {
        warn!(error = %e, "Startup message not delivered");
    }

    let scanner = Scanner::new(
        source,
        notifier,
        cfg.symbols.clone(),
        &strategy_cfg,
        cfg.scan_interval,
        cfg.cooldown,
    );
    tokio::spawn(scanner.run());

    info!("All subsystems started. Waiting for shutdown signal.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received. Exiting.");
}
