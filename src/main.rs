//! PICKBOOK — Bankroll Accounting & Bet Settlement Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the session from disk (or starts fresh), serves the read-only
//! dashboard, and re-pulls the prediction slate on an interval with
//! graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use pickbook::config::AppConfig;
use pickbook::dashboard::{self, routes::DashboardState};
use pickbook::session::Session;
use pickbook::source::{FileSource, OddsApiSource, PredictionSource};
use pickbook::storage::JsonFileStore;

const BANNER: &str = r#"
 ____  ___ ____ _  ______   ___   ___  _  __
|  _ \|_ _/ ___| |/ / __ ) / _ \ / _ \| |/ /
| |_) || | |   | ' /|  _ \| | | | | | | ' /
|  __/ | | |___| . \| |_) | |_| | |_| | . \
|_|   |___\____|_|\_\____/ \___/ \___/|_|\_\

  Bankroll Accounting & Bet Settlement Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;
    init_logging();

    println!("{BANNER}");
    info!(
        engine_name = %cfg.engine.name,
        refresh_interval_secs = cfg.engine.refresh_interval_secs,
        store_dir = %cfg.store.dir,
        "PICKBOOK starting up"
    );

    // -- Restore session ---------------------------------------------------

    let store = Arc::new(JsonFileStore::new(&cfg.store.dir)?);
    let session = Session::open(store)?;
    info!(
        bankroll = %session.ledger().settings().current_bankroll,
        active_bets = session.ledger().active_bets().len(),
        graded_picks = session.history().graded_count(),
        "Session restored"
    );

    // -- Prediction source -------------------------------------------------

    let source: Box<dyn PredictionSource> = match cfg.source.kind.as_str() {
        "odds_api" => {
            let env_name = cfg
                .source
                .api_key_env
                .as_deref()
                .unwrap_or("BDL_API_KEY");
            let api_key = AppConfig::resolve_env(env_name)?;
            info!("Using live odds API prediction source");
            Box::new(OddsApiSource::new(api_key)?)
        }
        "file" => {
            let path = cfg
                .source
                .feed_path
                .clone()
                .unwrap_or_else(|| "data/latest-predictions.json".to_string());
            info!(path = %path, "Using feed file prediction source");
            Box::new(FileSource::new(path))
        }
        other => {
            warn!(kind = other, "Unknown source kind, defaulting to feed file");
            Box::new(FileSource::new("data/latest-predictions.json"))
        }
    };

    // -- Dashboard ---------------------------------------------------------

    let state = Arc::new(DashboardState::new(session));
    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(state.clone(), cfg.dashboard.port)?;
    }

    // -- Main loop ---------------------------------------------------------

    let refresh = Duration::from_secs(cfg.engine.refresh_interval_secs);
    let mut interval = tokio::time::interval(refresh);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.engine.refresh_interval_secs,
        "Entering refresh loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match source.fetch_predictions().await {
                    Ok(slate) => {
                        let session = state.session.read().await;
                        let snapshot = session.analytics();
                        info!(
                            slate_games = slate.len(),
                            bankroll = %session.ledger().settings().current_bankroll,
                            active_bets = session.ledger().active_bets().len(),
                            accuracy = format!("{:.1}%", snapshot.accuracy * 100.0),
                            roi = format!("{}%", snapshot.roi),
                            "Refresh complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Slate refresh failed — continuing to next");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    let session = state.session.read().await;
    info!(
        bankroll = %session.ledger().settings().current_bankroll,
        total_profit = %session.ledger().settings().total_profit,
        graded_picks = session.history().graded_count(),
        "PICKBOOK shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pickbook=info"));

    let json_logging = std::env::var("PICKBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
