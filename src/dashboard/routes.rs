//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analytics::AnalyticsSnapshot;
use crate::session::{ExportDocument, Session};
use crate::types::{GradedPick, PlacedBet};

/// How many graded picks `/api/picks` returns.
const RECENT_PICKS: usize = 50;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub session: RwLock<Session>,
}

impl DashboardState {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub starting_bankroll: Decimal,
    pub current_bankroll: Decimal,
    pub peak_bankroll: Decimal,
    pub total_profit: Decimal,
    pub unit_size: Decimal,
    pub max_drawdown: Decimal,
    pub active_bets: usize,
    pub resolved_bets: usize,
    pub graded_picks: usize,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.session.read().await;
    let settings = session.ledger().settings();

    Json(StatusResponse {
        starting_bankroll: settings.starting_bankroll,
        current_bankroll: settings.current_bankroll,
        peak_bankroll: settings.peak_bankroll,
        total_profit: settings.total_profit,
        unit_size: session.ledger().unit_size(),
        max_drawdown: session.ledger().max_drawdown(),
        active_bets: session.ledger().active_bets().len(),
        resolved_bets: session.ledger().history().len(),
        graded_picks: session.history().graded_count(),
    })
}

/// GET /api/analytics
pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsSnapshot> {
    let session = state.session.read().await;
    Json(session.analytics())
}

/// GET /api/active-bets
pub async fn get_active_bets(State(state): State<AppState>) -> Json<Vec<PlacedBet>> {
    let session = state.session.read().await;
    Json(session.ledger().active_bets().to_vec())
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<PlacedBet>> {
    let session = state.session.read().await;
    Json(session.ledger().history().to_vec())
}

/// GET /api/picks — latest graded picks, newest first.
pub async fn get_picks(State(state): State<AppState>) -> Json<Vec<GradedPick>> {
    let session = state.session.read().await;
    Json(
        session
            .history()
            .recent(RECENT_PICKS)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/export — full backup document.
pub async fn get_export(State(state): State<AppState>) -> Json<ExportDocument> {
    let session = state.session.read().await;
    Json(session.export())
}
