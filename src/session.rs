//! Session — the engine's single entry point.
//!
//! Owns the bet ledger and the pick history over one shared store and
//! exposes every user-facing operation: staking, settlement, grading with
//! reconciliation, settings, reset, export, and the analytics snapshot.
//! All state lives here; nothing in the crate reaches for globals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::analytics::{self, AnalyticsSnapshot};
use crate::history::PickHistory;
use crate::ledger::BetLedger;
use crate::reconcile;
use crate::storage::KvStore;
use crate::types::{
    BetOutcome, BetStatus, BookError, Game, GradedPick, PickOutcome, PlacedBet, Prediction,
    Settings,
};

/// Result of grading a prediction: the history record that was appended,
/// and the ledger bet the grade settled, if the pick had been staked.
#[derive(Debug, Clone)]
pub struct GradeReceipt {
    pub pick: GradedPick,
    pub settled_bet: Option<PlacedBet>,
}

/// Full data export, shaped for backup and re-import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub settings: Settings,
    pub active_bets: Vec<PlacedBet>,
    pub betting_history: Vec<PlacedBet>,
    pub pick_history: Vec<GradedPick>,
    pub export_date: DateTime<Utc>,
}

pub struct Session {
    ledger: BetLedger,
    history: PickHistory,
}

impl Session {
    /// Open a session over the store, restoring any persisted state.
    pub fn open(store: Arc<dyn KvStore>) -> Result<Self, BookError> {
        let ledger = BetLedger::load(store.clone())?;
        let history = PickHistory::load(store)?;
        info!(
            active_bets = ledger.active_bets().len(),
            resolved_bets = ledger.history().len(),
            graded_picks = history.graded_count(),
            "Session opened"
        );
        Ok(Self { ledger, history })
    }

    // -- read access ---------------------------------------------------------

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn history(&self) -> &PickHistory {
        &self.history
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        analytics::snapshot(&self.history, &self.ledger)
    }

    // -- ledger operations ---------------------------------------------------

    /// Stake `units` on a game with no linked prediction.
    pub fn place_bet(
        &mut self,
        game: Game,
        units: Decimal,
        odds: i32,
    ) -> Result<PlacedBet, BookError> {
        self.ledger.place_bet(game, None, units, odds)
    }

    /// Stake `units` on a sourced prediction, recording the linkage so a
    /// later grade settles exactly this bet.
    pub fn place_bet_on(
        &mut self,
        prediction: &Prediction,
        units: Decimal,
        odds: i32,
    ) -> Result<PlacedBet, BookError> {
        self.ledger
            .place_bet(prediction.game(), Some(prediction.id.clone()), units, odds)
    }

    pub fn resolve_bet(&mut self, id: u64, outcome: BetOutcome) -> Result<PlacedBet, BookError> {
        self.ledger.resolve_bet(id, outcome)
    }

    pub fn update_settings(
        &mut self,
        starting_bankroll: Decimal,
        unit_percentage: Decimal,
        max_daily_risk: Decimal,
    ) -> Result<(), BookError> {
        self.ledger
            .update_settings(starting_bankroll, unit_percentage, max_daily_risk)
    }

    /// Clear all bankroll data. The pick history is a separate audit log
    /// and survives a reset.
    pub fn reset(&mut self) -> Result<(), BookError> {
        self.ledger.reset()
    }

    // -- grading -------------------------------------------------------------

    /// Grade a prediction: append it to the pick history, then settle the
    /// matching pending ledger bet if one exists.
    pub fn grade_pick(
        &mut self,
        prediction: &Prediction,
        outcome: PickOutcome,
    ) -> Result<GradeReceipt, BookError> {
        let pick = self.history.record_result(prediction, outcome)?;
        let settled_bet = reconcile::on_pick_graded(&mut self.ledger, &pick)?;
        Ok(GradeReceipt { pick, settled_bet })
    }

    // -- export --------------------------------------------------------------

    /// Snapshot everything into one backup document.
    pub fn export(&self) -> ExportDocument {
        ExportDocument {
            settings: self.ledger.settings().clone(),
            active_bets: self.ledger.active_bets().to_vec(),
            betting_history: self.ledger.history().to_vec(),
            pick_history: self.history.picks().to_vec(),
            export_date: Utc::now(),
        }
    }

    /// Resolved bets matching the given outcome, or all when `None`.
    pub fn betting_history(&self, filter: Option<BetStatus>) -> Vec<&PlacedBet> {
        self.ledger.history_filtered(filter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
