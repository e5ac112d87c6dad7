//! Pick history — the append-only audit log of graded predictions.
//!
//! Records are independent of ledger staking: each one settles at the fixed
//! one-unit -110 convention. Entries are never mutated or deleted once
//! written. Grading the same prediction twice appends two records; that is
//! the documented semantics of this log, not an accident, so duplicates are
//! logged but not rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use crate::odds::{self, UNIT_WAGER};
use crate::storage::{KvStore, PICK_HISTORY_KEY};
use crate::types::{BookError, GradedPick, PickOutcome, Prediction};

pub struct PickHistory {
    store: Arc<dyn KvStore>,
    picks: Vec<GradedPick>,
}

impl PickHistory {
    /// Restore the history from the store, or start empty.
    pub fn load(store: Arc<dyn KvStore>) -> Result<Self, BookError> {
        let picks = match store
            .get(PICK_HISTORY_KEY)
            .map_err(|e| BookError::Persistence(e.to_string()))?
        {
            Some(text) => serde_json::from_str::<Vec<GradedPick>>(&text)
                .map_err(|e| BookError::Persistence(format!("corrupt pick history: {e}")))?,
            None => Vec::new(),
        };

        info!(graded = picks.len(), "Pick history loaded");
        Ok(Self { store, picks })
    }

    // -- read accessors ----------------------------------------------------

    pub fn picks(&self) -> &[GradedPick] {
        &self.picks
    }

    pub fn graded_count(&self) -> usize {
        self.picks.len()
    }

    pub fn wins(&self) -> usize {
        self.picks
            .iter()
            .filter(|p| p.result == PickOutcome::Win)
            .count()
    }

    /// Win share over all graded picks. Exactly zero (not NaN) when empty.
    pub fn accuracy(&self) -> f64 {
        if self.picks.is_empty() {
            0.0
        } else {
            self.wins() as f64 / self.picks.len() as f64
        }
    }

    /// Net units over the whole log under the unit convention.
    pub fn total_profit(&self) -> Decimal {
        self.picks.iter().map(|p| p.profit).sum()
    }

    /// Return on investment as a percentage: profit over total wagered
    /// (1.1 units per graded pick). Exactly zero when nothing is graded.
    pub fn roi(&self) -> Decimal {
        if self.picks.is_empty() {
            return Decimal::ZERO;
        }
        let wagered = Decimal::from(self.picks.len() as u64) * UNIT_WAGER;
        (self.total_profit() / wagered * Decimal::from(100)).round_dp(2)
    }

    /// Longest run of consecutive wins in chronological order. Losses and
    /// pushes both break a run.
    pub fn best_streak(&self) -> usize {
        let mut best = 0;
        let mut run = 0;
        for pick in &self.picks {
            if pick.result == PickOutcome::Win {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    /// The run of consecutive wins at the end of the log. Zero when the
    /// latest graded pick was not a win.
    pub fn current_streak(&self) -> usize {
        self.picks
            .iter()
            .rev()
            .take_while(|p| p.result == PickOutcome::Win)
            .count()
    }

    /// The latest `n` graded picks, newest first.
    pub fn recent(&self, n: usize) -> Vec<&GradedPick> {
        self.picks.iter().rev().take(n).collect()
    }

    // -- mutations ---------------------------------------------------------

    /// Grade a prediction and append the result. One store write; the
    /// in-memory log only grows after the write succeeds.
    pub fn record_result(
        &mut self,
        prediction: &Prediction,
        outcome: PickOutcome,
    ) -> Result<GradedPick, BookError> {
        self.record_result_at(prediction, outcome, Utc::now())
    }

    pub fn record_result_at(
        &mut self,
        prediction: &Prediction,
        outcome: PickOutcome,
        now: DateTime<Utc>,
    ) -> Result<GradedPick, BookError> {
        if self.picks.iter().any(|p| p.game_id == prediction.id) {
            warn!(
                game_id = %prediction.id,
                "Prediction already graded; appending a duplicate record"
            );
        }

        let pick = GradedPick {
            game_id: prediction.id.clone(),
            league: prediction.league,
            away: prediction.away_team.clone(),
            home: prediction.home_team.clone(),
            pick: prediction.pick.clone(),
            spread: prediction.spread,
            total: prediction.total,
            conf: prediction.confidence,
            result: outcome,
            date: now,
            profit: odds::settle_unit_profit(outcome),
        };

        let mut staged = self.picks.clone();
        staged.push(pick.clone());
        let text = serde_json::to_string(&staged)
            .map_err(|e| BookError::Persistence(e.to_string()))?;
        self.store
            .set(PICK_HISTORY_KEY, &text)
            .map_err(|e| BookError::Persistence(e.to_string()))?;
        self.picks = staged;

        info!(
            game_id = %pick.game_id,
            game = format!("{} @ {}", pick.away, pick.home),
            result = %pick.result,
            profit = %pick.profit,
            "Pick graded"
        );

        Ok(pick)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
