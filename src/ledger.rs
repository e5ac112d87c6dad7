//! Bet ledger — the authoritative record of placed bets and the bankroll
//! state they drive.
//!
//! Settings, active bets, and betting history are committed together as one
//! serialized envelope under a single store key, so every logical operation
//! is exactly one durable write and stored state can never tear across the
//! three records. Mutations are staged and only applied in memory after the
//! write succeeds: a failed write surfaces `BookError::Persistence` and
//! leaves the ledger exactly as it was.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::odds;
use crate::risk;
use crate::storage::{KvStore, LEDGER_KEY};
use crate::types::{BetOutcome, BetStatus, BookError, Game, PlacedBet, Settings};

// ---------------------------------------------------------------------------
// Persisted envelope
// ---------------------------------------------------------------------------

/// Everything the ledger owns, persisted as one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LedgerEnvelope {
    settings: Settings,
    active_bets: Vec<PlacedBet>,
    betting_history: Vec<PlacedBet>,
    next_bet_id: u64,
}

impl Default for LedgerEnvelope {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            active_bets: Vec::new(),
            betting_history: Vec::new(),
            next_bet_id: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub struct BetLedger {
    store: Arc<dyn KvStore>,
    settings: Settings,
    active: Vec<PlacedBet>,
    history: Vec<PlacedBet>,
    next_bet_id: u64,
}

impl BetLedger {
    /// Restore the ledger from the store, or start fresh with defaults if
    /// nothing is persisted yet. Missing envelope fields merge over
    /// defaults.
    pub fn load(store: Arc<dyn KvStore>) -> Result<Self, BookError> {
        let envelope = match store
            .get(LEDGER_KEY)
            .map_err(|e| BookError::Persistence(e.to_string()))?
        {
            Some(text) => serde_json::from_str::<LedgerEnvelope>(&text)
                .map_err(|e| BookError::Persistence(format!("corrupt ledger record: {e}")))?,
            None => LedgerEnvelope::default(),
        };

        info!(
            bankroll = %envelope.settings.current_bankroll,
            active = envelope.active_bets.len(),
            resolved = envelope.betting_history.len(),
            "Ledger loaded"
        );

        Ok(Self {
            store,
            settings: envelope.settings,
            active: envelope.active_bets,
            history: envelope.betting_history,
            next_bet_id: envelope.next_bet_id,
        })
    }

    // -- read accessors ----------------------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active_bets(&self) -> &[PlacedBet] {
        &self.active
    }

    pub fn history(&self) -> &[PlacedBet] {
        &self.history
    }

    /// Resolved bets matching the given outcome, or all when `None`.
    pub fn history_filtered(&self, filter: Option<BetStatus>) -> Vec<&PlacedBet> {
        self.history
            .iter()
            .filter(|bet| filter.map_or(true, |f| bet.result == f))
            .collect()
    }

    /// Current unit size in dollars (floats with the bankroll).
    pub fn unit_size(&self) -> Decimal {
        risk::unit_size(self.settings.current_bankroll, self.settings.unit_percentage)
    }

    /// Gap between the historical peak and the current bankroll.
    pub fn max_drawdown(&self) -> Decimal {
        self.settings.peak_bankroll
            - self.settings.current_bankroll.min(self.settings.peak_bankroll)
    }

    // -- mutations ---------------------------------------------------------

    /// Stake `units` on a game at the given American odds. Validates fully
    /// before the single envelope write; on success the bet enters the
    /// active set as pending.
    pub fn place_bet(
        &mut self,
        game: Game,
        prediction_id: Option<String>,
        units: Decimal,
        odds: i32,
    ) -> Result<PlacedBet, BookError> {
        self.place_bet_at(game, prediction_id, units, odds, Utc::now())
    }

    /// `place_bet` with an explicit clock, used by tests exercising the
    /// daily risk window.
    pub fn place_bet_at(
        &mut self,
        game: Game,
        prediction_id: Option<String>,
        units: Decimal,
        odds: i32,
        now: DateTime<Utc>,
    ) -> Result<PlacedBet, BookError> {
        if units <= Decimal::ZERO {
            return Err(BookError::InvalidUnits);
        }

        let risk_amount = (units * self.unit_size()).round_dp(2);
        let potential_win = odds::potential_win(risk_amount, odds)?;
        risk::can_place(&self.active, risk_amount, &self.settings, now)?;

        let bet = PlacedBet {
            id: self.next_bet_id,
            game,
            prediction_id,
            units,
            odds,
            risk_amount,
            potential_win,
            result: BetStatus::Pending,
            date: now,
            resolved_date: None,
        };

        let mut staged_active = self.active.clone();
        staged_active.push(bet.clone());
        self.commit(LedgerEnvelope {
            settings: self.settings.clone(),
            active_bets: staged_active,
            betting_history: self.history.clone(),
            next_bet_id: self.next_bet_id + 1,
        })?;

        info!(
            bet_id = bet.id,
            game = %bet.game,
            units = %bet.units,
            odds = bet.odds,
            risk = %bet.risk_amount,
            to_win = %bet.potential_win,
            "Bet placed"
        );

        Ok(bet)
    }

    /// Settle a pending bet. Win credits the payout, loss debits the risk,
    /// push moves money nowhere; the bet moves from active to history and
    /// the peak bankroll is refreshed. One envelope write covers all of it.
    pub fn resolve_bet(&mut self, id: u64, outcome: BetOutcome) -> Result<PlacedBet, BookError> {
        self.resolve_bet_at(id, outcome, Utc::now())
    }

    pub fn resolve_bet_at(
        &mut self,
        id: u64,
        outcome: BetOutcome,
        now: DateTime<Utc>,
    ) -> Result<PlacedBet, BookError> {
        let idx = self
            .active
            .iter()
            .position(|bet| bet.id == id)
            .ok_or(BookError::NotFound(id))?;

        let mut staged_active = self.active.clone();
        let mut bet = staged_active.remove(idx);
        bet.result = outcome.into();
        bet.resolved_date = Some(now);

        let mut settings = self.settings.clone();
        match outcome {
            BetOutcome::Win => {
                settings.current_bankroll += bet.potential_win;
                settings.total_profit += bet.potential_win;
            }
            BetOutcome::Loss => {
                settings.current_bankroll -= bet.risk_amount;
                settings.total_profit -= bet.risk_amount;
            }
            BetOutcome::Push => {}
        }
        settings.peak_bankroll = settings.peak_bankroll.max(settings.current_bankroll);

        // The balance is never clamped at zero: a loss bigger than the
        // bankroll drives it negative.
        if settings.current_bankroll < Decimal::ZERO {
            warn!(
                bet_id = bet.id,
                bankroll = %settings.current_bankroll,
                "Bankroll is negative after settlement"
            );
        }

        let mut staged_history = self.history.clone();
        staged_history.push(bet.clone());

        self.commit(LedgerEnvelope {
            settings,
            active_bets: staged_active,
            betting_history: staged_history,
            next_bet_id: self.next_bet_id,
        })?;

        info!(
            bet_id = bet.id,
            game = %bet.game,
            outcome = %outcome,
            delta = %bet.profit(),
            bankroll = %self.settings.current_bankroll,
            "Bet resolved"
        );

        Ok(bet)
    }

    /// Change bankroll settings. Re-bases the current bankroll from the new
    /// starting amount plus the profit already accumulated; history is never
    /// discarded.
    pub fn update_settings(
        &mut self,
        starting_bankroll: Decimal,
        unit_percentage: Decimal,
        max_daily_risk: Decimal,
    ) -> Result<(), BookError> {
        if starting_bankroll < Decimal::ZERO {
            return Err(BookError::InvalidSetting(
                "starting bankroll cannot be negative".to_string(),
            ));
        }
        if !(Decimal::new(1, 1)..=Decimal::from(10)).contains(&unit_percentage) {
            return Err(BookError::InvalidSetting(
                "unit percentage must be between 0.1% and 10%".to_string(),
            ));
        }
        if !(Decimal::ONE..=Decimal::from(50)).contains(&max_daily_risk) {
            return Err(BookError::InvalidSetting(
                "max daily risk must be between 1% and 50%".to_string(),
            ));
        }

        let mut settings = self.settings.clone();
        settings.starting_bankroll = starting_bankroll;
        settings.current_bankroll = starting_bankroll + settings.total_profit;
        settings.unit_percentage = unit_percentage;
        settings.max_daily_risk = max_daily_risk;
        settings.peak_bankroll = settings.peak_bankroll.max(settings.current_bankroll);

        self.commit(LedgerEnvelope {
            settings,
            active_bets: self.active.clone(),
            betting_history: self.history.clone(),
            next_bet_id: self.next_bet_id,
        })?;

        info!(settings = %self.settings, "Settings updated");
        Ok(())
    }

    /// Wipe settings, active bets, and history back to defaults.
    /// Destructive and irreversible.
    pub fn reset(&mut self) -> Result<(), BookError> {
        self.commit(LedgerEnvelope::default())?;
        warn!("Ledger reset: all bankroll data cleared");
        Ok(())
    }

    /// Persist the staged envelope, then apply it in memory. The in-memory
    /// state changes only after the write succeeds.
    fn commit(&mut self, staged: LedgerEnvelope) -> Result<(), BookError> {
        let text = serde_json::to_string(&staged)
            .map_err(|e| BookError::Persistence(e.to_string()))?;
        self.store
            .set(LEDGER_KEY, &text)
            .map_err(|e| BookError::Persistence(e.to_string()))?;

        self.settings = staged.settings;
        self.active = staged.active_bets;
        self.history = staged.betting_history;
        self.next_bet_id = staged.next_bet_id;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
