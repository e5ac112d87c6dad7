//! Shared types for the PICKBOOK engine.
//!
//! These types form the data model used across all modules: the prediction
//! source records, the two persisted bet records (ledger and pick history),
//! and the bankroll settings. They are designed to be stable so that the
//! ledger, history, and analytics modules can depend on them without
//! circular references.
//!
//! Persisted types serialize with camelCase keys so stored data keeps the
//! key layout of the store contract (`bankrollSettings`, `activeBets`,
//! `bettingHistory`, `aiHist`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Leagues & games
// ---------------------------------------------------------------------------

/// Supported leagues. Serialized using the sport-key strings the prediction
/// feed emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "basketball_nba")]
    Nba,
    #[serde(rename = "americanfootball_nfl")]
    Nfl,
}

impl League {
    /// All known leagues (useful for iteration).
    pub const ALL: &'static [League] = &[League::Nba, League::Nfl];
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            League::Nba => write!(f, "NBA"),
            League::Nfl => write!(f, "NFL"),
        }
    }
}

impl std::str::FromStr for League {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nba" | "basketball_nba" => Ok(League::Nba),
            "nfl" | "americanfootball_nfl" => Ok(League::Nfl),
            _ => Err(anyhow::anyhow!("Unknown league: {s}")),
        }
    }
}

/// A matchup: away team visiting home team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub away_team: String,
    pub home_team: String,
}

impl Game {
    pub fn new(away: &str, home: &str) -> Self {
        Self {
            away_team: away.to_string(),
            home_team: home.to_string(),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.away_team, self.home_team)
    }
}

// ---------------------------------------------------------------------------
// Prediction source records
// ---------------------------------------------------------------------------

/// A candidate game supplied by the prediction source. How the pick and
/// confidence were derived is the source's business; the engine only
/// consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub league: League,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    /// Point spread quoted against the home team.
    pub spread: f64,
    /// Over/under total for the game.
    pub total: f64,
    /// The team the source picked to win.
    pub pick: String,
    /// Source confidence in (0, 1).
    pub confidence: f64,
}

impl Prediction {
    pub fn game(&self) -> Game {
        Game::new(&self.away_team, &self.home_team)
    }

    /// Helper to build a test/sample prediction with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Prediction {
            id: "game-001".to_string(),
            league: League::Nba,
            commence_time: Utc::now() + chrono::Duration::hours(4),
            home_team: "Clippers".to_string(),
            away_team: "Lakers".to_string(),
            spread: -3.5,
            total: 221.5,
            pick: "Clippers".to_string(),
            confidence: 0.64,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {} | pick: {} ({:.0}%) | spread {:+.1} total {:.1}",
            self.league,
            self.away_team,
            self.home_team,
            self.pick,
            self.confidence * 100.0,
            self.spread,
            self.total,
        )
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Terminal outcome of a staked bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetOutcome {
    Win,
    Loss,
    Push,
}

impl fmt::Display for BetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetOutcome::Win => write!(f, "win"),
            BetOutcome::Loss => write!(f, "loss"),
            BetOutcome::Push => write!(f, "push"),
        }
    }
}

/// Lifecycle status of a ledger bet: pending until resolved exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Win,
    Loss,
    Push,
}

impl BetStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, BetStatus::Pending)
    }
}

impl From<BetOutcome> for BetStatus {
    fn from(outcome: BetOutcome) -> Self {
        match outcome {
            BetOutcome::Win => BetStatus::Win,
            BetOutcome::Loss => BetStatus::Loss,
            BetOutcome::Push => BetStatus::Push,
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Pending => write!(f, "pending"),
            BetStatus::Win => write!(f, "win"),
            BetStatus::Loss => write!(f, "loss"),
            BetStatus::Push => write!(f, "push"),
        }
    }
}

/// Graded result of a prediction, independent of any stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickOutcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "P")]
    Push,
}

impl PickOutcome {
    /// The equivalent staked-bet outcome, used when a graded pick settles a
    /// pending ledger bet.
    pub fn as_bet_outcome(&self) -> BetOutcome {
        match self {
            PickOutcome::Win => BetOutcome::Win,
            PickOutcome::Loss => BetOutcome::Loss,
            PickOutcome::Push => BetOutcome::Push,
        }
    }
}

impl fmt::Display for PickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickOutcome::Win => write!(f, "W"),
            PickOutcome::Loss => write!(f, "L"),
            PickOutcome::Push => write!(f, "P"),
        }
    }
}

impl std::str::FromStr for PickOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "W" | "WIN" => Ok(PickOutcome::Win),
            "L" | "LOSS" => Ok(PickOutcome::Loss),
            "P" | "PUSH" => Ok(PickOutcome::Push),
            _ => Err(anyhow::anyhow!("Unknown pick outcome: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

/// A staked bet in the ledger. Created pending; moves to the history set
/// when resolved and is immutable from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBet {
    /// Unique, generation-ordered id (lower id = placed earlier).
    pub id: u64,
    pub game: Game,
    /// Prediction-source id recorded at placement when the bet was taken
    /// against a known prediction. Lets settlement link the two records
    /// without name matching.
    #[serde(default)]
    pub prediction_id: Option<String>,
    pub units: Decimal,
    /// American odds. Negative = favorite, positive = underdog; never zero.
    pub odds: i32,
    /// Dollar risk locked in at placement time (units × unit size then).
    pub risk_amount: Decimal,
    pub potential_win: Decimal,
    pub result: BetStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub resolved_date: Option<DateTime<Utc>>,
}

impl PlacedBet {
    /// Signed bankroll delta this bet produced. Zero while pending or on a
    /// push.
    pub fn profit(&self) -> Decimal {
        match self.result {
            BetStatus::Win => self.potential_win,
            BetStatus::Loss => -self.risk_amount,
            BetStatus::Push | BetStatus::Pending => Decimal::ZERO,
        }
    }
}

impl fmt::Display for PlacedBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} | {} units @ {:+} | risk ${:.2} to win ${:.2} | {}",
            self.id,
            self.game,
            self.units,
            self.odds,
            self.risk_amount,
            self.potential_win,
            self.result,
        )
    }
}

// ---------------------------------------------------------------------------
// Pick history records
// ---------------------------------------------------------------------------

/// A graded prediction in the append-only pick history. Profit uses the
/// fixed one-unit, -110-odds convention regardless of any ledger stake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedPick {
    pub game_id: String,
    pub league: League,
    pub away: String,
    pub home: String,
    pub pick: String,
    pub spread: f64,
    pub total: f64,
    pub conf: f64,
    pub result: PickOutcome,
    pub date: DateTime<Utc>,
    pub profit: Decimal,
}

impl fmt::Display for GradedPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {} | picked {} ({:.0}%) | {} ({:+.2}u)",
            self.league,
            self.away,
            self.home,
            self.pick,
            self.conf * 100.0,
            self.result,
            self.profit,
        )
    }
}

// ---------------------------------------------------------------------------
// Bankroll settings
// ---------------------------------------------------------------------------

/// Bankroll settings and running totals, owned by the ledger. Missing or
/// unknown keys in stored data fall back to these defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub starting_bankroll: Decimal,
    pub current_bankroll: Decimal,
    /// Highest bankroll ever observed. Monotonically non-decreasing.
    pub peak_bankroll: Decimal,
    /// Percent of current bankroll that defines one unit. Valid range
    /// 0.1–10.
    pub unit_percentage: Decimal,
    /// Percent of current bankroll capping same-day exposure. Valid range
    /// 1–50.
    pub max_daily_risk: Decimal,
    /// Signed running sum of settled win/loss deltas.
    pub total_profit: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_bankroll: dec!(1000),
            current_bankroll: dec!(1000),
            peak_bankroll: dec!(1000),
            unit_percentage: dec!(1),
            max_daily_risk: dec!(5),
            total_profit: Decimal::ZERO,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bankroll=${:.2} (start ${:.2}, peak ${:.2}) | profit=${:.2} | unit={}% | daily_risk={}%",
            self.current_bankroll,
            self.starting_bankroll,
            self.peak_bankroll,
            self.total_profit,
            self.unit_percentage,
            self.max_daily_risk,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PICKBOOK. All are local validation
/// failures returned to the caller before any write, except `Persistence`
/// which surfaces a failed store write.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("Invalid units: must be greater than zero")]
    InvalidUnits,

    #[error("Invalid odds: American odds cannot be zero")]
    InvalidOdds,

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Insufficient bankroll: need ${needed:.2}, have ${available:.2}")]
    InsufficientBankroll { needed: Decimal, available: Decimal },

    #[error("Daily risk limit exceeded: ${attempted:.2} committed against a ${cap:.2} cap")]
    DailyRiskExceeded { attempted: Decimal, cap: Decimal },

    #[error("Bet not found: {0}")]
    NotFound(u64),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
