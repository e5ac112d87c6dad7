//! Risk policy.
//!
//! Stateless rules for unit sizing and daily exposure limits. The ledger
//! consults these before accepting a bet; nothing here mutates state.

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::types::{BookError, PlacedBet, Settings};

/// One unit in dollars: the configured percentage of the current bankroll.
/// Recomputed on every call, so unit size floats with the bankroll.
pub fn unit_size(current_bankroll: Decimal, unit_percentage: Decimal) -> Decimal {
    current_bankroll * unit_percentage / dec!(100)
}

/// Total risk already committed to active bets placed on the same calendar
/// day as `as_of`, in local time.
pub fn daily_risk_used(active_bets: &[PlacedBet], as_of: DateTime<Utc>) -> Decimal {
    let day = as_of.with_timezone(&Local).date_naive();
    active_bets
        .iter()
        .filter(|bet| bet.date.with_timezone(&Local).date_naive() == day)
        .map(|bet| bet.risk_amount)
        .sum()
}

/// Gate a proposed stake against the daily risk cap and the bankroll.
///
/// The two rejections are distinct error kinds so callers can tell a
/// day-budget problem from an outright unaffordable stake.
pub fn can_place(
    active_bets: &[PlacedBet],
    proposed_risk: Decimal,
    settings: &Settings,
    as_of: DateTime<Utc>,
) -> Result<(), BookError> {
    // Affordability first: a stake larger than the whole bankroll is always
    // larger than the daily cap too (cap ≤ 50% of bankroll), and the caller
    // needs to see which rule actually applies.
    if proposed_risk > settings.current_bankroll {
        debug!(
            proposed = %proposed_risk,
            bankroll = %settings.current_bankroll,
            "Stake exceeds bankroll"
        );
        return Err(BookError::InsufficientBankroll {
            needed: proposed_risk,
            available: settings.current_bankroll,
        });
    }

    let used = daily_risk_used(active_bets, as_of);
    let cap = settings.current_bankroll * settings.max_daily_risk / dec!(100);

    if used + proposed_risk > cap {
        debug!(
            used = %used,
            proposed = %proposed_risk,
            cap = %cap,
            "Daily risk cap would be exceeded"
        );
        return Err(BookError::DailyRiskExceeded {
            attempted: used + proposed_risk,
            cap,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
