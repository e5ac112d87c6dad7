//! Money & odds utilities.
//!
//! Two distinct accounting paths live here and both are load-bearing:
//! exact-odds payout for staked ledger bets, and the fixed one-unit
//! -110 settlement convention used by pick-history analytics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{BookError, PickOutcome};

/// Payout for risking `risk_amount` at the given American odds, rounded to
/// cents. Positive odds pay `risk * odds/100`; negative odds pay
/// `risk * 100/|odds|`.
pub fn potential_win(risk_amount: Decimal, odds: i32) -> Result<Decimal, BookError> {
    if odds == 0 {
        return Err(BookError::InvalidOdds);
    }
    let win = if odds > 0 {
        risk_amount * Decimal::from(odds) / dec!(100)
    } else {
        risk_amount * dec!(100) / Decimal::from(odds.abs())
    };
    Ok(win.round_dp(2))
}

/// Per-unit profit for a graded pick under the fixed -110 convention:
/// win +0.91, loss -1.10, push 0. Stake-independent.
pub fn settle_unit_profit(outcome: PickOutcome) -> Decimal {
    match outcome {
        PickOutcome::Win => dec!(0.91),
        PickOutcome::Loss => dec!(-1.10),
        PickOutcome::Push => Decimal::ZERO,
    }
}

/// Units wagered per graded pick under the -110 convention (risk 1.1 to
/// win 1). The ROI denominator.
pub const UNIT_WAGER: Decimal = dec!(1.1);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potential_win_favorite() {
        // Risk $20 at -110 → win 20 * 100/110 = $18.18
        assert_eq!(potential_win(dec!(20), -110).unwrap(), dec!(18.18));
    }

    #[test]
    fn test_potential_win_underdog() {
        // Risk $10 at +150 → win 10 * 150/100 = $15
        assert_eq!(potential_win(dec!(10), 150).unwrap(), dec!(15.00));
    }

    #[test]
    fn test_potential_win_even_odds() {
        assert_eq!(potential_win(dec!(25), 100).unwrap(), dec!(25.00));
        assert_eq!(potential_win(dec!(25), -100).unwrap(), dec!(25.00));
    }

    #[test]
    fn test_potential_win_heavy_favorite_rounds_to_cents() {
        // 100 * 100/330 = 30.3030... → $30.30
        assert_eq!(potential_win(dec!(100), -330).unwrap(), dec!(30.30));
    }

    #[test]
    fn test_potential_win_zero_odds_rejected() {
        let err = potential_win(dec!(10), 0).unwrap_err();
        assert!(matches!(err, BookError::InvalidOdds));
    }

    #[test]
    fn test_settle_unit_profit_convention() {
        assert_eq!(settle_unit_profit(PickOutcome::Win), dec!(0.91));
        assert_eq!(settle_unit_profit(PickOutcome::Loss), dec!(-1.10));
        assert_eq!(settle_unit_profit(PickOutcome::Push), Decimal::ZERO);
    }

    #[test]
    fn test_unit_conventions_are_independent() {
        // The exact-odds path and the unit convention intentionally differ:
        // one unit risked at -110 would pay 0.909..., the analytics
        // convention pays a flat 0.91.
        let exact = potential_win(dec!(1), -110).unwrap();
        assert_eq!(exact, dec!(0.91)); // equal only because of cent rounding
        let exact_large = potential_win(dec!(1000), -110).unwrap();
        assert_eq!(exact_large, dec!(909.09));
    }
}
