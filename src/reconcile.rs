//! Reconciliation between the pick history and the bet ledger.
//!
//! A graded prediction may have a staked counterpart in the ledger. When it
//! does, the grade settles that bet so the two records stay consistent. The
//! link is resolved in two steps: an explicit prediction id recorded at
//! placement wins outright; otherwise matching falls back to the matchup
//! team pair, FIFO by bet id, so the oldest pending bet on a matchup
//! settles first. A grade with no staked counterpart is a no-op, not an
//! error.

use tracing::{debug, info};

use crate::ledger::BetLedger;
use crate::types::{BookError, GradedPick, PlacedBet};

/// Settle the pending ledger bet corresponding to a freshly graded pick,
/// if one exists. Returns the resolved bet, or `None` when the pick was
/// never staked.
pub fn on_pick_graded(
    ledger: &mut BetLedger,
    pick: &GradedPick,
) -> Result<Option<PlacedBet>, BookError> {
    let matched = find_match(ledger, pick);

    let Some(bet_id) = matched else {
        debug!(
            game_id = %pick.game_id,
            game = format!("{} @ {}", pick.away, pick.home),
            "Graded pick has no pending ledger bet"
        );
        return Ok(None);
    };

    let resolved = ledger.resolve_bet(bet_id, pick.result.as_bet_outcome())?;
    info!(
        bet_id = resolved.id,
        game_id = %pick.game_id,
        outcome = %resolved.result,
        "Ledger bet settled from graded pick"
    );
    Ok(Some(resolved))
}

fn find_match(ledger: &BetLedger, pick: &GradedPick) -> Option<u64> {
    let pending = ledger
        .active_bets()
        .iter()
        .filter(|bet| bet.result.is_pending());

    // Explicit linkage first.
    if let Some(bet) = pending
        .clone()
        .find(|bet| bet.prediction_id.as_deref() == Some(pick.game_id.as_str()))
    {
        return Some(bet.id);
    }

    // Name-based fallback: oldest pending bet on the matchup (ids are
    // generation-ordered, and the active set preserves placement order).
    pending
        .filter(|bet| {
            bet.game.away_team == pick.away && bet.game.home_team == pick.home
        })
        .map(|bet| bet.id)
        .min()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
