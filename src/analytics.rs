//! Analytics aggregator.
//!
//! Pure read-only derivations over the pick history and the bet ledger,
//! shaped for presentation. Nothing here mutates state; the presentation
//! layer consumes these snapshots as JSON.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::history::PickHistory;
use crate::ledger::BetLedger;
use crate::odds;
use crate::types::{GradedPick, League, PickOutcome};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProfitPoint {
    pub date: DateTime<Utc>,
    pub cumulative_profit: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankrollPoint {
    pub date: DateTime<Utc>,
    pub bankroll: Decimal,
}

/// Counts per confidence band. Fixed boundaries: (0, 0.6], (0.6, 0.7],
/// (0.7, 1.0].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceBuckets {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamAccuracy {
    pub team: String,
    pub wins: usize,
    pub total: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueAccuracy {
    pub league: League,
    pub graded: usize,
    pub wins: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyProfit {
    /// Calendar month key, `YYYY-MM`.
    pub month: String,
    pub profit: Decimal,
}

/// Share of picks per confidence-derived risk band, as percentages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskProfile {
    pub high_risk_pct: f64,
    pub medium_risk_pct: f64,
    pub low_risk_pct: f64,
}

/// Everything the presentation layer needs in one read-only snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub graded: usize,
    pub accuracy: f64,
    pub roi: Decimal,
    pub total_profit_units: Decimal,
    pub best_streak: usize,
    pub current_streak: usize,
    pub avg_confidence: f64,
    pub max_drawdown: Decimal,
    pub cumulative_profit: Vec<ProfitPoint>,
    pub bankroll_series: Vec<BankrollPoint>,
    pub confidence_buckets: ConfidenceBuckets,
    pub top_teams: Vec<TeamAccuracy>,
    pub league_accuracy: Vec<LeagueAccuracy>,
    pub monthly_profit: Vec<MonthlyProfit>,
    pub risk_profile: RiskProfile,
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Running unit-profit series over graded picks, ordered by grade date.
pub fn cumulative_profit(picks: &[GradedPick]) -> Vec<ProfitPoint> {
    let mut ordered: Vec<&GradedPick> = picks.iter().collect();
    ordered.sort_by_key(|p| p.date);

    let mut running = Decimal::ZERO;
    ordered
        .iter()
        .map(|p| {
            running += odds::settle_unit_profit(p.result);
            ProfitPoint {
                date: p.date,
                cumulative_profit: running,
            }
        })
        .collect()
}

/// Bankroll trajectory: the starting bankroll, then each resolved ledger
/// bet's delta applied in settlement order.
pub fn bankroll_series(ledger: &BetLedger) -> Vec<BankrollPoint> {
    let start = ledger.settings().starting_bankroll;
    let first_date = ledger
        .history()
        .first()
        .and_then(|bet| bet.resolved_date)
        .unwrap_or_else(Utc::now);

    let mut series = vec![BankrollPoint {
        date: first_date,
        bankroll: start,
    }];

    let mut balance = start;
    for bet in ledger.history() {
        balance += bet.profit();
        series.push(BankrollPoint {
            date: bet.resolved_date.unwrap_or(bet.date),
            bankroll: balance,
        });
    }
    series
}

pub fn confidence_buckets(picks: &[GradedPick]) -> ConfidenceBuckets {
    let mut buckets = ConfidenceBuckets::default();
    for pick in picks {
        if pick.conf <= 0.6 {
            buckets.low += 1;
        } else if pick.conf <= 0.7 {
            buckets.medium += 1;
        } else {
            buckets.high += 1;
        }
    }
    buckets
}

/// Per-team pick accuracy over graded picks the team appeared in,
/// restricted to teams with at least `min_total` observations. A win
/// counts for a team only when it was the picked side. Descending by
/// accuracy, team name breaking ties, top `limit`.
pub fn top_teams(picks: &[GradedPick], min_total: usize, limit: usize) -> Vec<TeamAccuracy> {
    let mut tallies: HashMap<&str, (usize, usize)> = HashMap::new();
    for pick in picks {
        for team in [pick.home.as_str(), pick.away.as_str()] {
            let entry = tallies.entry(team).or_default();
            entry.1 += 1;
            if pick.result == PickOutcome::Win && pick.pick == team {
                entry.0 += 1;
            }
        }
    }

    let mut rows: Vec<TeamAccuracy> = tallies
        .into_iter()
        .filter(|(_, (_, total))| *total >= min_total)
        .map(|(team, (wins, total))| TeamAccuracy {
            team: team.to_string(),
            wins,
            total,
            accuracy: wins as f64 / total as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.team.cmp(&b.team))
    });
    rows.truncate(limit);
    rows
}

pub fn league_accuracy(picks: &[GradedPick]) -> Vec<LeagueAccuracy> {
    League::ALL
        .iter()
        .map(|&league| {
            let graded: Vec<&GradedPick> =
                picks.iter().filter(|p| p.league == league).collect();
            let wins = graded
                .iter()
                .filter(|p| p.result == PickOutcome::Win)
                .count();
            LeagueAccuracy {
                league,
                graded: graded.len(),
                wins,
                accuracy: if graded.is_empty() {
                    0.0
                } else {
                    wins as f64 / graded.len() as f64
                },
            }
        })
        .collect()
}

/// Net unit profit per calendar month of the grade date, ascending by
/// month key.
pub fn monthly_profit(picks: &[GradedPick]) -> Vec<MonthlyProfit> {
    let mut months: HashMap<String, Decimal> = HashMap::new();
    for pick in picks {
        let key = format!("{:04}-{:02}", pick.date.year(), pick.date.month());
        *months.entry(key).or_default() += odds::settle_unit_profit(pick.result);
    }

    let mut rows: Vec<MonthlyProfit> = months
        .into_iter()
        .map(|(month, profit)| MonthlyProfit { month, profit })
        .collect();
    rows.sort_by(|a, b| a.month.cmp(&b.month));
    rows
}

/// Risk bands by confidence: ≤0.55 high, (0.55, 0.65] medium, >0.65 low.
pub fn risk_profile(picks: &[GradedPick]) -> RiskProfile {
    if picks.is_empty() {
        return RiskProfile::default();
    }
    let total = picks.len() as f64;
    let high = picks.iter().filter(|p| p.conf <= 0.55).count() as f64;
    let medium = picks
        .iter()
        .filter(|p| p.conf > 0.55 && p.conf <= 0.65)
        .count() as f64;
    let low = picks.iter().filter(|p| p.conf > 0.65).count() as f64;
    RiskProfile {
        high_risk_pct: high / total * 100.0,
        medium_risk_pct: medium / total * 100.0,
        low_risk_pct: low / total * 100.0,
    }
}

pub fn avg_confidence(picks: &[GradedPick]) -> f64 {
    if picks.is_empty() {
        return 0.0;
    }
    picks.iter().map(|p| p.conf).sum::<f64>() / picks.len() as f64
}

/// Assemble the full read-only snapshot.
pub fn snapshot(history: &PickHistory, ledger: &BetLedger) -> AnalyticsSnapshot {
    let picks = history.picks();
    AnalyticsSnapshot {
        graded: history.graded_count(),
        accuracy: history.accuracy(),
        roi: history.roi(),
        total_profit_units: history.total_profit(),
        best_streak: history.best_streak(),
        current_streak: history.current_streak(),
        avg_confidence: avg_confidence(picks),
        max_drawdown: ledger.max_drawdown(),
        cumulative_profit: cumulative_profit(picks),
        bankroll_series: bankroll_series(ledger),
        confidence_buckets: confidence_buckets(picks),
        top_teams: top_teams(picks, 3, 5),
        league_accuracy: league_accuracy(picks),
        monthly_profit: monthly_profit(picks),
        risk_profile: risk_profile(picks),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{BetOutcome, Game};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn pick(
        away: &str,
        home: &str,
        picked: &str,
        conf: f64,
        result: PickOutcome,
        date: DateTime<Utc>,
    ) -> GradedPick {
        GradedPick {
            game_id: format!("{away}-{home}-{date}"),
            league: League::Nba,
            away: away.to_string(),
            home: home.to_string(),
            pick: picked.to_string(),
            spread: -2.0,
            total: 220.0,
            conf,
            result,
            date,
            profit: odds::settle_unit_profit(result),
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_cumulative_profit_sorted_by_date() {
        // Recorded out of order; the series sorts chronologically.
        let picks = vec![
            pick("A", "B", "B", 0.6, PickOutcome::Loss, day(2)),
            pick("C", "D", "D", 0.6, PickOutcome::Win, day(1)),
        ];
        let series = cumulative_profit(&picks);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].cumulative_profit, dec!(0.91));
        assert_eq!(series[1].cumulative_profit, dec!(-0.19));
    }

    #[test]
    fn test_cumulative_profit_empty() {
        assert!(cumulative_profit(&[]).is_empty());
    }

    #[test]
    fn test_bankroll_series_applies_deltas_in_order() {
        let mut ledger = BetLedger::load(Arc::new(MemoryStore::new())).unwrap();
        let a = ledger
            .place_bet(Game::new("Lakers", "Clippers"), None, dec!(2), -110)
            .unwrap();
        ledger.resolve_bet(a.id, BetOutcome::Win).unwrap();
        let b = ledger
            .place_bet(Game::new("Warriors", "Kings"), None, dec!(1), -110)
            .unwrap();
        ledger.resolve_bet(b.id, BetOutcome::Loss).unwrap();

        let series = bankroll_series(&ledger);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].bankroll, dec!(1000));
        assert_eq!(series[1].bankroll, dec!(1018.18));
        // Second bet risked 1 unit of the grown bankroll: $10.18.
        assert_eq!(series[2].bankroll, dec!(1008.00));
    }

    #[test]
    fn test_confidence_buckets_boundaries() {
        let picks = vec![
            pick("A", "B", "B", 0.55, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.60, PickOutcome::Win, day(1)), // inclusive low
            pick("A", "B", "B", 0.65, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.70, PickOutcome::Win, day(1)), // inclusive medium
            pick("A", "B", "B", 0.71, PickOutcome::Win, day(1)),
        ];
        let buckets = confidence_buckets(&picks);
        assert_eq!(
            buckets,
            ConfidenceBuckets {
                low: 2,
                medium: 2,
                high: 1
            }
        );
    }

    #[test]
    fn test_top_teams_requires_minimum_observations() {
        let mut picks = Vec::new();
        // Celtics appear 3 times, picked and winning twice.
        picks.push(pick("Celtics", "Knicks", "Celtics", 0.6, PickOutcome::Win, day(1)));
        picks.push(pick("Celtics", "Knicks", "Celtics", 0.6, PickOutcome::Win, day(2)));
        picks.push(pick("Celtics", "Knicks", "Knicks", 0.6, PickOutcome::Loss, day(3)));

        let rows = top_teams(&picks, 3, 5);
        // Both teams hit 3 observations.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team, "Celtics");
        assert_eq!(rows[0].wins, 2);
        assert_eq!(rows[0].total, 3);
        // Knicks were the pick once but lost: 0 wins.
        assert_eq!(rows[1].wins, 0);

        // Raise the floor and nobody qualifies.
        assert!(top_teams(&picks, 4, 5).is_empty());
    }

    #[test]
    fn test_top_teams_limit() {
        let mut picks = Vec::new();
        for i in 0..8 {
            let home = format!("H{i}");
            for d in 1..=3 {
                picks.push(pick("Away", &home, &home, 0.6, PickOutcome::Win, day(d)));
            }
        }
        let rows = top_teams(&picks, 3, 5);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_league_accuracy_empty_league_is_zero() {
        let picks = vec![pick("A", "B", "B", 0.6, PickOutcome::Win, day(1))];
        let rows = league_accuracy(&picks);
        let nba = rows.iter().find(|r| r.league == League::Nba).unwrap();
        let nfl = rows.iter().find(|r| r.league == League::Nfl).unwrap();
        assert!((nba.accuracy - 1.0).abs() < f64::EPSILON);
        assert_eq!(nfl.graded, 0);
        assert_eq!(nfl.accuracy, 0.0);
    }

    #[test]
    fn test_monthly_profit_buckets_by_month() {
        let picks = vec![
            pick("A", "B", "B", 0.6, PickOutcome::Win, day(5)),
            pick("A", "B", "B", 0.6, PickOutcome::Win, day(20)),
            pick(
                "A",
                "B",
                "B",
                0.6,
                PickOutcome::Loss,
                Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            ),
        ];
        let rows = monthly_profit(&picks);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "2026-01");
        assert_eq!(rows[0].profit, dec!(1.82));
        assert_eq!(rows[1].month, "2026-02");
        assert_eq!(rows[1].profit, dec!(-1.10));
    }

    #[test]
    fn test_risk_profile_shares() {
        let picks = vec![
            pick("A", "B", "B", 0.50, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.60, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.70, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.80, PickOutcome::Win, day(1)),
        ];
        let profile = risk_profile(&picks);
        assert!((profile.high_risk_pct - 25.0).abs() < f64::EPSILON);
        assert!((profile.medium_risk_pct - 25.0).abs() < f64::EPSILON);
        assert!((profile.low_risk_pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_confidence() {
        assert_eq!(avg_confidence(&[]), 0.0);
        let picks = vec![
            pick("A", "B", "B", 0.6, PickOutcome::Win, day(1)),
            pick("A", "B", "B", 0.8, PickOutcome::Win, day(1)),
        ];
        assert!((avg_confidence(&picks) - 0.7).abs() < 1e-10);
    }

    #[test]
    fn test_snapshot_on_empty_state() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let ledger = BetLedger::load(store.clone()).unwrap();
        let history = crate::history::PickHistory::load(store).unwrap();

        let snap = snapshot(&history, &ledger);
        assert_eq!(snap.graded, 0);
        assert_eq!(snap.accuracy, 0.0);
        assert_eq!(snap.roi, Decimal::ZERO);
        assert_eq!(snap.max_drawdown, Decimal::ZERO);
        assert!(snap.cumulative_profit.is_empty());
        assert_eq!(snap.bankroll_series.len(), 1);
        assert!(snap.top_teams.is_empty());
    }
}
