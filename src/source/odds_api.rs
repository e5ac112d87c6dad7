//! Odds-feed HTTP client.
//!
//! Pulls the day's games with opening lines from the BALLDONTLIE odds API
//! and turns each game into a prediction with a model-derived pick and
//! confidence.
//!
//! API: `https://api.balldontlie.io/{nba|nfl}/v1/odds?dates[]=YYYY-MM-DD`
//! Auth: API key in the `Authorization` header.
//!
//! A failed or misconfigured fetch for a league yields zero games for that
//! league, never an error: the engine runs fine on an empty slate.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::PredictionSource;
use crate::types::{League, Prediction};

const BASE_URL: &str = "https://api.balldontlie.io";
const PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// API response types (feed JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OddsResponse {
    #[serde(default)]
    data: Vec<OddsGame>,
}

/// One game row from the odds endpoint. Only the fields we consume.
#[derive(Debug, Deserialize)]
struct OddsGame {
    id: u64,
    game: GameInfo,
    /// Opening spread quoted against the home team.
    #[serde(default)]
    spread_open: Option<f64>,
    /// Opening over/under total.
    #[serde(default)]
    total_open: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GameInfo {
    date: DateTime<Utc>,
    home_team: TeamInfo,
    away_team: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    name: String,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub struct OddsApiSource {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl OddsApiSource {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("pickbook/0.1.0")
            .build()
            .context("Failed to build odds HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: SecretString::new(api_key),
        })
    }

    fn league_path(league: League) -> &'static str {
        match league {
            League::Nba => "nba",
            League::Nfl => "nfl",
        }
    }

    async fn fetch_league(&self, league: League, date: &str) -> Result<Vec<Prediction>> {
        let url = format!(
            "{}/{}/v1/odds?dates[]={date}&per_page={PER_PAGE}",
            self.base_url,
            Self::league_path(league),
        );

        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.api_key.expose_secret())
            .send()
            .await
            .with_context(|| format!("Odds request failed for {league}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("Odds API returned {} for {league}", resp.status());
        }

        let body: OddsResponse = resp
            .json()
            .await
            .with_context(|| format!("Invalid odds response for {league}"))?;

        let predictions: Vec<Prediction> = body
            .data
            .into_iter()
            .map(|game| analyze_game(game, league))
            .collect();

        debug!(league = %league, games = predictions.len(), "League slate fetched");
        Ok(predictions)
    }
}

#[async_trait]
impl PredictionSource for OddsApiSource {
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>> {
        let date = Utc::now().format("%Y-%m-%d").to_string();

        let mut slate = Vec::new();
        for &league in League::ALL {
            match self.fetch_league(league, &date).await {
                Ok(mut predictions) => slate.append(&mut predictions),
                Err(e) => {
                    // One dead league must not empty the whole slate.
                    warn!(league = %league, error = %e, "League fetch failed, skipping");
                }
            }
        }

        info!(games = slate.len(), date, "Prediction slate assembled");
        Ok(slate)
    }
}

// ---------------------------------------------------------------------------
// Pick model
// ---------------------------------------------------------------------------

/// Derive a pick and confidence from the opening line.
///
/// Home advantage plus a spread-proportional adjustment, with a team-name
/// hash standing in for a strength rating so the output is stable across
/// runs for the same matchup. Probability clamped to [0.1, 0.9].
fn analyze_game(game: OddsGame, league: League) -> Prediction {
    let spread = game.spread_open.unwrap_or(0.0);
    let total = game.total_open.unwrap_or(0.0);

    let home_advantage = 0.025;
    let spread_impact = spread.abs() * 0.015;
    let home_strength = team_strength(&game.game.home_team.name);
    let away_strength = team_strength(&game.game.away_team.name);

    let mut home_win_prob = 0.5 + home_advantage + (home_strength - away_strength) * 0.3;
    if spread < 0.0 {
        home_win_prob += spread_impact;
    } else {
        home_win_prob -= spread_impact;
    }
    let home_win_prob = home_win_prob.clamp(0.1, 0.9);

    let pick = if home_win_prob > 0.5 {
        game.game.home_team.name.clone()
    } else {
        game.game.away_team.name.clone()
    };
    let confidence = home_win_prob.max(1.0 - home_win_prob);

    Prediction {
        id: game.id.to_string(),
        league,
        commence_time: game.game.date,
        home_team: game.game.home_team.name,
        away_team: game.game.away_team.name,
        spread,
        total,
        pick,
        confidence,
    }
}

/// Map a team name to a stable strength rating in [0.3, 0.7].
fn team_strength(name: &str) -> f64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    let unit = (hasher.finish() % 10_000) as f64 / 10_000.0;
    0.3 + unit * 0.4
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
