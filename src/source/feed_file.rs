//! Local feed file source.
//!
//! Reads a pre-generated predictions document (the `latest-predictions.json`
//! artifact produced by the fetch pipeline) instead of hitting the odds API.
//! Useful offline and as the default when no API key is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

use super::PredictionSource;
use crate::types::{League, Prediction};

// ---------------------------------------------------------------------------
// Feed document types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    predictions: Vec<FeedPrediction>,
}

/// One prediction row as the fetch pipeline writes it. The `id` is numeric
/// in the feed; we keep it as a string internally.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedPrediction {
    id: serde_json::Value,
    sport: League,
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    spread: f64,
    #[serde(default)]
    total: f64,
    pick: String,
    confidence: f64,
}

impl From<FeedPrediction> for Prediction {
    fn from(row: FeedPrediction) -> Self {
        let id = match &row.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Prediction {
            id,
            league: row.sport,
            commence_time: row.commence_time,
            home_team: row.home_team,
            away_team: row.away_team,
            spread: row.spread,
            total: row.total,
            pick: row.pick,
            confidence: row.confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<FeedDocument> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read feed file {}", self.path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid feed document {}", self.path.display()))
    }
}

#[async_trait]
impl PredictionSource for FileSource {
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>> {
        let doc = match self.read_document() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Feed file unavailable, empty slate");
                return Ok(Vec::new());
            }
        };

        let slate: Vec<Prediction> = doc.predictions.into_iter().map(Into::into).collect();
        info!(games = slate.len(), path = %self.path.display(), "Prediction slate loaded from file");
        Ok(slate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "date": "2026-08-25",
        "timestamp": "2026-08-25T12:00:00Z",
        "totalGames": 2,
        "predictions": [
            {
                "id": 12345,
                "sport": "basketball_nba",
                "gameDate": "2026-08-25",
                "commenceTime": "2026-08-25T23:30:00Z",
                "homeTeam": "Clippers",
                "awayTeam": "Lakers",
                "spread": -3.5,
                "total": 221.5,
                "pick": "Clippers",
                "confidence": 0.64,
                "status": "scheduled"
            },
            {
                "id": 67890,
                "sport": "americanfootball_nfl",
                "commenceTime": "2026-08-26T00:15:00Z",
                "homeTeam": "Raiders",
                "awayTeam": "Chiefs",
                "spread": 7.0,
                "total": 44.5,
                "pick": "Chiefs",
                "confidence": 0.71
            }
        ]
    }"#;

    fn temp_feed(contents: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pickbook_feed_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&p, contents).unwrap();
        p
    }

    #[tokio::test]
    async fn test_loads_feed_document() {
        let path = temp_feed(FEED);
        let slate = FileSource::new(&path).fetch_predictions().await.unwrap();
        assert_eq!(slate.len(), 2);
        assert_eq!(slate[0].id, "12345");
        assert_eq!(slate[0].league, League::Nba);
        assert_eq!(slate[0].pick, "Clippers");
        assert_eq!(slate[1].league, League::Nfl);
        assert_eq!(slate[1].away_team, "Chiefs");
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_slate() {
        let source = FileSource::new("/nonexistent/latest-predictions.json");
        let slate = source.fetch_predictions().await.unwrap();
        assert!(slate.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_slate() {
        let path = temp_feed("not json at all");
        let slate = FileSource::new(&path).fetch_predictions().await.unwrap();
        assert!(slate.is_empty());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_mock_source() {
        use super::super::MockPredictionSource;

        let mut mock = MockPredictionSource::new();
        mock.expect_fetch_predictions()
            .returning(|| Ok(vec![crate::types::Prediction::sample()]));
        let slate = mock.fetch_predictions().await.unwrap();
        assert_eq!(slate.len(), 1);
    }
}
