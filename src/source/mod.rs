//! Prediction sources.
//!
//! Defines the `PredictionSource` trait and the two implementations: the
//! odds-feed HTTP client and a local JSON feed file. Sources degrade to an
//! empty slate on failure; an unreachable feed never blocks the engine.

pub mod feed_file;
pub mod odds_api;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Prediction;

pub use feed_file::FileSource;
pub use odds_api::OddsApiSource;

/// Abstraction over where the day's picks come from.
///
/// How the pick and confidence are derived is the source's business; the
/// engine only consumes the resulting predictions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Fetch the current slate of predictions. Implementations return an
    /// empty slate rather than an error when the feed is unavailable.
    async fn fetch_predictions(&self) -> Result<Vec<Prediction>>;
}
