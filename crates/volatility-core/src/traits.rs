use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AnalysisError, InsightDigest, PricePoint};

/// Trait for daily price history sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, AnalysisError>;
}

/// Trait for optional natural-language commentary providers.
///
/// `Ok(None)` means the provider is unavailable (missing credential, upstream
/// failure); the analysis must proceed without commentary in that case.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn summarize(&self, digest: &InsightDigest) -> Result<Option<String>, AnalysisError>;
}
