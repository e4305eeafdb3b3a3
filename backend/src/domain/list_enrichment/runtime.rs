//! Production runtime helpers for the list enricher.

use std::time::Duration;

use async_trait::async_trait;

use super::EnrichmentSleeper;

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl EnrichmentSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
