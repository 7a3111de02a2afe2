//! Sink used when no delivery endpoint is configured.

use async_trait::async_trait;
use namewatch_core::error::Result;
use namewatch_core::traits::NotificationSink;

pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    fn name(&self) -> &str { "noop" }

    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!("(not delivered) {message}");
        Ok(())
    }
}
