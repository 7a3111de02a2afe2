//! Notification sink trait.

use async_trait::async_trait;

use crate::error::Result;

/// Delivers a rendered alert somewhere a human will see it.
///
/// Implementations make exactly one attempt per call; repetition is the
/// caller's decision.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sink name (e.g., "discord").
    fn name(&self) -> &str;

    /// Attempt delivery once.
    async fn send(&self, message: &str) -> Result<()>;
}
