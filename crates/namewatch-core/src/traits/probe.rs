//! Availability probe trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Availability;

/// Looks up whether an identifier currently has an owner.
///
/// An `Err` is non-committal: callers must not record a transition on it.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    /// Probe name (e.g., "mojang").
    fn name(&self) -> &str;

    /// Check a single identifier.
    async fn check(&self, identifier: &str) -> Result<Availability>;
}
