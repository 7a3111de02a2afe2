//! # NameWatch Core
//! Shared building blocks for NameWatch: the error taxonomy, configuration,
//! clock, and the traits every probe and notification channel implements.

pub mod clock;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NameWatchConfig;
pub use error::{NameWatchError, Result};
pub use traits::{AvailabilityProbe, NotificationSink};
pub use types::{Availability, PersistedState};
