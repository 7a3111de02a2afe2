//! Core traits: the seams between the scheduler and the outside world.

pub mod probe;
pub mod sink;

pub use probe::AvailabilityProbe;
pub use sink::NotificationSink;
