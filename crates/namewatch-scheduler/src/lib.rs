//! # NameWatch Scheduler
//!
//! The long-running half of NameWatch: probe watched names, remember when
//! each became available, and alert as it moves through the grace period.
//!
//! ## Design Principles
//! - File-based persistence (JSON), one human-readable state file
//! - Tokio timers only; every wait is an explicit sleep
//! - Stages are derived from timestamps every cycle, never stored
//! - A failed cycle is logged and the loop carries on
//!
//! ## Architecture
//! ```text
//! PollingScheduler (one cycle per check interval)
//!   ├── check pass: ThrottledProbe → StateStore → Initial alert
//!   ├── grace pass: GracePeriodEngine (re-probes FinalStage)
//!   │                 ├── MidStage → one alert
//!   │                 └── FinalStage → burst of N alerts
//!   └── Notifier (sink + call budget) ← MessageComposer
//! ```

pub mod budget;
pub mod compose;
pub mod engine;
pub mod grace;
pub mod notify;
pub mod status;
pub mod store;

pub use budget::{CallBudget, ThrottledProbe};
pub use compose::{MessageComposer, MessageKind};
pub use engine::{CycleSummary, Phase, PollingScheduler};
pub use grace::{GracePeriodEngine, GraceReport, GraceThresholds, Stage};
pub use notify::{BroadcastOutcome, Notifier};
pub use status::{StatusEntry, TimeLeft};
pub use store::StateStore;
