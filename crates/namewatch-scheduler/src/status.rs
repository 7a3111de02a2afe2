//! Human-readable status of every tracked name.

use namewatch_core::types::PersistedState;
use std::collections::BTreeSet;

use crate::grace::{GraceThresholds, Stage};

/// Time remaining until a threshold, floor-divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl TimeLeft {
    /// Time from `now` until `first_seen + threshold`.
    pub fn until(threshold: i64, first_seen: i64, now: i64) -> Self {
        let left = threshold - (now - first_seen);
        Self {
            days: left.div_euclid(86_400),
            hours: left.rem_euclid(86_400) / 3_600,
            minutes: left.rem_euclid(3_600) / 60,
        }
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Days left: {}, Hours left: {}, Minutes left: {}",
            self.days, self.hours, self.minutes
        )
    }
}

/// One tracked name with its derived stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub name: String,
    pub first_seen: i64,
    pub stage: Stage,
    /// Time until the next stage; `None` once in the final stage.
    pub time_left: Option<TimeLeft>,
}

/// Stage and time-left for every record, in name order.
pub fn entries(state: &PersistedState, thresholds: &GraceThresholds, now: i64) -> Vec<StatusEntry> {
    state
        .iter()
        .map(|(name, &first_seen)| {
            let stage = thresholds.classify(now, first_seen);
            let time_left = match stage {
                Stage::Initial => Some(TimeLeft::until(thresholds.mid_stage(), first_seen, now)),
                Stage::MidStage => Some(TimeLeft::until(thresholds.final_stage(), first_seen, now)),
                Stage::FinalStage => None,
            };
            StatusEntry { name: name.clone(), first_seen, stage, time_left }
        })
        .collect()
}

/// Log the status block at info level.
pub fn log_status(taken: &BTreeSet<String>, entries: &[StatusEntry], thresholds: &GraceThresholds) {
    let rule = "=".repeat(80);
    let mid_days = thresholds.mid_stage() / 86_400;
    let final_days = thresholds.final_stage() / 86_400;

    tracing::info!("{rule}");
    tracing::info!("{:^80}", "Username Watch Status");
    tracing::info!("{rule}");

    tracing::info!("Taken usernames:");
    for name in taken {
        tracing::info!("- {name}");
    }

    tracing::info!("Initial stage (0-{mid_days} days):");
    for e in entries.iter().filter(|e| e.stage == Stage::Initial) {
        log_entry(e);
    }

    tracing::info!("Mid stage ({mid_days}-{final_days} days):");
    for e in entries.iter().filter(|e| e.stage == Stage::MidStage) {
        log_entry(e);
    }

    tracing::info!("Final stage (available for claiming):");
    for e in entries.iter().filter(|e| e.stage == Stage::FinalStage) {
        tracing::info!("- {}", e.name);
    }

    tracing::info!("{rule}");
}

fn log_entry(entry: &StatusEntry) {
    match entry.time_left {
        Some(left) => tracing::info!("- {} ({left})", entry.name),
        None => tracing::info!("- {}", entry.name),
    }
}
