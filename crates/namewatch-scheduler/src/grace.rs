//! Grace-period stages.
//!
//! A record's stage is a pure function of how long ago it was first seen
//! available. Nothing about the stage is stored; it is recomputed from the
//! timestamp on every cycle.

use namewatch_core::config::GraceConfig;
use namewatch_core::error::{NameWatchError, Result};
use namewatch_core::types::{Availability, PersistedState};

use crate::budget::ThrottledProbe;

/// Where a record sits in the grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tracked, nothing to announce yet.
    Initial,
    /// Past the first threshold; release is approaching.
    MidStage,
    /// Past the final threshold; must be re-probed live.
    FinalStage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Stage::Initial => "initial",
            Stage::MidStage => "mid-stage",
            Stage::FinalStage => "final-stage",
        })
    }
}

/// The two stage boundaries. Always `mid_stage <= final_stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraceThresholds {
    mid_stage: i64,
    final_stage: i64,
}

impl GraceThresholds {
    pub fn new(mid_stage: i64, final_stage: i64) -> Result<Self> {
        if mid_stage < 0 || final_stage < mid_stage {
            return Err(NameWatchError::config(format!(
                "invalid grace thresholds: mid={mid_stage}s final={final_stage}s"
            )));
        }
        Ok(Self { mid_stage, final_stage })
    }

    pub fn from_config(config: &GraceConfig) -> Result<Self> {
        Self::new(config.mid_stage_secs, config.final_stage_secs)
    }

    pub fn mid_stage(&self) -> i64 { self.mid_stage }

    pub fn final_stage(&self) -> i64 { self.final_stage }

    /// Classify a record first seen at `first_seen`, as of `now`.
    pub fn classify(&self, now: i64, first_seen: i64) -> Stage {
        classify(now, first_seen, self)
    }
}

impl Default for GraceThresholds {
    fn default() -> Self {
        Self { mid_stage: 2_592_000, final_stage: 3_196_800 }
    }
}

/// Stage for elapsed time `now - first_seen`. A timestamp in the future
/// (clock skew) counts as just seen.
pub fn classify(now: i64, first_seen: i64, thresholds: &GraceThresholds) -> Stage {
    let elapsed = now.saturating_sub(first_seen);
    if elapsed < thresholds.mid_stage {
        Stage::Initial
    } else if elapsed < thresholds.final_stage {
        Stage::MidStage
    } else {
        Stage::FinalStage
    }
}

/// What one grace pass found, by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraceReport {
    pub initial: Vec<String>,
    pub mid_stage: Vec<String>,
    /// FinalStage and confirmed still available.
    pub final_stage: Vec<String>,
    /// FinalStage but taken again; removed from state.
    pub reclaimed: Vec<String>,
    /// FinalStage but the probe failed; left as is.
    pub unresolved: Vec<String>,
}

pub struct GracePeriodEngine {
    thresholds: GraceThresholds,
}

impl GracePeriodEngine {
    pub fn new(thresholds: GraceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &GraceThresholds {
        &self.thresholds
    }

    /// Classify every record and resolve the ones in the final stage.
    ///
    /// Records whose owner came back are removed from `state`.
    pub async fn evaluate(
        &self,
        state: &mut PersistedState,
        now: i64,
        probe: &mut ThrottledProbe,
    ) -> GraceReport {
        let mut report = GraceReport::default();
        let mut final_candidates = Vec::new();

        for (name, &first_seen) in state.iter() {
            match self.thresholds.classify(now, first_seen) {
                Stage::Initial => report.initial.push(name.clone()),
                Stage::MidStage => report.mid_stage.push(name.clone()),
                Stage::FinalStage => final_candidates.push(name.clone()),
            }
        }

        for name in final_candidates {
            match probe.check(&name).await {
                Ok(Availability::Available) => report.final_stage.push(name),
                Ok(Availability::Taken) => {
                    tracing::info!("{name} was reclaimed at the end of its grace period");
                    state.remove(&name);
                    report.reclaimed.push(name);
                }
                Err(e) => {
                    tracing::warn!("Could not re-check {name}, leaving it for the next cycle: {e}");
                    report.unresolved.push(name);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::CallBudget;
    use async_trait::async_trait;
    use namewatch_core::traits::AvailabilityProbe;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::time::Duration;

    const DAY: i64 = 86_400;

    struct ScriptedProbe {
        answers: HashMap<String, Option<Availability>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AvailabilityProbe for ScriptedProbe {
        fn name(&self) -> &str { "scripted" }

        async fn check(&self, identifier: &str) -> Result<Availability> {
            self.calls.lock().unwrap().push(identifier.to_string());
            match self.answers.get(identifier).copied().flatten() {
                Some(a) => Ok(a),
                None => Err(NameWatchError::probe("boom")),
            }
        }
    }

    fn throttled(answers: &[(&str, Option<Availability>)]) -> (ThrottledProbe, Arc<ScriptedProbe>) {
        let probe = Arc::new(ScriptedProbe {
            answers: answers.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            calls: Mutex::new(vec![]),
        });
        let budget = CallBudget::new("probe", 100, Duration::from_secs(60), Duration::from_secs(60));
        (ThrottledProbe::new(probe.clone(), budget), probe)
    }

    #[test]
    fn test_classify_boundaries() {
        let t = GraceThresholds::new(30 * DAY, 37 * DAY).unwrap();
        let now = 1_000 * DAY;
        assert_eq!(classify(now, now, &t), Stage::Initial);
        assert_eq!(classify(now, now - 30 * DAY + 1, &t), Stage::Initial);
        assert_eq!(classify(now, now - 30 * DAY, &t), Stage::MidStage);
        assert_eq!(classify(now, now - 37 * DAY + 1, &t), Stage::MidStage);
        assert_eq!(classify(now, now - 37 * DAY, &t), Stage::FinalStage);
        assert_eq!(classify(now, 0, &t), Stage::FinalStage);
    }

    #[test]
    fn test_classify_is_exhaustive_over_elapsed() {
        let t = GraceThresholds::new(10, 20).unwrap();
        for elapsed in 0..40 {
            let expected = if elapsed < 10 {
                Stage::Initial
            } else if elapsed < 20 {
                Stage::MidStage
            } else {
                Stage::FinalStage
            };
            assert_eq!(t.classify(1_000 + elapsed, 1_000), expected, "elapsed={elapsed}");
        }
    }

    #[test]
    fn test_stage_display_pads() {
        assert_eq!(format!("{:<10}|", Stage::Initial), "initial   |");
        assert_eq!(Stage::FinalStage.to_string(), "final-stage");
    }

    #[test]
    fn test_future_timestamp_is_initial() {
        let t = GraceThresholds::default();
        assert_eq!(t.classify(100, 500), Stage::Initial);
    }

    #[test]
    fn test_equal_thresholds_skip_mid_stage() {
        let t = GraceThresholds::new(10, 10).unwrap();
        assert_eq!(t.classify(9, 0), Stage::Initial);
        assert_eq!(t.classify(10, 0), Stage::FinalStage);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(GraceThresholds::new(20, 10).is_err());
        assert!(GraceThresholds::new(-1, 10).is_err());
        let config = GraceConfig { mid_stage_secs: 5, final_stage_secs: 4 };
        assert!(GraceThresholds::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_evaluate_only_probes_final_stage() {
        let engine = GracePeriodEngine::new(GraceThresholds::new(30 * DAY, 37 * DAY).unwrap());
        let now = 100 * DAY;
        let mut state = PersistedState::new();
        state.insert("fresh".into(), now - DAY);
        state.insert("middle".into(), now - 31 * DAY);
        state.insert("done".into(), now - 40 * DAY);

        let (mut probe, inner) = throttled(&[("done", Some(Availability::Available))]);
        let report = engine.evaluate(&mut state, now, &mut probe).await;

        assert_eq!(report.initial, vec!["fresh"]);
        assert_eq!(report.mid_stage, vec!["middle"]);
        assert_eq!(report.final_stage, vec!["done"]);
        assert!(report.reclaimed.is_empty());
        assert_eq!(*inner.calls.lock().unwrap(), vec!["done"]);
        // Terminal-available records stay.
        assert_eq!(state.len(), 3);
    }

    #[tokio::test]
    async fn test_evaluate_removes_reclaimed() {
        let engine = GracePeriodEngine::new(GraceThresholds::default());
        let now = 100 * DAY;
        let mut state = PersistedState::new();
        state.insert("gone".into(), now - 38 * DAY);

        let (mut probe, _) = throttled(&[("gone", Some(Availability::Taken))]);
        let report = engine.evaluate(&mut state, now, &mut probe).await;

        assert_eq!(report.reclaimed, vec!["gone"]);
        assert!(report.final_stage.is_empty());
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_evaluate_probe_error_is_non_committal() {
        let engine = GracePeriodEngine::new(GraceThresholds::default());
        let now = 100 * DAY;
        let mut state = PersistedState::new();
        state.insert("flaky".into(), now - 38 * DAY);

        let (mut probe, _) = throttled(&[("flaky", None)]);
        let report = engine.evaluate(&mut state, now, &mut probe).await;

        assert_eq!(report.unresolved, vec!["flaky"]);
        assert!(report.final_stage.is_empty());
        assert!(report.reclaimed.is_empty());
        assert!(state.contains_key("flaky"));
    }
}
