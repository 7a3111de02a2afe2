//! The polling loop.
//!
//! `Idle → Checking → GracePeriodPass → Sleeping → Checking → …`, or a single
//! pass in build mode. Probe, delivery and persistence failures are handled
//! inside the cycle; a cycle that panics anyway is logged and the loop sleeps
//! as usual. Nothing short of build-mode completion ends `run`.

use futures::FutureExt;
use namewatch_core::clock::{Clock, SystemClock};
use namewatch_core::config::NameWatchConfig;
use namewatch_core::error::Result;
use namewatch_core::traits::{AvailabilityProbe, NotificationSink};
use namewatch_core::types::{Availability, PersistedState};
use std::collections::{BTreeSet, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Duration;

use crate::budget::{CallBudget, ThrottledProbe};
use crate::compose::{MessageComposer, MessageKind};
use crate::grace::{GracePeriodEngine, GraceThresholds};
use crate::notify::Notifier;
use crate::status;
use crate::store::StateStore;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Checking,
    GracePeriodPass,
    Sleeping,
    /// Build mode finished its single pass.
    Finished,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub newly_available: Vec<String>,
    pub taken: Vec<String>,
    /// Recorded names whose owner came back this cycle.
    pub reclaimed: Vec<String>,
    /// Names the probe could not answer for.
    pub skipped: Vec<String>,
    /// Names announced as entering the mid stage.
    pub mid_stage: Vec<String>,
    /// Names announced as free after the grace period.
    pub final_stage: Vec<String>,
    pub notifications_failed: u32,
    pub save_failures: u32,
}

pub struct PollingScheduler {
    usernames: Vec<String>,
    check_interval: Duration,
    initial_delay: Duration,
    build_mode: bool,
    final_burst_count: u32,
    final_burst_delay: Duration,

    store: StateStore,
    grace: GracePeriodEngine,
    composer: MessageComposer,
    probe: ThrottledProbe,
    notifier: Notifier,
    clock: Arc<dyn Clock>,

    phase: Phase,
    /// Every name seen taken this session.
    taken: BTreeSet<String>,
    announced_mid: HashSet<String>,
    announced_final: HashSet<String>,
}

impl PollingScheduler {
    pub fn new(
        config: &NameWatchConfig,
        probe: Arc<dyn AvailabilityProbe>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let thresholds = GraceThresholds::from_config(&config.grace)?;
        let usernames = config.usernames();
        if usernames.is_empty() {
            tracing::warn!("No usernames configured, cycles will only re-check stored records");
        }

        let probe_budget = CallBudget::new(
            "probe",
            config.probe.rate_limit,
            Duration::from_secs(config.probe.window_secs),
            Duration::from_secs(config.probe.cooldown_secs),
        );
        let sink_budget = CallBudget::new(
            "notify",
            config.notify.rate_limit,
            Duration::from_secs(config.notify.window_secs),
            Duration::from_secs(config.notify.cooldown_secs),
        );

        Ok(Self {
            usernames,
            check_interval: Duration::from_secs(config.watch.check_interval_secs),
            initial_delay: Duration::from_secs(config.watch.initial_delay_secs),
            build_mode: config.watch.build_mode,
            final_burst_count: config.notify.final_burst_count,
            final_burst_delay: Duration::from_secs(config.notify.final_burst_delay_secs),
            store: StateStore::new(config.state_path()),
            grace: GracePeriodEngine::new(thresholds),
            composer: MessageComposer::from_config(config),
            probe: ThrottledProbe::new(probe, probe_budget),
            notifier: Notifier::new(sink, sink_budget),
            clock: Arc::new(SystemClock),
            phase: Phase::Idle,
            taken: BTreeSet::new(),
            announced_mid: HashSet::new(),
            announced_final: HashSet::new(),
        })
    }

    /// Use a different clock for grace-period arithmetic.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different message composer.
    pub fn with_composer(mut self, composer: MessageComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Names seen taken so far this session.
    pub fn taken(&self) -> &BTreeSet<String> {
        &self.taken
    }

    /// Run until build mode completes; otherwise forever.
    pub async fn run(&mut self) {
        tracing::info!(
            "Watching {} username(s), alerting via {}, checking every {}s",
            self.usernames.len(),
            self.notifier.sink_name(),
            self.check_interval.as_secs()
        );

        if !self.initial_delay.is_zero() {
            tracing::info!("Waiting {}s before the first check", self.initial_delay.as_secs());
            tokio::time::sleep(self.initial_delay).await;
        }

        loop {
            let cycle = AssertUnwindSafe(self.run_cycle()).catch_unwind().await;
            match cycle {
                Ok(summary) => tracing::debug!("Cycle complete: {summary:?}"),
                Err(panic) => tracing::error!(
                    "An unexpected error occurred during a cycle: {}",
                    panic_message(panic.as_ref())
                ),
            }

            if self.build_mode {
                tracing::info!("Build mode enabled. Exiting after one pass.");
                self.phase = Phase::Finished;
                break;
            }

            self.phase = Phase::Sleeping;
            tokio::time::sleep(self.check_interval).await;
        }
    }

    /// One check pass followed by one grace-period pass.
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let mut state = self.store.load();

        self.phase = Phase::Checking;
        self.check_pass(&mut state, &mut summary).await;
        self.persist(&state, &mut summary);

        self.phase = Phase::GracePeriodPass;
        self.grace_pass(&mut state, &mut summary).await;
        self.persist(&state, &mut summary);

        let now = self.clock.now();
        let thresholds = *self.grace.thresholds();
        status::log_status(&self.taken, &status::entries(&state, &thresholds, now), &thresholds);

        self.phase = Phase::Idle;
        summary
    }

    async fn check_pass(&mut self, state: &mut PersistedState, summary: &mut CycleSummary) {
        let now = self.clock.now();
        let usernames = self.usernames.clone();

        for name in usernames {
            match self.probe.check(&name).await {
                Ok(Availability::Available) => {
                    self.taken.remove(&name);
                    if !state.contains_key(&name) {
                        tracing::info!("{name} is now available");
                        state.insert(name.clone(), now);
                        summary.newly_available.push(name);
                    }
                }
                Ok(Availability::Taken) => {
                    self.taken.insert(name.clone());
                    if state.remove(&name).is_some() {
                        tracing::info!("{name} was reclaimed");
                        self.forget(&name);
                        summary.reclaimed.push(name.clone());
                    }
                    summary.taken.push(name);
                }
                Err(e) => {
                    tracing::warn!("Skipping {name} this cycle: {e}");
                    summary.skipped.push(name);
                }
            }
        }

        if !summary.newly_available.is_empty() {
            let message = self.composer.compose(MessageKind::Initial, &summary.newly_available);
            if !self.notifier.notify(&message).await {
                summary.notifications_failed += 1;
            }
        }
    }

    async fn grace_pass(&mut self, state: &mut PersistedState, summary: &mut CycleSummary) {
        let now = self.clock.now();
        let report = self.grace.evaluate(state, now, &mut self.probe).await;

        for name in &report.reclaimed {
            self.taken.insert(name.clone());
            self.forget(name);
        }
        summary.reclaimed.extend(report.reclaimed.iter().cloned());

        let newly_mid: Vec<String> = report
            .mid_stage
            .iter()
            .filter(|name| self.announced_mid.insert((*name).clone()))
            .cloned()
            .collect();
        if !newly_mid.is_empty() {
            let message = self.composer.compose(MessageKind::MidStage, &newly_mid);
            if !self.notifier.notify(&message).await {
                summary.notifications_failed += 1;
            }
            summary.mid_stage = newly_mid;
        }

        let newly_final: Vec<String> = report
            .final_stage
            .iter()
            .filter(|name| self.announced_final.insert((*name).clone()))
            .cloned()
            .collect();
        if !newly_final.is_empty() {
            let message = self.composer.compose(MessageKind::FinalStage, &newly_final);
            tracing::info!(
                "Grace period over for {}, sending {} alerts",
                newly_final.join(", "),
                self.final_burst_count
            );
            let outcome = self
                .notifier
                .broadcast(&message, self.final_burst_count, self.final_burst_delay)
                .await;
            summary.notifications_failed += outcome.failed;
            summary.final_stage = newly_final;
        }

        // Announcements only matter while the record exists.
        self.announced_mid.retain(|name| state.contains_key(name));
        self.announced_final.retain(|name| state.contains_key(name));
    }

    fn persist(&self, state: &PersistedState, summary: &mut CycleSummary) {
        if let Err(e) = self.store.save(state) {
            tracing::error!("Error saving available usernames: {e}");
            summary.save_failures += 1;
        }
    }

    fn forget(&mut self, name: &str) {
        self.announced_mid.remove(name);
        self.announced_final.remove(name);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
