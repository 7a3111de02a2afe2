//! Rolling-window call budgets.
//!
//! Each budget allows at most `limit` calls in any `window`. Once exhausted,
//! the next caller sleeps for the cooldown, and longer if the oldest call is
//! still inside the window.

use namewatch_core::error::Result;
use namewatch_core::traits::AvailabilityProbe;
use namewatch_core::types::Availability;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

pub struct CallBudget {
    name: &'static str,
    limit: u32,
    window: Duration,
    cooldown: Duration,
    /// Start times of the calls still inside the window, oldest first.
    calls: VecDeque<Instant>,
}

impl CallBudget {
    pub fn new(name: &'static str, limit: u32, window: Duration, cooldown: Duration) -> Self {
        Self {
            name,
            limit: limit.max(1),
            window,
            cooldown,
            calls: VecDeque::new(),
        }
    }

    /// Calls made within the last window.
    pub fn used(&self) -> u32 {
        self.calls.iter().filter(|at| at.elapsed() < self.window).count() as u32
    }

    /// Wait until one more call is allowed, then count it.
    pub async fn acquire(&mut self) {
        self.expire();
        if self.calls.len() >= self.limit as usize {
            tracing::info!(
                "{} budget of {} call(s) used up, cooling down for {}s",
                self.name,
                self.limit,
                self.cooldown.as_secs()
            );
            tokio::time::sleep(self.cooldown).await;
            self.expire();

            // Cooldown shorter than the window: wait out the oldest call.
            while self.calls.len() >= self.limit as usize {
                if let Some(&oldest) = self.calls.front() {
                    tokio::time::sleep_until(oldest + self.window).await;
                }
                self.expire();
            }
        }
        self.calls.push_back(Instant::now());
    }

    fn expire(&mut self) {
        while let Some(&oldest) = self.calls.front() {
            if oldest.elapsed() < self.window {
                break;
            }
            self.calls.pop_front();
        }
    }
}

/// An availability probe behind a call budget.
pub struct ThrottledProbe {
    probe: Arc<dyn AvailabilityProbe>,
    budget: CallBudget,
}

impl ThrottledProbe {
    pub fn new(probe: Arc<dyn AvailabilityProbe>, budget: CallBudget) -> Self {
        Self { probe, budget }
    }

    pub async fn check(&mut self, identifier: &str) -> Result<Availability> {
        self.budget.acquire().await;
        self.probe.check(identifier).await
    }

    pub fn budget(&self) -> &CallBudget {
        &self.budget
    }
}
