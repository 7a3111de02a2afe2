//! Alert dispatch.
//!
//! Wraps the notification sink with its call budget. Single alerts are sent
//! once; the final-stage alert is broadcast a fixed number of times.

use namewatch_core::traits::NotificationSink;
use std::sync::Arc;
use tokio::time::Duration;

use crate::budget::CallBudget;

/// Result of a broadcast: every attempt is made regardless of failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: u32,
    pub failed: u32,
}

pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    budget: CallBudget,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, budget: CallBudget) -> Self {
        Self { sink, budget }
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Send once. Failures are logged, not retried.
    pub async fn notify(&mut self, message: &str) -> bool {
        self.budget.acquire().await;
        match self.sink.send(message).await {
            Ok(()) => {
                tracing::debug!("Notification delivered via {}", self.sink.name());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send notification via {}: {e}", self.sink.name());
                false
            }
        }
    }

    /// Send the same message `count` times, `delay` apart.
    pub async fn broadcast(&mut self, message: &str, count: u32, delay: Duration) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        for attempt in 1..=count {
            if self.notify(message).await {
                outcome.delivered += 1;
            } else {
                outcome.failed += 1;
            }
            if attempt < count {
                tracing::debug!("Final alert {attempt}/{count} sent, next in {}s", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use namewatch_core::error::{NameWatchError, Result};
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(Instant, String)>>,
        fail_every_other: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str { "recording" }

        async fn send(&self, message: &str) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((Instant::now(), message.to_string()));
            if self.fail_every_other && sent.len() % 2 == 0 {
                return Err(NameWatchError::delivery("status 500"));
            }
            Ok(())
        }
    }

    fn notifier(sink: Arc<RecordingSink>, limit: u32) -> Notifier {
        let budget = CallBudget::new("sink", limit, Duration::from_secs(60), Duration::from_secs(60));
        Notifier::new(sink, budget)
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_once() {
        let sink = Arc::new(RecordingSink::default());
        let mut n = notifier(sink.clone(), 10);
        assert!(n.notify("hi").await);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_spacing_and_count() {
        let sink = Arc::new(RecordingSink::default());
        let mut n = notifier(sink.clone(), 300);
        let outcome = n.broadcast("final", 10, Duration::from_secs(60)).await;
        assert_eq!(outcome, BroadcastOutcome { delivered: 10, failed: 0 });

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 10);
        assert!(sent.iter().all(|(_, m)| m == "final"));
        for pair in sent.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= Duration::from_secs(60));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_continues_after_failures() {
        let sink = Arc::new(RecordingSink { fail_every_other: true, ..Default::default() });
        let mut n = notifier(sink.clone(), 300);
        let outcome = n.broadcast("final", 5, Duration::from_secs(1)).await;
        assert_eq!(outcome, BroadcastOutcome { delivered: 3, failed: 2 });
        assert_eq!(sink.sent.lock().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_respects_budget() {
        let sink = Arc::new(RecordingSink::default());
        // Budget of 2 per minute: the third send must wait the cooldown.
        let budget = CallBudget::new("sink", 2, Duration::from_secs(60), Duration::from_secs(60));
        let mut n = Notifier::new(sink.clone(), budget);
        let start = Instant::now();
        n.broadcast("final", 3, Duration::ZERO).await;
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(sink.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_zero_count_sends_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let mut n = notifier(sink.clone(), 10);
        let outcome = n.broadcast("final", 0, Duration::from_secs(60)).await;
        assert_eq!(outcome, BroadcastOutcome::default());
        assert!(sink.sent.lock().unwrap().is_empty());
    }
}
