//! # NameWatch Channels
//! Where alerts go: a Discord webhook, or nowhere when none is configured.

pub mod discord;
pub mod noop;

use namewatch_core::config::NotifyConfig;
use namewatch_core::error::Result;
use namewatch_core::traits::NotificationSink;

pub use discord::DiscordWebhook;
pub use noop::NoopSink;

/// Pick the sink for a config: the webhook if a URL is set, otherwise a
/// sink that only logs.
pub fn sink_from_config(config: &NotifyConfig) -> Result<Box<dyn NotificationSink>> {
    if config.webhook_url.trim().is_empty() {
        tracing::warn!("No webhook URL configured, notifications will only be logged");
        Ok(Box::new(NoopSink))
    } else {
        Ok(Box::new(DiscordWebhook::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_from_config() {
        let mut config = NotifyConfig::default();
        assert_eq!(sink_from_config(&config).unwrap().name(), "noop");

        config.webhook_url = "https://discord.com/api/webhooks/1/abc".into();
        assert_eq!(sink_from_config(&config).unwrap().name(), "discord");
    }
}
