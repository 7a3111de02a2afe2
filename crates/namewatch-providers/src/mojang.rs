//! Mojang profile lookup probe.
//!
//! `GET {url_template}` with the name substituted: 404 means nobody owns the
//! name, any 2xx means someone does. Everything else is an error and says
//! nothing about availability.

use async_trait::async_trait;
use namewatch_core::config::ProbeConfig;
use namewatch_core::error::{NameWatchError, Result};
use namewatch_core::traits::AvailabilityProbe;
use namewatch_core::types::Availability;
use std::time::Duration;

pub struct MojangProbe {
    url_template: String,
    client: reqwest::Client,
}

impl MojangProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("NameWatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NameWatchError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            url_template: config.url_template.clone(),
            client,
        })
    }

    fn lookup_url(&self, identifier: &str) -> String {
        self.url_template
            .replace("{name}", &urlencoding::encode(identifier))
    }
}

#[async_trait]
impl AvailabilityProbe for MojangProbe {
    fn name(&self) -> &str { "mojang" }

    async fn check(&self, identifier: &str) -> Result<Availability> {
        let url = self.lookup_url(identifier);
        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                NameWatchError::Timeout(format!("lookup for {identifier} timed out"))
            } else {
                NameWatchError::probe(format!("lookup for {identifier} failed: {e}"))
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("{identifier}: not found (available)");
            Ok(Availability::Available)
        } else if status.is_success() {
            tracing::debug!("{identifier}: profile exists (taken)");
            Ok(Availability::Taken)
        } else {
            Err(NameWatchError::probe(format!(
                "lookup for {identifier} returned unexpected status {status}"
            )))
        }
    }
}
