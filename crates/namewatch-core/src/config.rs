//! Configuration for NameWatch.
//!
//! Loaded from `~/.namewatch/config.toml` (or an explicit path), then
//! overridden by environment variables. Every field has a default so an empty
//! file, or no file at all, is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{NameWatchError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameWatchConfig {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub grace: GraceConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// What to watch and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub usernames: Vec<String>,
    /// Path of the JSON state file. `~` is expanded.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default)]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_usernames")]
    pub max_usernames: usize,
    /// Run a single cycle and exit.
    #[serde(default)]
    pub build_mode: bool,
}

/// Grace-period thresholds, in seconds since first seen available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraceConfig {
    #[serde(default = "default_mid_stage")]
    pub mid_stage_secs: i64,
    #[serde(default = "default_final_stage")]
    pub final_stage_secs: i64,
}

/// Availability lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Lookup URL with a `{name}` placeholder.
    #[serde(default = "default_probe_url")]
    pub url_template: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Calls allowed per window before a cooldown.
    #[serde(default = "default_probe_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_window")]
    pub window_secs: u64,
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Discord webhook URL. Empty disables delivery.
    #[serde(default)]
    pub webhook_url: String,
    /// Discord user id to mention. Empty omits the mention.
    #[serde(default)]
    pub mention_user_id: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_sink_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_window")]
    pub window_secs: u64,
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// How many times the final-stage alert is sent.
    #[serde(default = "default_final_burst_count")]
    pub final_burst_count: u32,
    #[serde(default = "default_final_burst_delay")]
    pub final_burst_delay_secs: u64,
    #[serde(default = "default_info_url")]
    pub info_url: String,
    /// Per-identifier lookup link with a `{name}` placeholder.
    #[serde(default = "default_lookup_url")]
    pub lookup_url_template: String,
}

fn default_state_file() -> String { "~/.namewatch/available_usernames.json".into() }
fn default_check_interval() -> u64 { 3600 }
fn default_max_usernames() -> usize { 100 }
fn default_mid_stage() -> i64 { 2_592_000 }
fn default_final_stage() -> i64 { 3_196_800 }
fn default_probe_url() -> String { "https://api.mojang.com/users/profiles/minecraft/{name}".into() }
fn default_timeout() -> u64 { 5 }
fn default_probe_rate_limit() -> u32 { 60 }
fn default_sink_rate_limit() -> u32 { 300 }
fn default_window() -> u64 { 60 }
fn default_cooldown() -> u64 { 60 }
fn default_max_message_length() -> usize { 2000 }
fn default_final_burst_count() -> u32 { 10 }
fn default_final_burst_delay() -> u64 { 60 }
fn default_info_url() -> String { "https://www.minecraft.net/en-us/msaprofile/mygames/editprofile".into() }
fn default_lookup_url() -> String { "https://namemc.com/search?q={name}".into() }

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            usernames: vec![],
            state_file: default_state_file(),
            check_interval_secs: default_check_interval(),
            initial_delay_secs: 0,
            max_usernames: default_max_usernames(),
            build_mode: false,
        }
    }
}

impl Default for GraceConfig {
    fn default() -> Self {
        Self {
            mid_stage_secs: default_mid_stage(),
            final_stage_secs: default_final_stage(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url_template: default_probe_url(),
            timeout_secs: default_timeout(),
            rate_limit: default_probe_rate_limit(),
            window_secs: default_window(),
            cooldown_secs: default_cooldown(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            mention_user_id: String::new(),
            timeout_secs: default_timeout(),
            rate_limit: default_sink_rate_limit(),
            window_secs: default_window(),
            cooldown_secs: default_cooldown(),
            max_message_length: default_max_message_length(),
            final_burst_count: default_final_burst_count(),
            final_burst_delay_secs: default_final_burst_delay(),
            info_url: default_info_url(),
            lookup_url_template: default_lookup_url(),
        }
    }
}

impl NameWatchConfig {
    /// NameWatch home directory (`~/.namewatch`).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".namewatch")
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load the default config file if present, then apply the environment.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::parse_file(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, then apply the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NameWatchError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let mut config = Self::parse_file(path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this config as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| NameWatchError::config(format!("serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("MINECRAFT_USERNAMES") {
            self.watch.usernames = v.split(',').map(String::from).collect();
        }
        if let Some(v) = get("DISCORD_WEBHOOK_URL") {
            self.notify.webhook_url = v;
        }
        if let Some(v) = get("DISCORD_USER_ID") {
            self.notify.mention_user_id = v;
        }
        if let Some(v) = get("AVAILABLE_USERNAMES_FILE") {
            self.watch.state_file = v;
        }
        if let Some(v) = get("BUILD") {
            self.watch.build_mode = v.trim() == "1";
        }

        override_parsed(&get, "MOJANG_API_RATE_LIMIT", &mut self.probe.rate_limit);
        override_parsed(&get, "DISCORD_API_RATE_LIMIT", &mut self.notify.rate_limit);
        override_parsed(&get, "INITIAL_DELAY", &mut self.watch.initial_delay_secs);
        override_parsed(&get, "THIRTY_DAY_DELAY", &mut self.grace.mid_stage_secs);
        override_parsed(&get, "THIRTY_SEVEN_DAY_DELAY", &mut self.grace.final_stage_secs);
        override_parsed(&get, "CHECK_INTERVAL", &mut self.watch.check_interval_secs);
        override_parsed(&get, "MAX_USERNAMES", &mut self.watch.max_usernames);
        override_parsed(&get, "MAX_MESSAGE_LENGTH", &mut self.notify.max_message_length);
        override_parsed(&get, "MAX_DISCORD_NOTIFICATIONS", &mut self.notify.final_burst_count);

        let mut timeout = self.probe.timeout_secs;
        if override_parsed(&get, "REQUEST_TIMEOUT", &mut timeout) {
            self.probe.timeout_secs = timeout;
            self.notify.timeout_secs = timeout;
        }
    }

    /// Check invariants that make the grace-period state machine well-formed.
    ///
    /// Zero rate limits are raised to 1 rather than rejected.
    pub fn validate(&mut self) -> Result<()> {
        if self.grace.mid_stage_secs < 0 {
            return Err(NameWatchError::config("grace.mid_stage_secs must not be negative"));
        }
        if self.grace.final_stage_secs < self.grace.mid_stage_secs {
            return Err(NameWatchError::config(format!(
                "grace.final_stage_secs ({}) must be >= grace.mid_stage_secs ({})",
                self.grace.final_stage_secs, self.grace.mid_stage_secs
            )));
        }
        if self.probe.rate_limit == 0 {
            tracing::warn!("probe.rate_limit is 0, using 1");
            self.probe.rate_limit = 1;
        }
        if self.notify.rate_limit == 0 {
            tracing::warn!("notify.rate_limit is 0, using 1");
            self.notify.rate_limit = 1;
        }
        Ok(())
    }

    /// Watched usernames: trimmed, de-duplicated, empties dropped, capped at
    /// `max_usernames`.
    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for raw in &self.watch.usernames {
            let name = raw.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if names.len() > self.watch.max_usernames {
            tracing::warn!(
                "Watching {} usernames, ignoring {} beyond max_usernames",
                self.watch.max_usernames,
                names.len() - self.watch.max_usernames
            );
            names.truncate(self.watch.max_usernames);
        }
        names
    }

    /// State file path with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.watch.state_file).into_owned())
    }
}

/// Parse `key` from `get` into `target`. Returns whether it was applied.
fn override_parsed<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> bool {
    let Some(raw) = get(key) else {
        return false;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            *target = value;
            true
        }
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw:?}: not a valid number");
            false
        }
    }
}
