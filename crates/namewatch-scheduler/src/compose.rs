//! Alert text.
//!
//! One message per (stage, group of names). Each stage has a small bank of
//! interchangeable phrasings; one is picked at random per message.

use namewatch_core::config::NameWatchConfig;
use rand::seq::SliceRandom;

const DAY: i64 = 86_400;

/// Which alert is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Names that just became available.
    Initial,
    /// Names that crossed the first threshold.
    MidStage,
    /// Names whose grace period is over and are still free.
    FinalStage,
}

// Placeholders: {names} {grace_days} {mid_days} {remaining_days}
const INITIAL: &[&str] = &[
    "ALERT: {names} is now available on Minecraft! The original owner has {grace_days} days to reclaim it.",
    "ATTENTION: {names} is available on Minecraft but subject to the {grace_days}-day grace period. Keep an eye on it!",
];

const MID_STAGE: &[&str] = &[
    "UPDATE: It's been {mid_days} days since {names} became available. The original owner has {remaining_days} more days to reclaim it.",
    "REMINDER: {names} is still available on Minecraft. The {grace_days}-day grace period ends in {remaining_days} days.",
];

const FINAL_STAGE: &[&str] = &[
    "FINAL CALL: The {grace_days}-day grace period for {names} has ended. It's now fully available for claiming!",
    "LAST CHANCE: {names} is permanently available on Minecraft! Grab it now!",
];

pub struct MessageComposer {
    initial: Vec<String>,
    mid_stage: Vec<String>,
    final_stage: Vec<String>,
    info_url: String,
    lookup_url_template: String,
    mention: Option<String>,
    max_length: usize,
    mid_stage_secs: i64,
    final_stage_secs: i64,
}

impl MessageComposer {
    pub fn from_config(config: &NameWatchConfig) -> Self {
        let mention = config.notify.mention_user_id.trim();
        Self {
            initial: bank(INITIAL),
            mid_stage: bank(MID_STAGE),
            final_stage: bank(FINAL_STAGE),
            info_url: config.notify.info_url.clone(),
            lookup_url_template: config.notify.lookup_url_template.clone(),
            mention: (!mention.is_empty()).then(|| mention.to_string()),
            max_length: config.notify.max_message_length,
            mid_stage_secs: config.grace.mid_stage_secs,
            final_stage_secs: config.grace.final_stage_secs,
        }
    }

    /// Replace the phrasings for one kind. An empty bank is ignored.
    pub fn with_templates(mut self, kind: MessageKind, templates: Vec<String>) -> Self {
        if templates.is_empty() {
            tracing::warn!("Ignoring empty template bank for {kind:?}");
            return self;
        }
        *self.bank_mut(kind) = templates;
        self
    }

    pub fn templates(&self, kind: MessageKind) -> &[String] {
        match kind {
            MessageKind::Initial => &self.initial,
            MessageKind::MidStage => &self.mid_stage,
            MessageKind::FinalStage => &self.final_stage,
        }
    }

    fn bank_mut(&mut self, kind: MessageKind) -> &mut Vec<String> {
        match kind {
            MessageKind::Initial => &mut self.initial,
            MessageKind::MidStage => &mut self.mid_stage,
            MessageKind::FinalStage => &mut self.final_stage,
        }
    }

    /// Build the alert for `names`, truncated to the configured length.
    pub fn compose(&self, kind: MessageKind, names: &[String]) -> String {
        let template = self
            .templates(kind)
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("{names}");

        let mut full = self.render(template, names);
        if let Some(mention) = &self.mention {
            full.push_str(&format!("\n||<@{mention}>||"));
        }

        // Truncation wins over completeness, even if it cuts the mention.
        if full.chars().count() > self.max_length {
            full = full.chars().take(self.max_length).collect();
        }
        full
    }

    fn render(&self, template: &str, names: &[String]) -> String {
        let mut text = template.to_string();
        if names.len() > 1 {
            text = text.replace("is", "are").replace("it", "them");
        }
        let text = text
            .replace("{names}", &names.join(", "))
            .replace("{grace_days}", &(self.final_stage_secs / DAY).to_string())
            .replace("{mid_days}", &(self.mid_stage_secs / DAY).to_string())
            .replace(
                "{remaining_days}",
                &((self.final_stage_secs - self.mid_stage_secs) / DAY).to_string(),
            );

        let links: Vec<String> = names
            .iter()
            .map(|name| format!("<{}>", self.lookup_url_template.replace("{name}", name)))
            .collect();

        format!("{text}\n{}\n{}", self.info_url, links.join("\n"))
    }
}

fn bank(templates: &[&str]) -> Vec<String> {
    templates.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn composer() -> MessageComposer {
        let mut config = NameWatchConfig::default();
        config.notify.mention_user_id = "1234".into();
        MessageComposer::from_config(&config)
    }

    fn single(kind: MessageKind, template: &str) -> MessageComposer {
        composer().with_templates(kind, vec![template.to_string()])
    }

    #[test]
    fn test_every_bank_has_alternatives() {
        let c = composer();
        for kind in [MessageKind::Initial, MessageKind::MidStage, MessageKind::FinalStage] {
            assert!(c.templates(kind).len() >= 2, "{kind:?}");
        }
    }

    #[test]
    fn test_layout_single_name() {
        let c = single(MessageKind::Initial, "ALERT: {names} is free, grab it.");
        let msg = c.compose(MessageKind::Initial, &names(&["alice"]));
        assert_eq!(
            msg,
            "ALERT: alice is free, grab it.\n\
             https://www.minecraft.net/en-us/msaprofile/mygames/editprofile\n\
             <https://namemc.com/search?q=alice>\n\
             ||<@1234>||"
        );
    }

    #[test]
    fn test_plural_substitution() {
        let c = single(MessageKind::Initial, "ALERT: {names} is free, grab it.");
        let msg = c.compose(MessageKind::Initial, &names(&["alice", "bob"]));
        assert!(msg.starts_with("ALERT: alice, bob are free, grab them.\n"));
        assert!(msg.contains("<https://namemc.com/search?q=alice>\n<https://namemc.com/search?q=bob>"));
    }

    #[test]
    fn test_plural_leaves_names_alone() {
        let c = single(MessageKind::Initial, "{names} is free");
        let msg = c.compose(MessageKind::Initial, &names(&["chris", "kit"]));
        assert!(msg.starts_with("chris, kit are free\n"));
    }

    #[test]
    fn test_singular_not_substituted() {
        let c = composer();
        for _ in 0..20 {
            let msg = c.compose(MessageKind::FinalStage, &names(&["alice"]));
            assert!(!msg.contains(" are "));
            assert!(!msg.contains("them"));
        }
    }

    #[test]
    fn test_picks_from_bank() {
        let c = composer();
        let rendered: Vec<String> = c
            .templates(MessageKind::MidStage)
            .iter()
            .map(|t| c.render(t, &names(&["alice"])))
            .collect();
        for _ in 0..20 {
            let msg = c.compose(MessageKind::MidStage, &names(&["alice"]));
            let body = msg.strip_suffix("\n||<@1234>||").unwrap();
            assert!(rendered.iter().any(|r| r == body), "unexpected: {msg}");
        }
    }

    #[test]
    fn test_day_placeholders() {
        let c = single(
            MessageKind::MidStage,
            "{mid_days}/{grace_days}/{remaining_days}",
        );
        let msg = c.compose(MessageKind::MidStage, &names(&["alice"]));
        assert!(msg.starts_with("30/37/7\n"));
    }

    #[test]
    fn test_no_mention_when_unset() {
        let c = MessageComposer::from_config(&NameWatchConfig::default());
        let msg = c.compose(MessageKind::Initial, &names(&["alice"]));
        assert!(!msg.contains("||"));
        assert!(msg.ends_with("<https://namemc.com/search?q=alice>"));
    }

    #[test]
    fn test_length_never_exceeds_max() {
        let many: Vec<String> = (0..200).map(|i| format!("player{i:03}")).collect();
        let c = composer();
        for kind in [MessageKind::Initial, MessageKind::MidStage, MessageKind::FinalStage] {
            let msg = c.compose(kind, &many);
            assert_eq!(msg.chars().count(), 2000);
        }
    }

    #[test]
    fn test_truncation_counts_characters() {
        let mut config = NameWatchConfig::default();
        config.notify.max_message_length = 5;
        let c = MessageComposer::from_config(&config)
            .with_templates(MessageKind::Initial, vec!["ééééééé {names}".into()]);
        assert_eq!(c.compose(MessageKind::Initial, &names(&["a"])), "ééééé");
    }

    // Known edge case: truncation may cut the mention token off entirely or
    // leave half of it. Kept as observed behavior.
    #[test]
    fn test_truncation_can_cut_mention() {
        let base = single(MessageKind::Initial, "{names} is free");
        let untruncated = base.compose(MessageKind::Initial, &names(&["alice"]));

        let mut config = NameWatchConfig::default();
        config.notify.mention_user_id = "1234".into();
        config.notify.max_message_length = untruncated.chars().count() - 5;
        let c = MessageComposer::from_config(&config)
            .with_templates(MessageKind::Initial, vec!["{names} is free".into()]);

        let msg = c.compose(MessageKind::Initial, &names(&["alice"]));
        assert!(msg.ends_with("||<@12"));
        assert!(!msg.contains("<@1234>"));
    }

    #[test]
    fn test_empty_bank_ignored() {
        let c = composer().with_templates(MessageKind::Initial, vec![]);
        assert_eq!(c.templates(MessageKind::Initial).len(), INITIAL.len());
    }
}
