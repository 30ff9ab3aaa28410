use serde::{Deserialize, Serialize};
use tracing::warn;

/// Stored pointer to a chat channel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub channel_id: u64,
    #[serde(default)]
    pub guild_id: Option<u64>,
}

/// Stored pointer to a message, with the text it had when it was picked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub message_id: u64,
    pub channel: ChannelRef,
    #[serde(default)]
    pub content: String,
}

impl MessageRef {
    pub fn jump_url(&self) -> String {
        let guild = self
            .channel
            .guild_id
            .map_or_else(|| "@me".to_string(), |g| g.to_string());
        format!(
            "https://discord.com/channels/{}/{}/{}",
            guild, self.channel.channel_id, self.message_id
        )
    }
}

/// The one and only configuration record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupConfig {
    pub management_channel: Option<ChannelRef>,
    pub selected_post: Option<MessageRef>,
    /// Display order matters; duplicates carry no meaning.
    pub tracked_role_ids: Vec<u64>,
    /// Reaction strings in Discord's form (`❤️`, `<:tank:123>`).
    pub tracked_reactions: Vec<String>,
}

/// Fields to overwrite. `None` leaves the stored value untouched; for the
/// optional references `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupConfigUpdate {
    pub management_channel: Option<Option<ChannelRef>>,
    pub selected_post: Option<Option<MessageRef>>,
    pub tracked_role_ids: Option<Vec<u64>>,
    pub tracked_reactions: Option<Vec<String>>,
}

impl SignupConfigUpdate {
    pub fn management_channel(mut self, channel: ChannelRef) -> Self {
        self.management_channel = Some(Some(channel));
        self
    }

    pub fn selected_post(mut self, post: MessageRef) -> Self {
        self.selected_post = Some(Some(post));
        self
    }

    pub fn tracked_role_ids(mut self, ids: Vec<u64>) -> Self {
        self.tracked_role_ids = Some(ids);
        self
    }

    pub fn tracked_reactions(mut self, reactions: Vec<String>) -> Self {
        self.tracked_reactions = Some(reactions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.management_channel.is_none()
            && self.selected_post.is_none()
            && self.tracked_role_ids.is_none()
            && self.tracked_reactions.is_none()
    }

    /// Apply the set fields onto `config`.
    pub fn apply(&self, config: &mut SignupConfig) {
        if let Some(v) = &self.management_channel {
            config.management_channel = v.clone();
        }
        if let Some(v) = &self.selected_post {
            config.selected_post = v.clone();
        }
        if let Some(v) = &self.tracked_role_ids {
            config.tracked_role_ids = v.clone();
        }
        if let Some(v) = &self.tracked_reactions {
            config.tracked_reactions = v.clone();
        }
    }
}

/// Raw row; JSON columns are decoded leniently in [`SignupConfigRow::into_config`].
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SignupConfigRow {
    pub id: i64,
    pub management_channel: Option<String>,
    pub selected_post: Option<String>,
    pub gvg_roles: String,
    pub gvg_reacts: String,
}

impl SignupConfigRow {
    pub fn into_config(self) -> SignupConfig {
        SignupConfig {
            management_channel: decode_optional("management_channel", self.management_channel),
            selected_post: decode_optional("selected_post", self.selected_post),
            tracked_role_ids: decode_list("gvg_roles", &self.gvg_roles),
            tracked_reactions: decode_list("gvg_reacts", &self.gvg_reacts),
        }
    }
}

// A column that no longer parses reads as unset instead of failing the command.
fn decode_optional<T: serde::de::DeserializeOwned>(column: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(column, error = %e, "unreadable config column, treating as unset");
            None
        }
    }
}

fn decode_list<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(column, error = %e, "unreadable config list, treating as empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> MessageRef {
        MessageRef {
            message_id: 30,
            channel: ChannelRef { channel_id: 20, guild_id: Some(10) },
            content: "sign up!".into(),
        }
    }

    #[test]
    fn jump_url_uses_guild_channel_message() {
        assert_eq!(post().jump_url(), "https://discord.com/channels/10/20/30");
    }

    #[test]
    fn apply_only_touches_set_fields() {
        let mut cfg = SignupConfig {
            tracked_role_ids: vec![1, 2],
            tracked_reactions: vec!["❤️".into()],
            ..Default::default()
        };
        SignupConfigUpdate::default().selected_post(post()).apply(&mut cfg);
        assert_eq!(cfg.selected_post, Some(post()));
        assert_eq!(cfg.tracked_role_ids, vec![1, 2]);
        assert_eq!(cfg.tracked_reactions, vec!["❤️".to_string()]);
        assert!(cfg.management_channel.is_none());
    }

    #[test]
    fn garbage_columns_decode_as_unset() {
        let row = SignupConfigRow {
            id: 1,
            management_channel: Some("{not json".into()),
            selected_post: None,
            gvg_roles: "[5,6]".into(),
            gvg_reacts: "oops".into(),
        };
        let cfg = row.into_config();
        assert!(cfg.management_channel.is_none());
        assert_eq!(cfg.tracked_role_ids, vec![5, 6]);
        assert!(cfg.tracked_reactions.is_empty());
    }
}
