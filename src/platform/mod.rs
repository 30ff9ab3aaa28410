//! Narrow view of the chat platform that the signup logic depends on.
//!
//! Everything that talks to Discord for the aggregation goes through
//! [`Platform`], so the resolver, aggregator and roster code can be exercised
//! against [`fake::FakePlatform`] in tests.

pub mod discord;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::error::BotResult;
use crate::signup::reaction::ReactionKey;

/// A text-capable channel the bot can post in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: u64,
    pub guild_id: Option<u64>,
    pub name: String,
    pub text_capable: bool,
}

/// A fetched message, reduced to what the aggregation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub content: String,
    /// Reactions in the order the platform lists them.
    pub reactions: Vec<ReactionKey>,
}

/// Someone who reacted to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactingUser {
    pub id: u64,
    pub bot: bool,
}

/// A guild member as seen by the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupMember {
    pub id: u64,
    pub display_name: String,
    pub avatar_url: String,
    pub role_ids: Vec<u64>,
}

impl SignupMember {
    pub fn has_role(&self, role_id: u64) -> bool {
        self.role_ids.contains(&role_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: u64,
    pub name: String,
    /// `#rrggbb`
    pub colour: String,
    pub position: u16,
    /// The implicit `@everyone` role.
    pub is_default: bool,
}

/// Custom emoji known to a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildEmoji {
    pub id: u64,
    pub name: String,
    pub animated: bool,
}

/// Lookups return `Ok(None)` for targets that are gone or forbidden; any other
/// transport failure is an `Err`.
#[async_trait]
pub trait Platform: Send + Sync {
    fn cached_channel(&self, channel_id: u64) -> Option<ChannelHandle>;

    async fn fetch_channel(&self, channel_id: u64) -> BotResult<Option<ChannelHandle>>;

    async fn fetch_message(
        &self,
        channel: &ChannelHandle,
        message_id: u64,
    ) -> BotResult<Option<MessageHandle>>;

    /// Every user that applied `reaction` to `message`, across all pages.
    async fn reaction_users(
        &self,
        message: &MessageHandle,
        reaction: &ReactionKey,
    ) -> BotResult<Vec<ReactingUser>>;

    fn cached_member(&self, guild_id: u64, user_id: u64) -> Option<SignupMember>;

    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> BotResult<Option<SignupMember>>;

    async fn guild_roles(&self, guild_id: u64) -> BotResult<Vec<RoleInfo>>;

    async fn guild_emojis(&self, guild_id: u64) -> BotResult<Vec<GuildEmoji>>;

    async fn guild_name(&self, guild_id: u64) -> BotResult<Option<String>>;
}
