use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    Cache, Channel, ChannelId, ChannelType, Context, Emoji, EmojiId, GuildChannel, GuildId, Http,
    Member, MessageId, ReactionType, Role, UserId,
};
use tracing::debug;

use super::{
    ChannelHandle, GuildEmoji, MessageHandle, Platform, ReactingUser, RoleInfo, SignupMember,
};
use crate::error::BotResult;
use crate::signup::reaction::ReactionKey;

/// Discord's per-request cap for reaction user listings.
const REACTION_PAGE: u8 = 100;

/// [`Platform`] backed by serenity's cache and HTTP client.
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    pub fn from_ctx(ctx: &Context) -> Self {
        Self::new(ctx.http.clone(), ctx.cache.clone())
    }
}

/// Deleted targets and missing permissions both come back as 404/403.
pub fn is_missing(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(e) => matches!(e.status_code().map(|s| s.as_u16()), Some(403 | 404)),
        _ => false,
    }
}

fn absent_if_missing<T>(res: serenity::Result<T>) -> BotResult<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if is_missing(&e) => {
            debug!(error = %e, "lookup target missing or forbidden");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn channel_handle(channel: &GuildChannel) -> ChannelHandle {
    ChannelHandle {
        id: channel.id.get(),
        guild_id: Some(channel.guild_id.get()),
        name: channel.name.clone(),
        text_capable: matches!(channel.kind, ChannelType::Text | ChannelType::News),
    }
}

fn signup_member(member: &Member) -> SignupMember {
    SignupMember {
        id: member.user.id.get(),
        display_name: member.display_name().to_string(),
        avatar_url: member.face(),
        role_ids: member.roles.iter().map(|r| r.get()).collect(),
    }
}

fn role_info(role: &Role, guild_id: u64) -> RoleInfo {
    RoleInfo {
        id: role.id.get(),
        name: role.name.clone(),
        colour: format!("#{}", role.colour.hex()),
        position: role.position,
        is_default: role.id.get() == guild_id,
    }
}

fn guild_emoji(emoji: &Emoji) -> GuildEmoji {
    GuildEmoji { id: emoji.id.get(), name: emoji.name.clone(), animated: emoji.animated }
}

pub fn reaction_key(reaction: &ReactionType) -> Option<ReactionKey> {
    match reaction {
        ReactionType::Custom { animated, id, name } => Some(ReactionKey::Custom {
            id: id.get(),
            name: name.clone().unwrap_or_else(|| "_".to_string()),
            animated: *animated,
        }),
        ReactionType::Unicode(s) => Some(ReactionKey::Unicode(s.clone())),
        _ => None,
    }
}

pub fn reaction_type(key: &ReactionKey) -> ReactionType {
    match key {
        ReactionKey::Custom { id, name, animated } => ReactionType::Custom {
            animated: *animated,
            id: EmojiId::new(*id),
            name: Some(name.clone()),
        },
        ReactionKey::Unicode(s) => ReactionType::Unicode(s.clone()),
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    fn cached_channel(&self, channel_id: u64) -> Option<ChannelHandle> {
        self.cache
            .channel(ChannelId::new(channel_id))
            .map(|c| channel_handle(&c))
    }

    async fn fetch_channel(&self, channel_id: u64) -> BotResult<Option<ChannelHandle>> {
        let channel = absent_if_missing(self.http.get_channel(ChannelId::new(channel_id)).await)?;
        Ok(channel.map(|c| match c {
            Channel::Guild(gc) => channel_handle(&gc),
            // DMs and anything newer are never a place we post signups in.
            _ => ChannelHandle {
                id: channel_id,
                guild_id: None,
                name: String::new(),
                text_capable: false,
            },
        }))
    }

    async fn fetch_message(
        &self,
        channel: &ChannelHandle,
        message_id: u64,
    ) -> BotResult<Option<MessageHandle>> {
        let msg = absent_if_missing(
            self.http
                .get_message(ChannelId::new(channel.id), MessageId::new(message_id))
                .await,
        )?;
        Ok(msg.map(|m| MessageHandle {
            id: m.id.get(),
            channel_id: channel.id,
            // HTTP-fetched messages carry no guild id; the channel knows it.
            guild_id: channel.guild_id.or(m.guild_id.map(|g| g.get())),
            content: m.content.clone(),
            reactions: m.reactions.iter().filter_map(|r| reaction_key(&r.reaction_type)).collect(),
        }))
    }

    async fn reaction_users(
        &self,
        message: &MessageHandle,
        reaction: &ReactionKey,
    ) -> BotResult<Vec<ReactingUser>> {
        let channel = ChannelId::new(message.channel_id);
        let mut after: Option<UserId> = None;
        let mut users = Vec::new();
        loop {
            let page = channel
                .reaction_users(
                    &self.http,
                    MessageId::new(message.id),
                    reaction_type(reaction),
                    Some(REACTION_PAGE),
                    after,
                )
                .await?;
            let full = page.len() >= usize::from(REACTION_PAGE);
            after = page.last().map(|u| u.id);
            users.extend(page.into_iter().map(|u| ReactingUser { id: u.id.get(), bot: u.bot }));
            if !full {
                break;
            }
        }
        Ok(users)
    }

    fn cached_member(&self, guild_id: u64, user_id: u64) -> Option<SignupMember> {
        self.cache
            .guild(GuildId::new(guild_id))
            .and_then(|g| g.members.get(&UserId::new(user_id)).map(signup_member))
    }

    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> BotResult<Option<SignupMember>> {
        let member = absent_if_missing(
            self.http
                .get_member(GuildId::new(guild_id), UserId::new(user_id))
                .await,
        )?;
        Ok(member.as_ref().map(signup_member))
    }

    async fn guild_roles(&self, guild_id: u64) -> BotResult<Vec<RoleInfo>> {
        let cached: Option<Vec<RoleInfo>> = self
            .cache
            .guild(GuildId::new(guild_id))
            .map(|g| g.roles.values().map(|r| role_info(r, guild_id)).collect());
        if let Some(roles) = cached {
            return Ok(roles);
        }
        let roles = self.http.get_guild_roles(GuildId::new(guild_id)).await?;
        Ok(roles.iter().map(|r| role_info(r, guild_id)).collect())
    }

    async fn guild_emojis(&self, guild_id: u64) -> BotResult<Vec<GuildEmoji>> {
        let cached: Option<Vec<GuildEmoji>> = self
            .cache
            .guild(GuildId::new(guild_id))
            .map(|g| g.emojis.values().map(guild_emoji).collect());
        if let Some(emojis) = cached {
            return Ok(emojis);
        }
        let emojis = self.http.get_emojis(GuildId::new(guild_id)).await?;
        Ok(emojis.iter().map(guild_emoji).collect())
    }

    async fn guild_name(&self, guild_id: u64) -> BotResult<Option<String>> {
        let cached = self.cache.guild(GuildId::new(guild_id)).map(|g| g.name.clone());
        if cached.is_some() {
            return Ok(cached);
        }
        let guild = absent_if_missing(self.http.get_guild(GuildId::new(guild_id)).await)?;
        Ok(guild.map(|g| g.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use serenity::http::{ErrorResponse, HttpError};

    async fn http_error(status: u16) -> serenity::Error {
        let response = reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(r#"{"code": 10008, "message": "Unknown Message"}"#)
                .unwrap(),
        );
        let error = ErrorResponse::from_response(response, reqwest::Method::GET).await;
        serenity::Error::Http(HttpError::UnsuccessfulRequest(error))
    }

    #[tokio::test]
    async fn forbidden_and_not_found_count_as_missing() {
        assert!(is_missing(&http_error(403).await));
        assert!(is_missing(&http_error(404).await));
        assert!(!is_missing(&http_error(500).await));
        assert!(!is_missing(&serenity::Error::Other("gateway closed")));
    }

    #[tokio::test]
    async fn missing_targets_read_as_absent() {
        let gone: serenity::Result<u8> = Err(http_error(404).await);
        assert!(matches!(absent_if_missing(gone), Ok(None)));

        let broken: serenity::Result<u8> = Err(http_error(500).await);
        assert!(matches!(absent_if_missing(broken), Err(BotError::Discord(_))));

        assert!(matches!(absent_if_missing(Ok(7u8)), Ok(Some(7))));
    }

    #[test]
    fn reaction_types_convert_both_ways() {
        let key = ReactionKey::Custom { id: 42, name: "tank".into(), animated: true };
        assert_eq!(reaction_key(&reaction_type(&key)), Some(key));
        let heart = ReactionKey::Unicode("❤️".into());
        assert_eq!(reaction_key(&reaction_type(&heart)), Some(heart));
    }
}
