use tracing::debug;

use crate::db::models::{ChannelRef, MessageRef};
use crate::error::BotResult;
use crate::platform::{ChannelHandle, MessageHandle, Platform, SignupMember};

/// Turn a stored channel reference into a live text channel.
pub async fn resolve_channel(
    platform: &dyn Platform,
    channel: Option<&ChannelRef>,
) -> BotResult<Option<ChannelHandle>> {
    let Some(channel) = channel else {
        return Ok(None);
    };
    let handle = match platform.cached_channel(channel.channel_id) {
        Some(c) => Some(c),
        None => platform.fetch_channel(channel.channel_id).await?,
    };
    Ok(handle.filter(|c| {
        if !c.text_capable {
            debug!(channel_id = c.id, "stored channel is not a text channel");
        }
        c.text_capable
    }))
}

/// Turn a stored message reference into a live message.
pub async fn resolve_message(
    platform: &dyn Platform,
    message: Option<&MessageRef>,
) -> BotResult<Option<MessageHandle>> {
    let Some(message) = message else {
        return Ok(None);
    };
    let Some(channel) = resolve_channel(platform, Some(&message.channel)).await? else {
        return Ok(None);
    };
    let handle = platform.fetch_message(&channel, message.message_id).await?;
    Ok(handle.map(|mut m| {
        m.guild_id = channel.guild_id.or(m.guild_id);
        m
    }))
}

/// Cache-first member lookup; `None` once the user left the guild.
pub async fn resolve_member(
    platform: &dyn Platform,
    guild_id: u64,
    user_id: u64,
) -> BotResult<Option<SignupMember>> {
    if let Some(m) = platform.cached_member(guild_id, user_id) {
        return Ok(Some(m));
    }
    platform.fetch_member(guild_id, user_id).await
}
