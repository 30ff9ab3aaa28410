use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ChannelHandle, GuildEmoji, MessageHandle, Platform, ReactingUser, RoleInfo, SignupMember,
};
use crate::error::BotResult;
use crate::signup::reaction::ReactionKey;

/// In-memory platform for tests. Channels and members can be split between
/// "cache" and "remote" to exercise the fallback paths.
#[derive(Default)]
pub struct FakePlatform {
    pub cached_channels: HashMap<u64, ChannelHandle>,
    pub remote_channels: HashMap<u64, ChannelHandle>,
    pub messages: HashMap<(u64, u64), MessageHandle>,
    pub reactors: HashMap<(u64, String), Vec<ReactingUser>>,
    pub cached_members: HashMap<(u64, u64), SignupMember>,
    pub remote_members: HashMap<(u64, u64), SignupMember>,
    pub roles: HashMap<u64, Vec<RoleInfo>>,
    pub emojis: HashMap<u64, Vec<GuildEmoji>>,
    pub guild_names: HashMap<u64, String>,
    pub reaction_calls: AtomicUsize,
    pub member_fetches: Mutex<Vec<u64>>,
}

pub fn text_channel(id: u64, guild_id: u64) -> ChannelHandle {
    ChannelHandle { id, guild_id: Some(guild_id), name: format!("chan-{id}"), text_capable: true }
}

pub fn member(id: u64, name: &str, roles: &[u64]) -> SignupMember {
    SignupMember {
        id,
        display_name: name.to_string(),
        avatar_url: format!("https://cdn.example/{id}.png"),
        role_ids: roles.to_vec(),
    }
}

pub fn role(id: u64, name: &str) -> RoleInfo {
    RoleInfo { id, name: name.to_string(), colour: "#000000".into(), position: 1, is_default: false }
}

pub fn user(id: u64) -> ReactingUser {
    ReactingUser { id, bot: false }
}

impl FakePlatform {
    pub fn add_message(&mut self, msg: MessageHandle) {
        self.messages.insert((msg.channel_id, msg.id), msg);
    }

    pub fn set_reactors(&mut self, message_id: u64, key: &str, users: Vec<ReactingUser>) {
        self.reactors.insert((message_id, key.to_string()), users);
    }

    pub fn add_member(&mut self, guild_id: u64, m: SignupMember) {
        self.cached_members.insert((guild_id, m.id), m);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn cached_channel(&self, channel_id: u64) -> Option<ChannelHandle> {
        self.cached_channels.get(&channel_id).cloned()
    }

    async fn fetch_channel(&self, channel_id: u64) -> BotResult<Option<ChannelHandle>> {
        Ok(self.remote_channels.get(&channel_id).cloned())
    }

    async fn fetch_message(
        &self,
        channel: &ChannelHandle,
        message_id: u64,
    ) -> BotResult<Option<MessageHandle>> {
        Ok(self.messages.get(&(channel.id, message_id)).cloned())
    }

    async fn reaction_users(
        &self,
        message: &MessageHandle,
        reaction: &ReactionKey,
    ) -> BotResult<Vec<ReactingUser>> {
        self.reaction_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .reactors
            .get(&(message.id, reaction.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn cached_member(&self, guild_id: u64, user_id: u64) -> Option<SignupMember> {
        self.cached_members.get(&(guild_id, user_id)).cloned()
    }

    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> BotResult<Option<SignupMember>> {
        if let Ok(mut calls) = self.member_fetches.lock() {
            calls.push(user_id);
        }
        Ok(self.remote_members.get(&(guild_id, user_id)).cloned())
    }

    async fn guild_roles(&self, guild_id: u64) -> BotResult<Vec<RoleInfo>> {
        Ok(self.roles.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn guild_emojis(&self, guild_id: u64) -> BotResult<Vec<GuildEmoji>> {
        Ok(self.emojis.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn guild_name(&self, guild_id: u64) -> BotResult<Option<String>> {
        Ok(self.guild_names.get(&guild_id).cloned())
    }
}
