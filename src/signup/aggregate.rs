use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use super::reaction::ReactionKey;
use super::resolver::resolve_member;
use crate::error::{BotError, BotResult};
use crate::platform::{MessageHandle, Platform, SignupMember};

/// Members who reacted with one reaction identity, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionGroup {
    pub key: ReactionKey,
    pub members: BTreeMap<u64, SignupMember>,
}

/// Reaction groups in the order the reactions appear on the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionMap {
    groups: Vec<ReactionGroup>,
}

impl ReactionMap {
    pub fn get(&self, key: &ReactionKey) -> Option<&ReactionGroup> {
        self.groups.iter().find(|g| &g.key == key)
    }

    pub fn members_for(&self, key: &ReactionKey) -> Vec<SignupMember> {
        self.get(key)
            .map(|g| g.members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Everyone who reacted with anything, once each.
    pub fn union(&self) -> Vec<SignupMember> {
        let mut all: BTreeMap<u64, SignupMember> = BTreeMap::new();
        for g in &self.groups {
            for (id, m) in &g.members {
                all.entry(*id).or_insert_with(|| m.clone());
            }
        }
        all.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn group_mut(&mut self, key: &ReactionKey) -> &mut ReactionGroup {
        let idx = match self.groups.iter().position(|g| &g.key == key) {
            Some(i) => i,
            None => {
                self.groups.push(ReactionGroup { key: key.clone(), members: BTreeMap::new() });
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }
}

/// Collect every non-bot reactor of `message`, grouped by reaction identity.
pub async fn aggregate(platform: &dyn Platform, message: &MessageHandle) -> BotResult<ReactionMap> {
    let guild_id = message.guild_id.ok_or(BotError::NotInGuild)?;
    let mut map = ReactionMap::default();
    // A user reacting several times is resolved once.
    let mut seen: HashMap<u64, Option<SignupMember>> = HashMap::new();

    for key in &message.reactions {
        let users = platform.reaction_users(message, key).await?;
        let group = map.group_mut(key);
        for user in users.into_iter().filter(|u| !u.bot) {
            let member = match seen.get(&user.id) {
                Some(m) => m.clone(),
                None => {
                    let m = resolve_member(platform, guild_id, user.id).await?;
                    if m.is_none() {
                        debug!(user_id = user.id, "reactor left the guild, skipping");
                    }
                    seen.insert(user.id, m.clone());
                    m
                }
            };
            if let Some(m) = member {
                group.members.insert(m.id, m);
            }
        }
    }
    Ok(map)
}

/// Last aggregation per message, reused until the TTL runs out.
pub struct ReactionCache {
    entries: DashMap<u64, (Instant, ReactionMap)>,
    ttl: Duration,
}

impl ReactionCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    pub fn get(&self, message_id: u64) -> Option<ReactionMap> {
        if self.ttl.is_zero() {
            return None;
        }
        let entry = self.entries.get(&message_id)?;
        let (at, map) = entry.value();
        if at.elapsed() < self.ttl {
            Some(map.clone())
        } else {
            None
        }
    }

    pub fn put(&self, message_id: u64, map: ReactionMap) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(message_id, (Instant::now(), map));
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }
}

pub async fn aggregate_cached(
    platform: &dyn Platform,
    cache: &ReactionCache,
    message: &MessageHandle,
) -> BotResult<ReactionMap> {
    if let Some(map) = cache.get(message.id) {
        debug!(message_id = message.id, "reaction snapshot served from cache");
        return Ok(map);
    }
    let map = aggregate(platform, message).await?;
    info!(message_id = message.id, reactions = map.len(), "aggregated signup reactions");
    cache.put(message.id, map.clone());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{member, user, FakePlatform};
    use crate::platform::ReactingUser;
    use std::sync::atomic::Ordering;

    const GUILD: u64 = 1;

    fn signup_message(reactions: &[&str]) -> MessageHandle {
        MessageHandle {
            id: 100,
            channel_id: 50,
            guild_id: Some(GUILD),
            content: "sign up".into(),
            reactions: reactions.iter().filter_map(|r| ReactionKey::parse(r)).collect(),
        }
    }

    fn platform() -> FakePlatform {
        let mut p = FakePlatform::default();
        p.add_member(GUILD, member(1, "one", &[]));
        p.add_member(GUILD, member(2, "two", &[]));
        p.set_reactors(100, "❤️", vec![user(1), user(2), ReactingUser { id: 99, bot: true }]);
        p.set_reactors(100, "👍", vec![user(2), ReactingUser { id: 99, bot: true }]);
        p
    }

    #[tokio::test]
    async fn groups_by_reaction_and_skips_bots() {
        let p = platform();
        let map = aggregate(&p, &signup_message(&["❤️", "👍"])).await.unwrap();
        assert_eq!(map.len(), 2);
        let heart = ReactionKey::parse("❤️").unwrap();
        let thumbs = ReactionKey::parse("👍").unwrap();
        assert_eq!(map.members_for(&heart).len(), 2);
        assert_eq!(map.members_for(&thumbs).len(), 1);
        assert!(map.union().iter().all(|m| m.id != 99));
        assert_eq!(map.union().len(), 2);
    }

    #[tokio::test]
    async fn departed_members_are_skipped() {
        let mut p = platform();
        p.set_reactors(100, "❤️", vec![user(1), user(7)]);
        let map = aggregate(&p, &signup_message(&["❤️"])).await.unwrap();
        let ids: Vec<u64> = map.union().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn same_identity_shares_a_group() {
        let mut p = platform();
        p.set_reactors(100, "\u{2764}", vec![user(1)]);
        p.set_reactors(100, "\u{2764}\u{FE0F}", vec![user(2)]);
        let map = aggregate(&p, &signup_message(&["\u{2764}", "\u{2764}\u{FE0F}"])).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.members_for(&ReactionKey::parse("❤️").unwrap()).len(), 2);
    }

    #[tokio::test]
    async fn requires_a_guild() {
        let p = platform();
        let mut msg = signup_message(&["❤️"]);
        msg.guild_id = None;
        assert!(matches!(aggregate(&p, &msg).await, Err(BotError::NotInGuild)));
    }

    #[tokio::test(start_paused = true)]
    async fn cache_expires_after_ttl() {
        let p = platform();
        let cache = ReactionCache::new(Duration::from_secs(300));
        let msg = signup_message(&["❤️"]);

        aggregate_cached(&p, &cache, &msg).await.unwrap();
        aggregate_cached(&p, &cache, &msg).await.unwrap();
        assert_eq!(p.reaction_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        aggregate_cached(&p, &cache, &msg).await.unwrap();
        assert_eq!(p.reaction_calls.load(Ordering::SeqCst), 2);

        cache.invalidate_all();
        aggregate_cached(&p, &cache, &msg).await.unwrap();
        assert_eq!(p.reaction_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let p = platform();
        let cache = ReactionCache::new(Duration::ZERO);
        let msg = signup_message(&["❤️"]);
        aggregate_cached(&p, &cache, &msg).await.unwrap();
        aggregate_cached(&p, &cache, &msg).await.unwrap();
        assert_eq!(p.reaction_calls.load(Ordering::SeqCst), 2);
    }
}
