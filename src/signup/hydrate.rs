use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::debug;

use super::reaction::{dedup_reactions, ReactionKey};
use super::resolver::{resolve_channel, resolve_message};
use super::roster::{dedup_roles, role_names};
use crate::db::models::SignupConfig;
use crate::db::repo;
use crate::error::{BotError, BotResult};
use crate::platform::{ChannelHandle, MessageHandle, Platform, RoleInfo};

/// Config plus everything it points at, resolved against the live guild.
#[derive(Debug, Clone)]
pub struct Signup {
    pub config: SignupConfig,
    pub post: MessageHandle,
    pub guild_id: u64,
    pub management_channel: Option<ChannelHandle>,
    /// Tracked roles that still exist, in tracked order.
    pub roles: Vec<RoleInfo>,
    /// Names of every guild role, for labels.
    pub role_names: HashMap<u64, String>,
}

impl Signup {
    pub fn require_management_channel(&self) -> BotResult<&ChannelHandle> {
        self.management_channel.as_ref().ok_or(BotError::NoManagementChannel)
    }

    /// Every tracked role id, deleted roles included; those still count by id.
    pub fn tracked_role_ids(&self) -> Vec<u64> {
        dedup_roles(&self.config.tracked_role_ids)
    }
}

pub async fn hydrate_signup(platform: &dyn Platform, pool: &SqlitePool) -> BotResult<Signup> {
    let config = repo::get_signup_config(pool).await?;
    hydrate_config(platform, config).await
}

pub async fn hydrate_config(platform: &dyn Platform, config: SignupConfig) -> BotResult<Signup> {
    let post = resolve_message(platform, config.selected_post.as_ref())
        .await?
        .ok_or(BotError::NoSignupPost)?;
    let guild_id = post.guild_id.ok_or(BotError::NotInGuild)?;
    let management_channel = resolve_channel(platform, config.management_channel.as_ref()).await?;

    let guild_roles = platform.guild_roles(guild_id).await?;
    let roles: Vec<RoleInfo> = dedup_roles(&config.tracked_role_ids)
        .into_iter()
        .filter_map(|id| {
            let role = guild_roles.iter().find(|r| r.id == id).cloned();
            if role.is_none() {
                debug!(role_id = id, "tracked role no longer exists");
            }
            role
        })
        .collect();

    Ok(Signup {
        role_names: role_names(&guild_roles),
        config,
        post,
        guild_id,
        management_channel,
        roles,
    })
}

/// Tracked reactions still usable in `guild_id`. Custom emoji must belong to
/// the guild; outside a guild nothing is filtered.
pub async fn usable_reactions(
    platform: &dyn Platform,
    guild_id: Option<u64>,
    tracked: &[String],
) -> BotResult<Vec<ReactionKey>> {
    let keys = dedup_reactions(tracked.iter().filter_map(|r| ReactionKey::parse(r)));
    let Some(guild_id) = guild_id else {
        return Ok(keys);
    };
    if keys.iter().all(|k| k.custom_id().is_none()) {
        return Ok(keys);
    }
    let emojis = platform.guild_emojis(guild_id).await?;
    Ok(keys
        .into_iter()
        .filter(|k| match k.custom_id() {
            Some(id) => emojis.iter().any(|e| e.id == id),
            None => true,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ChannelRef, MessageRef};
    use crate::platform::fake::{member, role, text_channel, FakePlatform};
    use crate::signup::roster::{self, RoleSummary};
    use crate::platform::GuildEmoji;

    const GUILD: u64 = 7;

    fn platform() -> FakePlatform {
        let mut p = FakePlatform::default();
        p.cached_channels.insert(20, text_channel(20, GUILD));
        p.cached_channels.insert(21, text_channel(21, GUILD));
        p.add_message(MessageHandle {
            id: 30,
            channel_id: 20,
            guild_id: None,
            content: "GvG".into(),
            reactions: vec![],
        });
        p.roles.insert(GUILD, vec![role(1, "Tank"), role(2, "Healer")]);
        p.emojis.insert(GUILD, vec![GuildEmoji { id: 500, name: "dps".into(), animated: false }]);
        p
    }

    fn config() -> SignupConfig {
        SignupConfig {
            management_channel: Some(ChannelRef { channel_id: 21, guild_id: Some(GUILD) }),
            selected_post: Some(MessageRef {
                message_id: 30,
                channel: ChannelRef { channel_id: 20, guild_id: Some(GUILD) },
                content: "GvG".into(),
            }),
            tracked_role_ids: vec![2, 9, 1, 2],
            tracked_reactions: vec!["<:dps:500>".into(), "<:gone:501>".into(), "❤️".into()],
        }
    }

    #[tokio::test]
    async fn keeps_existing_roles_in_order() {
        let s = hydrate_config(&platform(), config()).await.unwrap();
        assert_eq!(s.guild_id, GUILD);
        let live: Vec<u64> = s.roles.iter().map(|r| r.id).collect();
        assert_eq!(live, vec![2, 1]);
        assert_eq!(s.tracked_role_ids(), vec![2, 9, 1]);
        assert_eq!(s.require_management_channel().unwrap().id, 21);
    }

    #[tokio::test]
    async fn deleted_roles_are_still_counted() {
        let mut cfg = config();
        cfg.tracked_role_ids = vec![1, 9];
        let s = hydrate_config(&platform(), cfg).await.unwrap();
        let members = [member(10, "x", &[9]), member(11, "y", &[1, 9])];

        let summary = roster::summary(&members, &s.tracked_role_ids(), &s.role_names);
        assert_eq!(
            summary,
            vec![
                RoleSummary { role_id: 1, label: "TANK".into(), total: 1, exclusive: 0 },
                RoleSummary { role_id: 9, label: "???".into(), total: 2, exclusive: 1 },
            ]
        );
        let lines = roster::members_by_role(&members, 1, &s.tracked_role_ids(), &s.role_names);
        assert_eq!(lines, ["<@11> (also: ???)"]);
    }

    #[tokio::test]
    async fn unknown_custom_emoji_are_not_usable() {
        let keys = usable_reactions(&platform(), Some(GUILD), &config().tracked_reactions)
            .await
            .unwrap();
        let shown: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(shown, ["<:dps:500>", "❤️"]);

        let keys = usable_reactions(&platform(), None, &config().tracked_reactions).await.unwrap();
        assert_eq!(keys.len(), 3);
    }

    #[tokio::test]
    async fn unicode_reactions_pass_through() {
        let p = FakePlatform::default();
        let keys = usable_reactions(&p, Some(GUILD), &["👍".into(), "👍".into()]).await.unwrap();
        assert_eq!(keys, vec![ReactionKey::Unicode("👍".into())]);
    }

    #[tokio::test]
    async fn missing_post_is_not_configured() {
        let mut cfg = config();
        cfg.selected_post = None;
        let err = hydrate_config(&platform(), cfg).await.unwrap_err();
        assert!(matches!(err, BotError::NoSignupPost));
    }

    #[tokio::test]
    async fn management_channel_is_optional_until_required() {
        let mut cfg = config();
        cfg.management_channel = None;
        let s = hydrate_config(&platform(), cfg).await.unwrap();
        assert!(matches!(s.require_management_channel(), Err(BotError::NoManagementChannel)));
    }
}
