use chrono::Utc;
use serenity::all::*;
use tracing::{info, warn};

use super::{followup_ephemeral, next_component};
use crate::db::models::{ChannelRef, MessageRef, SignupConfigUpdate};
use crate::db::repo;
use crate::flows::gvg_builder::{self, BuilderEvent, BuilderStep, GvgBuilder, BUILDER_TIMEOUT};
use crate::flows::{parse_component_id, LiveFlow};
use crate::handlers::AppState;
use crate::platform::discord::reaction_type;
use crate::signup::reaction::{dedup_reactions, ReactionKey};
use crate::ui::{embeds, menus};

pub const GVG: &str = "gvg";

pub async fn register(ctx: &Context) -> anyhow::Result<()> {
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(GVG)
            .description("Create new sign up")
            .default_member_permissions(Permissions::MANAGE_GUILD),
    )
    .await?;
    Ok(())
}

fn builder_event(it: &ComponentInteraction) -> Option<BuilderEvent> {
    let (action, _) = parse_component_id(&it.data.custom_id)?;
    let picked = || match &it.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    };
    match action {
        gvg_builder::ACTION_DATE => picked().map(BuilderEvent::PickDate),
        gvg_builder::ACTION_TIME => picked().map(BuilderEvent::PickTime),
        gvg_builder::ACTION_ADD => Some(BuilderEvent::Add),
        gvg_builder::ACTION_REMOVE => Some(BuilderEvent::RemoveTop),
        gvg_builder::ACTION_POST => Some(BuilderEvent::Post),
        _ => None,
    }
}

/// Reactions a fresh signup post gets: the tracked ones, or the default.
pub fn signup_reactions(tracked: &[String], default_reaction: &str) -> Vec<ReactionKey> {
    let keys = dedup_reactions(tracked.iter().filter_map(|r| ReactionKey::parse(r)));
    if !keys.is_empty() {
        return keys;
    }
    ReactionKey::parse(default_reaction).into_iter().collect()
}

pub async fn build(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let today = Utc::now().with_timezone(&state.settings.timezone).date_naive();
    let mut builder = GvgBuilder::new(state.settings.timezone, today);
    let _live = LiveFlow::register(builder.id, "gvg_builder");

    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("Please select the GvG dates:")
                .embed(embeds::builder_embed(&builder))
                .components(menus::builder_rows(&builder))
                .ephemeral(true),
        ),
    )
    .await?;

    let slots = loop {
        let it = next_component(ctx, cmd.user.id, builder.id, BUILDER_TIMEOUT).await;
        let event = match &it {
            Some(it) => match builder_event(it) {
                Some(e) => e,
                None => {
                    it.create_response(&ctx.http, CreateInteractionResponse::Acknowledge).await?;
                    continue;
                }
            },
            None => BuilderEvent::Timeout,
        };

        match (builder.handle(event), it) {
            (BuilderStep::Redraw, Some(it)) => {
                it.create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .embed(embeds::builder_embed(&builder))
                            .components(menus::builder_rows(&builder)),
                    ),
                )
                .await?;
            }
            (BuilderStep::Post(slots), Some(it)) => {
                it.create_response(&ctx.http, CreateInteractionResponse::Acknowledge).await?;
                cmd.delete_response(&ctx.http).await?;
                break slots;
            }
            (BuilderStep::Cancelled, Some(it)) => {
                it.create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .content("No datetime selected, cancelling sign up creation.")
                            .embeds(vec![])
                            .components(vec![]),
                    ),
                )
                .await?;
                return Ok(());
            }
            (BuilderStep::Expired, _) => {
                cmd.edit_response(
                    &ctx.http,
                    EditInteractionResponse::new()
                        .content("GvG builder timed out. Nothing was posted.")
                        .embeds(vec![])
                        .components(vec![]),
                )
                .await?;
                return Ok(());
            }
            _ => return Ok(()),
        }
    };

    let config = repo::get_signup_config(&state.pool).await?;
    let reactions = signup_reactions(&config.tracked_reactions, &state.settings.default_signup_reaction);
    let shown = reactions.first().map(|k| k.to_string()).unwrap_or_default();

    let post = cmd
        .channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embeds::signup_post_embed(&shown, &slots)))
        .await?;
    for key in &reactions {
        if let Err(e) = post.react(&ctx.http, reaction_type(key)).await {
            warn!(reaction = %key, "could not add signup reaction: {e}");
        }
    }

    let selected = MessageRef {
        message_id: post.id.get(),
        channel: ChannelRef {
            channel_id: cmd.channel_id.get(),
            guild_id: cmd.guild_id.map(|g| g.get()),
        },
        content: post.content.clone(),
    };
    repo::update_signup_config(&state.pool, &SignupConfigUpdate::default().selected_post(selected))
        .await?;
    state.reaction_cache.invalidate_all();
    info!(message_id = post.id.get(), slots = slots.len(), by = cmd.user.id.get(), "signup post created");

    followup_ephemeral(ctx, cmd, "Sign-up posted and selected for tracking.").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_reactions_win_over_default() {
        let keys = signup_reactions(&["<:tank:1>".into(), "👍".into()], "❤️");
        let shown: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(shown, ["<:tank:1>", "👍"]);
    }

    #[test]
    fn falls_back_to_default() {
        let keys = signup_reactions(&[], "❤️");
        assert_eq!(keys, vec![ReactionKey::Unicode("❤️".into())]);
        assert!(signup_reactions(&[], "").is_empty());
    }
}
