pub mod configure;
pub mod gvg;
pub mod signup;

use std::time::Duration;

use serenity::all::{
    CommandDataOptionValue, CommandInteraction, ComponentInteraction,
    ComponentInteractionCollector, CreateAllowedMentions, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage, UserId,
};
use serenity::prelude::Context;
use uuid::Uuid;

use crate::flows::parse_component_id;
use crate::handlers::state_from_ctx;
use crate::platform::ChannelHandle;

pub async fn register_commands(ctx: &Context) -> anyhow::Result<()> {
    configure::register(ctx).await?;
    signup::register(ctx).await?;
    gvg::register(ctx).await?;
    Ok(())
}

pub async fn handle(ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
    let state = state_from_ctx(ctx).await?;
    match cmd.data.name.as_str() {
        configure::SET_MANAGEMENT_CHANNEL => configure::set_management_channel(ctx, cmd, &state).await,
        configure::SET_ROLES => configure::set_roles(ctx, cmd, &state).await,
        configure::SET_REACTIONS => configure::set_reactions(ctx, cmd, &state).await,
        configure::PEAK_CONFIG => configure::peak_config(ctx, cmd, &state).await,
        configure::POST_CONFIG => configure::post_config(ctx, cmd, &state).await,
        signup::SELECT_POST => signup::select_post(ctx, cmd, &state).await,
        signup::SUMMARIZE => signup::summarize(ctx, cmd, &state).await,
        signup::ROLE_MEMBERS => signup::role_members(ctx, cmd, &state).await,
        gvg::GVG => gvg::build(ctx, cmd, &state).await,
        _ => Ok(()),
    }
}

pub async fn autocomplete(ctx: &Context, ac: &CommandInteraction) -> anyhow::Result<()> {
    let state = state_from_ctx(ctx).await?;
    match ac.data.name.as_str() {
        signup::SUMMARIZE | signup::ROLE_MEMBERS => signup::autocomplete_emoji(ctx, ac, &state).await,
        _ => Ok(()),
    }
}

/// Ephemeral reply that works whether or not the interaction was already
/// acknowledged.
pub async fn reply_ephemeral(
    ctx: &Context,
    cmd: &CommandInteraction,
    content: impl Into<String>,
) -> serenity::Result<()> {
    let content = content.into();
    let first = cmd
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content(&content).ephemeral(true),
            ),
        )
        .await;
    if first.is_ok() {
        return Ok(());
    }
    cmd.create_followup(
        &ctx.http,
        CreateInteractionResponseFollowup::new().content(content).ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn followup_ephemeral(
    ctx: &Context,
    cmd: &CommandInteraction,
    content: impl Into<String>,
) -> serenity::Result<()> {
    cmd.create_followup(
        &ctx.http,
        CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(true)
            .allowed_mentions(CreateAllowedMentions::new()),
    )
    .await?;
    Ok(())
}

/// Post to a channel without pinging anyone mentioned in `content`.
pub async fn post_quietly(
    ctx: &Context,
    channel: &ChannelHandle,
    content: impl Into<String>,
) -> serenity::Result<()> {
    serenity::all::ChannelId::new(channel.id)
        .send_message(
            &ctx.http,
            CreateMessage::new().content(content).allowed_mentions(CreateAllowedMentions::new()),
        )
        .await?;
    Ok(())
}

pub fn option<'a>(cmd: &'a CommandInteraction, name: &str) -> Option<&'a CommandDataOptionValue> {
    cmd.data.options.iter().find(|o| o.name == name).map(|o| &o.value)
}

pub fn string_option(cmd: &CommandInteraction, name: &str) -> Option<String> {
    match option(cmd, name) {
        Some(CommandDataOptionValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Wait for the next click or pick in flow `flow_id` by `user`. `None` once
/// `timeout` passes without one.
pub async fn next_component(
    ctx: &Context,
    user: UserId,
    flow_id: Uuid,
    timeout: Duration,
) -> Option<ComponentInteraction> {
    ComponentInteractionCollector::new(&ctx.shard)
        .author_id(user)
        .filter(move |i| parse_component_id(&i.data.custom_id).map(|(_, id)| id) == Some(flow_id))
        .timeout(timeout)
        .next()
        .await
}

/// Display name of whoever ran the command.
pub fn invoker_name(cmd: &CommandInteraction) -> String {
    cmd.member
        .as_ref()
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| cmd.user.global_name.clone().unwrap_or_else(|| cmd.user.name.clone()))
}
