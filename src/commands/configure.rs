use serenity::all::*;
use tracing::{info, warn};

use super::{
    followup_ephemeral, invoker_name, next_component, option, post_quietly, reply_ephemeral,
};
use crate::db::models::{ChannelRef, SignupConfigUpdate};
use crate::db::repo;
use crate::error::BotError;
use crate::flows::reaction_canvas::{self, CanvasEvent, CanvasStep, ReactionCanvas, CANVAS_TIMEOUT};
use crate::flows::role_picker::{self, PickerEvent, PickerStep, RolePicker, ROLE_PICKER_TIMEOUT};
use crate::flows::{parse_component_id, then_clean_up, LiveFlow};
use crate::handlers::AppState;
use crate::platform::discord::{is_missing, reaction_key, SerenityPlatform};
use crate::platform::{ChannelHandle, Platform};
use crate::signup::resolver::resolve_channel;
use crate::ui::{menus, reports};

pub const SET_MANAGEMENT_CHANNEL: &str = "set_gvg_management_channel";
pub const SET_ROLES: &str = "set_gvg_roles";
pub const SET_REACTIONS: &str = "set_gvg_reactions";
pub const PEAK_CONFIG: &str = "peak_gvg_config";
pub const POST_CONFIG: &str = "post_gvg_config";

pub async fn register(ctx: &Context) -> anyhow::Result<()> {
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(SET_MANAGEMENT_CHANNEL)
            .description("Where to post GvG bot messages.")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "management_channel",
                    "Set the GvG management channel.",
                )
                .channel_types(vec![ChannelType::Text, ChannelType::News])
                .required(true),
            ),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(SET_ROLES)
            .description("Open up menu to select GvG roles.")
            .default_member_permissions(Permissions::MANAGE_GUILD),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(SET_REACTIONS)
            .description("Set GvG reactions.")
            .default_member_permissions(Permissions::MANAGE_GUILD),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(PEAK_CONFIG).description("Peak current GvG configuration."),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(POST_CONFIG)
            .description("Post current GvG configuration to management channel.")
            .default_member_permissions(Permissions::MANAGE_GUILD),
    )
    .await?;
    Ok(())
}

pub async fn set_management_channel(
    ctx: &Context,
    cmd: &CommandInteraction,
    state: &AppState,
) -> anyhow::Result<()> {
    let guild_id = cmd.guild_id.ok_or(BotError::NotInGuild)?;
    let Some(CommandDataOptionValue::Channel(channel_id)) = option(cmd, "management_channel") else {
        reply_ephemeral(ctx, cmd, "Missing channel.").await?;
        return Ok(());
    };

    let platform = SerenityPlatform::from_ctx(ctx);
    let wanted = ChannelRef { channel_id: channel_id.get(), guild_id: Some(guild_id.get()) };
    let Some(channel) = resolve_channel(&platform, Some(&wanted)).await? else {
        reply_ephemeral(ctx, cmd, "I can't post in that channel. Pick a text channel I can see.")
            .await?;
        return Ok(());
    };

    repo::update_signup_config(&state.pool, &SignupConfigUpdate::default().management_channel(wanted))
        .await?;
    info!(channel_id = channel.id, by = cmd.user.id.get(), "management channel set");
    reply_ephemeral(ctx, cmd, format!("Management channel set to: <#{}>", channel.id)).await?;
    Ok(())
}

fn picker_rows(picker: &RolePicker) -> Vec<CreateActionRow> {
    vec![menus::role_select_row(picker), menus::role_save_row(picker)]
}

fn picker_event(it: &ComponentInteraction) -> Option<PickerEvent> {
    let (action, _) = parse_component_id(&it.data.custom_id)?;
    match (action, &it.data.kind) {
        (role_picker::ACTION_SELECT, ComponentInteractionDataKind::StringSelect { values }) => {
            Some(PickerEvent::Select(values.clone()))
        }
        (role_picker::ACTION_SAVE, _) => Some(PickerEvent::Save),
        _ => None,
    }
}

pub async fn set_roles(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let guild_id = cmd.guild_id.ok_or(BotError::NotInGuild)?;
    let platform = SerenityPlatform::from_ctx(ctx);
    let roles = platform.guild_roles(guild_id.get()).await?;
    let config = repo::get_signup_config(&state.pool).await?;

    let mut picker = RolePicker::new(&roles, &config.tracked_role_ids);
    if picker.options().is_empty() {
        reply_ephemeral(ctx, cmd, "This server has no roles to track.").await?;
        return Ok(());
    }
    let _live = LiveFlow::register(picker.id, "role_picker");

    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("Select GvG class roles:")
                .components(picker_rows(&picker))
                .ephemeral(true),
        ),
    )
    .await?;

    loop {
        let it = next_component(ctx, cmd.user.id, picker.id, ROLE_PICKER_TIMEOUT).await;
        let event = match &it {
            Some(it) => match picker_event(it) {
                Some(e) => e,
                None => {
                    it.create_response(&ctx.http, CreateInteractionResponse::Acknowledge).await?;
                    continue;
                }
            },
            None => PickerEvent::Timeout,
        };

        match (picker.handle(event), it) {
            (PickerStep::Redraw, Some(it)) => {
                it.create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new().components(picker_rows(&picker)),
                    ),
                )
                .await?;
            }
            (PickerStep::Save(role_ids), Some(it)) => {
                it.create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .content("Saving...")
                            .components(vec![]),
                    ),
                )
                .await?;
                let saved = repo::update_signup_config(
                    &state.pool,
                    &SignupConfigUpdate::default().tracked_role_ids(role_ids),
                )
                .await?;
                info!(count = saved.tracked_role_ids.len(), by = cmd.user.id.get(), "tracked roles updated");

                let text = format!(
                    "Updated! Tracking {} roles: {}",
                    saved.tracked_role_ids.len(),
                    reports::role_mentions(&saved.tracked_role_ids)
                );
                match resolve_channel(&platform, saved.management_channel.as_ref()).await? {
                    Some(channel) => post_quietly(ctx, &channel, text).await?,
                    None => followup_ephemeral(ctx, cmd, text).await?,
                }
                return Ok(());
            }
            (PickerStep::Expired, _) => {
                cmd.edit_response(&ctx.http, EditInteractionResponse::new().components(vec![])).await?;
                followup_ephemeral(ctx, cmd, "Role selection timeout. Exiting").await?;
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
}

async fn delete_canvas(ctx: &Context, canvas: &Message) {
    if let Err(e) = canvas.delete(&ctx.http).await {
        if !is_missing(&e) {
            warn!(message_id = canvas.id.get(), "could not delete reaction canvas: {e}");
        }
    }
}

pub async fn set_reactions(
    ctx: &Context,
    cmd: &CommandInteraction,
    state: &AppState,
) -> anyhow::Result<()> {
    let platform = SerenityPlatform::from_ctx(ctx);
    let config = repo::get_signup_config(&state.pool).await?;
    let management = resolve_channel(&platform, config.management_channel.as_ref())
        .await?
        .ok_or(BotError::NoManagementChannel)?;
    if cmd.channel_id.get() != management.id {
        return Err(BotError::WrongChannel(management.name.clone()).into());
    }

    let canvas = ChannelId::new(management.id)
        .send_message(
            &ctx.http,
            CreateMessage::new().content(reaction_canvas::canvas_prompt(&invoker_name(cmd))),
        )
        .await?;
    then_clean_up(run_canvas(ctx, cmd, state, &management, &canvas), delete_canvas(ctx, &canvas))
        .await
}

async fn run_canvas(
    ctx: &Context,
    cmd: &CommandInteraction,
    state: &AppState,
    management: &ChannelHandle,
    canvas: &Message,
) -> anyhow::Result<()> {
    let mut flow = ReactionCanvas::new();
    let _live = LiveFlow::register(flow.id, "reaction_canvas");

    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("Use the message above to select your emojis. Click the button below when done.")
                .components(vec![menus::canvas_save_row(flow.id)])
                .ephemeral(true),
        ),
    )
    .await?;

    let it = next_component(ctx, cmd.user.id, flow.id, CANVAS_TIMEOUT).await;
    let event = match &it {
        Some(_) => {
            let reactions = match canvas.channel_id.message(&ctx.http, canvas.id).await {
                Ok(m) => m.reactions.iter().filter_map(|r| reaction_key(&r.reaction_type)).collect(),
                Err(e) if is_missing(&e) => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            CanvasEvent::Save(reactions)
        }
        None => CanvasEvent::Timeout,
    };

    match (flow.handle(event), it) {
        (CanvasStep::Save(keys), Some(it)) => {
            let shown = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(" ");
            it.create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content(format!("Processing reacts: {shown}"))
                        .components(vec![]),
                ),
            )
            .await?;
            let stored: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            repo::update_signup_config(&state.pool, &SignupConfigUpdate::default().tracked_reactions(stored))
                .await?;
            info!(count = keys.len(), by = cmd.user.id.get(), "tracked reactions updated");
            post_quietly(ctx, management, format!("Updated! GvG reactions set: {shown}.")).await?;
        }
        (CanvasStep::NothingSelected, Some(it)) => {
            it.create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content("No reactions selected. Exiting.")
                        .components(vec![]),
                ),
            )
            .await?;
        }
        (CanvasStep::Expired, _) => {
            cmd.edit_response(
                &ctx.http,
                EditInteractionResponse::new()
                    .content("Reaction setup timed out. Nothing was changed.")
                    .components(vec![]),
            )
            .await?;
        }
        _ => {}
    }
    Ok(())
}

pub async fn peak_config(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let config = repo::get_signup_config(&state.pool).await?;
    reply_ephemeral(ctx, cmd, reports::config_status(&config)).await?;
    Ok(())
}

pub async fn post_config(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let platform = SerenityPlatform::from_ctx(ctx);
    let config = repo::get_signup_config(&state.pool).await?;
    let management = resolve_channel(&platform, config.management_channel.as_ref())
        .await?
        .ok_or(BotError::NoManagementChannel)?;

    let text = reports::config_status(&config);
    reply_ephemeral(ctx, cmd, text.clone()).await?;
    post_quietly(ctx, &management, text).await?;
    Ok(())
}
