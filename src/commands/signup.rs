use serenity::all::*;
use tracing::info;

use super::{followup_ephemeral, option, post_quietly, reply_ephemeral, string_option};
use crate::db::models::{ChannelRef, MessageRef, SignupConfigUpdate};
use crate::db::repo;
use crate::handlers::AppState;
use crate::platform::discord::SerenityPlatform;
use crate::signup::aggregate::aggregate_cached;
use crate::signup::hydrate::{hydrate_signup, usable_reactions};
use crate::signup::reaction::ReactionKey;
use crate::signup::resolver::resolve_channel;
use crate::signup::roster;
use crate::ui::{embeds, reports};

pub const SELECT_POST: &str = "Signup Analyze: Select Post";
pub const SUMMARIZE: &str = "summarize_signup";
pub const ROLE_MEMBERS: &str = "signup_role_members";

const EMOJI_OPTION: &str = "emoji_choice";
const ROLE_OPTION: &str = "role";
const MAX_CHOICES: usize = 25;

fn emoji_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, EMOJI_OPTION, description)
        .set_autocomplete(true)
}

pub async fn register(ctx: &Context) -> anyhow::Result<()> {
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(SELECT_POST)
            .kind(CommandType::Message)
            .default_member_permissions(Permissions::MANAGE_GUILD),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(SUMMARIZE)
            .description("Summary of signups.")
            .add_option(
                emoji_option("Filter signup by emoji (preview may look different than actual emoji).")
                    .required(true),
            ),
    )
    .await?;
    Command::create_global_command(
        &ctx.http,
        CreateCommand::new(ROLE_MEMBERS)
            .description("List signups holding a role.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::Role, ROLE_OPTION, "Role to list.")
                    .required(true),
            )
            .add_option(emoji_option("Only count signups with this emoji.")),
    )
    .await?;
    Ok(())
}

/// `Signup Analyze: Select Post` context menu.
pub async fn select_post(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let Some(ResolvedTarget::Message(message)) = cmd.data.target() else {
        reply_ephemeral(ctx, cmd, "Pick a message to track.").await?;
        return Ok(());
    };

    let guild_id = cmd.guild_id.or(message.guild_id).map(|g| g.get());
    let post = MessageRef {
        message_id: message.id.get(),
        channel: ChannelRef { channel_id: message.channel_id.get(), guild_id },
        content: message.content.clone(),
    };
    let config =
        repo::update_signup_config(&state.pool, &SignupConfigUpdate::default().selected_post(post))
            .await?;
    state.reaction_cache.invalidate_all();
    info!(message_id = message.id.get(), by = cmd.user.id.get(), "signup post selected");

    let note = if guild_id.is_none() { "NOTE: No guild id detected.\n" } else { "" };
    let embed = embeds::forward_as_embed(message, embeds::SELECTED_POST_FOOTER);
    let platform = SerenityPlatform::from_ctx(ctx);
    match resolve_channel(&platform, config.management_channel.as_ref()).await? {
        Some(channel) => {
            ChannelId::new(channel.id)
                .send_message(&ctx.http, CreateMessage::new().embed(embed))
                .await?;
            reply_ephemeral(ctx, cmd, format!("{note}Post selected. Forwarded to <#{}>.", channel.id))
                .await?;
        }
        None => {
            cmd.create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(format!("{note}Post selected."))
                        .embed(embed)
                        .ephemeral(true),
                ),
            )
            .await?;
        }
    }
    Ok(())
}

/// Post the role breakdown of everyone who reacted with one emoji.
pub async fn summarize(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let raw = string_option(cmd, EMOJI_OPTION).unwrap_or_default();
    let Some(reaction) = ReactionKey::parse(&raw) else {
        reply_ephemeral(ctx, cmd, format!("`{raw}` is not an emoji.")).await?;
        return Ok(());
    };
    cmd.defer_ephemeral(&ctx.http).await?;

    let platform = SerenityPlatform::from_ctx(ctx);
    let signup = hydrate_signup(&platform, &state.pool).await?;
    let management = signup.require_management_channel()?;
    let reactions = aggregate_cached(&platform, &state.reaction_cache, &signup.post).await?;
    let members = reactions.members_for(&reaction);
    if members.is_empty() {
        cmd.edit_response(&ctx.http, EditInteractionResponse::new().content(reports::no_signups(&reaction)))
            .await?;
        return Ok(());
    }

    let tracked = signup.tracked_role_ids();
    let summary = roster::summary(&members, &tracked, &signup.role_names);
    let rows = roster::overview(&members, &tracked);
    for text in reports::signup_report(&reaction, &summary, &rows, &tracked) {
        post_quietly(ctx, management, text).await?;
    }
    info!(reaction = %reaction, signups = members.len(), "signup summary posted");

    cmd.edit_response(
        &ctx.http,
        EditInteractionResponse::new().content(format!("Summary posted to <#{}>.", management.id)),
    )
    .await?;
    Ok(())
}

/// Who among the signups holds a given role.
pub async fn role_members(ctx: &Context, cmd: &CommandInteraction, state: &AppState) -> anyhow::Result<()> {
    let Some(CommandDataOptionValue::Role(role_id)) = option(cmd, ROLE_OPTION) else {
        reply_ephemeral(ctx, cmd, "Missing role.").await?;
        return Ok(());
    };
    let role_id = role_id.get();
    let reaction = match string_option(cmd, EMOJI_OPTION) {
        Some(raw) => match ReactionKey::parse(&raw) {
            Some(k) => Some(k),
            None => {
                reply_ephemeral(ctx, cmd, format!("`{raw}` is not an emoji.")).await?;
                return Ok(());
            }
        },
        None => None,
    };
    cmd.defer_ephemeral(&ctx.http).await?;

    let platform = SerenityPlatform::from_ctx(ctx);
    let signup = hydrate_signup(&platform, &state.pool).await?;
    let reactions = aggregate_cached(&platform, &state.reaction_cache, &signup.post).await?;
    let members = match &reaction {
        Some(k) => reactions.members_for(k),
        None => reactions.union(),
    };

    let lines = roster::members_by_role(&members, role_id, &signup.tracked_role_ids(), &signup.role_names);
    let label = roster::role_label(role_id, &signup.role_names);
    let mut messages = reports::role_members_report(&label, role_id, reaction.as_ref(), &lines).into_iter();
    if let Some(first) = messages.next() {
        cmd.edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .content(first)
                .allowed_mentions(CreateAllowedMentions::new()),
        )
        .await?;
    }
    for rest in messages {
        followup_ephemeral(ctx, cmd, rest).await?;
    }
    Ok(())
}

/// `(name, value)` autocomplete choices among the usable tracked reactions.
pub fn emoji_choices(usable: &[ReactionKey], typed: &str) -> Vec<(String, String)> {
    let typed = typed.to_lowercase();
    usable
        .iter()
        .filter(|k| typed.is_empty() || k.label().to_lowercase().contains(&typed))
        .take(MAX_CHOICES)
        .map(|k| (format!("{k} ({})", k.label()), k.to_string()))
        .collect()
}

pub async fn autocomplete_emoji(
    ctx: &Context,
    ac: &CommandInteraction,
    state: &AppState,
) -> anyhow::Result<()> {
    let Some(focused) = ac.data.autocomplete() else {
        return Ok(());
    };
    if focused.name != EMOJI_OPTION {
        return Ok(());
    }
    let config = repo::get_signup_config(&state.pool).await?;
    let platform = SerenityPlatform::from_ctx(ctx);
    let usable =
        usable_reactions(&platform, ac.guild_id.map(|g| g.get()), &config.tracked_reactions).await?;
    let mut response = CreateAutocompleteResponse::new();
    for (name, value) in emoji_choices(&usable, focused.value) {
        response = response.add_string_choice(name, value);
    }
    ac.create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::reaction::dedup_reactions;

    fn usable() -> Vec<ReactionKey> {
        let raw = ["<:tank:1>", "❤️", "<:healer:2>", "<a:tank_old:1>"];
        dedup_reactions(raw.iter().filter_map(|r| ReactionKey::parse(r)))
    }

    #[test]
    fn empty_input_lists_everything_once() {
        let names: Vec<String> = emoji_choices(&usable(), "").into_iter().map(|c| c.1).collect();
        assert_eq!(names, ["<:tank:1>", "❤️", "<:healer:2>"]);
    }

    #[test]
    fn filters_case_insensitively() {
        let choices = emoji_choices(&usable(), "TAN");
        assert_eq!(choices, vec![("<:tank:1> (:tank:)".to_string(), "<:tank:1>".to_string())]);
    }

    #[test]
    fn caps_at_25() {
        let many: Vec<ReactionKey> = (0..40)
            .filter_map(|i| ReactionKey::parse(&format!("<:e{i}:{}>", i + 100)))
            .collect();
        assert_eq!(emoji_choices(&many, "e").len(), 25);
    }
}
