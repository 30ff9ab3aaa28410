use serenity::all::{Colour, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, Message};

use crate::flows::gvg_builder::GvgBuilder;

pub const SELECTED_POST_FOOTER: &str = "Post selected for GvG signup.";
const BUILDER_COLOUR: u32 = 0xBEBEFE;

/// Re-post someone else's message as an embed, keeping author and first image.
pub fn forward_as_embed(source: &Message, footer: &str) -> CreateEmbed {
    let author_name = source
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| source.author.global_name.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| source.author.name.clone());

    let mut e = CreateEmbed::new()
        .description(&source.content)
        .colour(Colour::BLUE)
        .timestamp(source.timestamp)
        .author(CreateEmbedAuthor::new(author_name).icon_url(source.author.face()))
        .footer(CreateEmbedFooter::new(footer));

    if let Some(att) = source.attachments.first() {
        e = e.image(&att.url);
    }
    e
}

pub fn signup_post_description(signup_reaction: &str, slots: &[i64]) -> String {
    let times = slots
        .iter()
        .map(|t| format!("<t:{t}:D>: <t:{t}:R>"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "This weeks GvG Sign-Up. {signup_reaction} react this message to participate!\n\n\
         Battle Times: \n{times}"
    )
}

pub fn signup_post_embed(signup_reaction: &str, slots: &[i64]) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚔️ GvG Sign-Up")
        .description(signup_post_description(signup_reaction, slots))
        .colour(Colour::BLUE)
}

pub fn builder_description(builder: &GvgBuilder) -> String {
    if builder.slots().is_empty() {
        return "No slots added.".to_string();
    }
    builder
        .slots()
        .iter()
        .map(|s| format!("✅ <t:{s}:F>"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn builder_selection(builder: &GvgBuilder) -> String {
    let show = |v: Option<String>| v.unwrap_or_else(|| "None".to_string());
    format!("📅 `{}`\n⏰ `{}`", show(builder.date_value()), show(builder.time_value()))
}

pub fn builder_embed(builder: &GvgBuilder) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚔️ GvG Builder")
        .description(builder_description(builder))
        .colour(BUILDER_COLOUR)
        .field("Current Selection", builder_selection(builder), false)
}
