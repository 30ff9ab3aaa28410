//! Text reports posted to chat.

use crate::db::models::SignupConfig;
use crate::signup::reaction::ReactionKey;
use crate::signup::roster::{self, RoleSummary, RosterRow};

/// Discord's message length cap.
pub const MESSAGE_LIMIT: usize = 2000;

pub fn role_mentions(role_ids: &[u64]) -> String {
    if role_ids.is_empty() {
        return "None".to_string();
    }
    role_ids.iter().map(|id| format!("<@&{id}>")).collect::<Vec<_>>().join(" ")
}

pub fn config_status(config: &SignupConfig) -> String {
    let mut lines = vec!["## 🛡️ GvG Configuration Summary".to_string()];

    match &config.management_channel {
        Some(c) => lines.push(format!("**Management Channel:** <#{}>", c.channel_id)),
        None => lines.push("**Management Channel:** ⚠️ Not set".to_string()),
    }
    match &config.selected_post {
        Some(p) => lines.push(format!("**Tracking Post:** [Jump to Message]({})", p.jump_url())),
        None => lines.push("**Tracking Post:** ⚠️ None".to_string()),
    }

    let emojis = if config.tracked_reactions.is_empty() {
        "None".to_string()
    } else {
        config.tracked_reactions.join(" ")
    };
    lines.push(format!("**Tracked Emojis:** {emojis}"));
    lines.push(format!("**GvG Roles:** {}", role_mentions(&config.tracked_role_ids)));
    lines.join("\n")
}

pub fn no_signups(reaction: &ReactionKey) -> String {
    format!("No signups with {reaction} yet.")
}

/// The summary-by-emoji post: header, role distribution and roster overview,
/// packed into as few messages as the length cap allows.
pub fn signup_report(
    reaction: &ReactionKey,
    summary: &[RoleSummary],
    rows: &[RosterRow],
    tracked_role_ids: &[u64],
) -> Vec<String> {
    let labels: Vec<String> = summary.iter().map(|s| s.label.clone()).collect();
    let mut pieces = vec![
        format!("## Signup Summary for {reaction}"),
        format!("### 📊 Role Distribution Summary\n```\n{}\n```", roster::summary_table(summary)),
    ];
    pieces.extend(code_block_pages(
        "### GvG Roster Overview",
        &roster::overview_table(rows, &labels),
        &format!("**Roles:** {}", role_mentions(tracked_role_ids)),
        MESSAGE_LIMIT,
    ));
    pack(pieces, MESSAGE_LIMIT)
}

pub fn role_members_report(
    role_label: &str,
    role_id: u64,
    reaction: Option<&ReactionKey>,
    lines: &[String],
) -> Vec<String> {
    let scope = match reaction {
        Some(r) => format!(" who reacted {r}"),
        None => String::new(),
    };
    if lines.is_empty() {
        return vec![format!("No signups{scope} hold <@&{role_id}>.")];
    }
    let mut out = vec![format!(
        "### {} signups{scope} with {role_label} (<@&{role_id}>)",
        lines.len()
    )];
    out.extend(lines.iter().cloned());
    pack(out, MESSAGE_LIMIT)
}

/// Join pieces with newlines, starting a new message when the next piece
/// would not fit.
pub fn pack(pieces: Vec<String>, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if !current.is_empty() && current.len() + 1 + piece.len() > limit {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Split a rendered table into code blocks that each fit `limit`, repeating
/// the header and rule on every page. `title` opens the first page, `footer`
/// closes the last.
pub fn code_block_pages(title: &str, table: &str, footer: &str, limit: usize) -> Vec<String> {
    let mut lines = table.lines();
    let head: Vec<&str> = lines.by_ref().take(2).collect();
    let head = head.join("\n");
    let close = "\n```";
    // Room kept free on every page so the footer always fits on the last one.
    let reserve = close.len() + 1 + footer.len();

    let mut pages = Vec::new();
    let mut current = format!("{title}\n```\n{head}");
    let mut has_rows = false;
    for row in lines {
        if has_rows && current.len() + 1 + row.len() + reserve > limit {
            current.push_str(close);
            pages.push(std::mem::replace(&mut current, format!("```\n{head}")));
            has_rows = false;
        }
        current.push('\n');
        current.push_str(row);
        has_rows = true;
    }
    current.push_str(close);
    if !footer.is_empty() {
        current.push('\n');
        current.push_str(footer);
    }
    pages.push(current);
    pages
}
