use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::debug;

use crate::flows::{is_live, parse_component_id};

pub const EXPIRED_NOTICE: &str = "This menu has expired. Run the command again.";

/// Live flows are answered by their own collector. Anything else carrying a
/// flow id belongs to a flow that timed out or predates a restart.
pub async fn handle_component(ctx: &Context, it: &ComponentInteraction) -> anyhow::Result<()> {
    let Some((action, flow_id)) = parse_component_id(&it.data.custom_id) else {
        return Ok(());
    };
    if is_live(flow_id) {
        return Ok(());
    }
    debug!(%flow_id, action, "component for a finished flow");
    it.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().content(EXPIRED_NOTICE).ephemeral(true),
        ),
    )
    .await?;
    Ok(())
}
