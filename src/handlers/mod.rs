pub mod components;

use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::{CommandInteraction, Context, EventHandler, Interaction, Ready};
use serenity::async_trait;
use serenity::prelude::TypeMapKey;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::commands;
use crate::config::SignupSettings;
use crate::error::BotError;
use crate::signup::aggregate::ReactionCache;

/// Shared by every interaction.
pub struct AppState {
    pub pool: SqlitePool,
    pub reaction_cache: Arc<ReactionCache>,
    pub settings: SignupSettings,
}

impl AppState {
    pub fn new(pool: SqlitePool, reaction_cache: Arc<ReactionCache>, settings: SignupSettings) -> Self {
        Self { pool, reaction_cache, settings }
    }
}

pub struct Handler {
    state: Arc<AppState>,
}

impl Handler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected");
        {
            let mut data = ctx.data.write().await;
            data.insert::<StateKey>(self.state.clone());
        }

        if let Err(e) = commands::register_commands(&ctx).await {
            error!("failed to register commands: {e:#}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) => {
                if let Err(e) = commands::handle(&ctx, &cmd).await {
                    report_failure(&ctx, &cmd, e).await;
                }
            }
            Interaction::Autocomplete(ac) => {
                if let Err(e) = commands::autocomplete(&ctx, &ac).await {
                    warn!(command = %ac.data.name, "autocomplete failed: {e:#}");
                }
            }
            Interaction::Component(comp) => {
                if let Err(e) = components::handle_component(&ctx, &comp).await {
                    warn!("component error: {e:#}");
                }
            }
            _ => {}
        }
    }
}

/// Not-configured errors go back to the user as instructions; anything else is
/// logged and answered with a generic notice.
async fn report_failure(ctx: &Context, cmd: &CommandInteraction, err: anyhow::Error) {
    let content = match err.downcast_ref::<BotError>() {
        Some(e) if e.is_not_configured() => e.to_string(),
        _ => {
            error!(command = %cmd.data.name, user = cmd.user.id.get(), "command failed: {err:#}");
            "Something went wrong while handling that command. Please try again later.".to_string()
        }
    };
    if let Err(e) = commands::reply_ephemeral(ctx, cmd, content).await {
        error!(command = %cmd.data.name, "could not report failure to user: {e}");
    }
}

/* Context data access */
pub struct StateKey;
impl TypeMapKey for StateKey {
    type Value = Arc<AppState>;
}

pub async fn state_from_ctx(ctx: &Context) -> anyhow::Result<Arc<AppState>> {
    let data = ctx.data.read().await;
    data.get::<StateKey>().cloned().context("app state missing from context")
}
