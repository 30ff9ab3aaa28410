use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::{Client, GatewayIntents};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gvg_signup_bot::config::AppConfig;
use gvg_signup_bot::db;
use gvg_signup_bot::handlers::{AppState, Handler};
use gvg_signup_bot::platform::discord::SerenityPlatform;
use gvg_signup_bot::signup::aggregate::ReactionCache;
use gvg_signup_bot::web::{self, WebState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gvg_signup_bot=info,serenity=warn,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::init_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to open the configuration store")?;
    info!(url = %config.database.url, "configuration store ready");

    let reaction_cache = Arc::new(ReactionCache::new(config.signup.reaction_cache_ttl));
    let state = Arc::new(AppState::new(
        pool.clone(),
        reaction_cache.clone(),
        config.signup.clone(),
    ));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(Handler::new(state))
        .await
        .context("error creating Discord client")?;

    if config.web.enabled {
        let platform = SerenityPlatform::new(client.http.clone(), client.cache.clone());
        let web_state = Arc::new(WebState::new(pool, platform, reaction_cache)?);
        let web_config = config.web.clone();
        tokio::spawn(async move {
            if let Err(e) = web::serve(&web_config, web_state).await {
                error!("web view stopped: {e:#}");
            }
        });
    }

    client.start().await.context("Discord client stopped")?;
    Ok(())
}
