//! Read-only web view of the current signup.

pub mod roster;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use minijinja::{context, Environment};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::WebConfig;
use crate::error::BotError;
use crate::platform::discord::SerenityPlatform;
use crate::platform::Platform;
use crate::signup::aggregate::{aggregate_cached, ReactionCache};
use crate::signup::hydrate::hydrate_signup;

pub struct WebState {
    pub pool: SqlitePool,
    pub platform: SerenityPlatform,
    pub reaction_cache: Arc<ReactionCache>,
    templates: Environment<'static>,
}

impl WebState {
    pub fn new(
        pool: SqlitePool,
        platform: SerenityPlatform,
        reaction_cache: Arc<ReactionCache>,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self { pool, platform, reaction_cache, templates: templates()? })
    }

    fn render<S: serde::Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, WebError> {
        Ok(Html(self.templates.get_template(name)?.render(ctx)?))
    }
}

pub fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("../../templates/base.html"))?;
    env.add_template("index.html", include_str!("../../templates/index.html"))?;
    env.add_template("roster.html", include_str!("../../templates/roster.html"))?;
    Ok(env)
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Bot(#[from] BotError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::Bot(e) if e.is_not_configured() => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
            }
            _ => {
                error!("web request failed: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/roster", get(view_roster))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &WebConfig, state: Arc<WebState>) -> anyhow::Result<()> {
    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("web view listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<WebState>>) -> Result<Html<String>, WebError> {
    state.render("index.html", context! { message => "The Team Builder is under construction!" })
}

async fn view_roster(State(state): State<Arc<WebState>>) -> Result<Html<String>, WebError> {
    let signup = hydrate_signup(&state.platform, &state.pool).await?;
    let reactions = aggregate_cached(&state.platform, &state.reaction_cache, &signup.post).await?;
    let members = reactions.union();
    let guild_name = state
        .platform
        .guild_name(signup.guild_id)
        .await?
        .unwrap_or_else(|| signup.guild_id.to_string());

    let view = roster::roster_view(guild_name, &members, &signup.roles);
    state.render("roster.html", &view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_compile_and_render() {
        let env = templates().unwrap();
        let page = env
            .get_template("index.html")
            .unwrap()
            .render(context! { message => "hello there" })
            .unwrap();
        assert!(page.contains("hello there"));

        let view = roster::roster_view(
            "Night Watch".into(),
            &[crate::platform::SignupMember {
                id: 7,
                display_name: "Ser <Jorah>".into(),
                avatar_url: "https://cdn.example/7.png".into(),
                role_ids: vec![1],
            }],
            &[crate::platform::RoleInfo {
                id: 1,
                name: "Tank".into(),
                colour: "#3498db".into(),
                position: 2,
                is_default: false,
            }],
        );
        let page = env.get_template("roster.html").unwrap().render(&view).unwrap();
        assert!(page.contains("Night Watch"));
        assert!(page.contains("Ser &lt;Jorah&gt;"));
        assert!(page.contains("#3498db"));
    }

    #[test]
    fn not_configured_is_service_unavailable() {
        let res = WebError::Bot(BotError::NoSignupPost).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let res = WebError::Bot(BotError::Storage(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
