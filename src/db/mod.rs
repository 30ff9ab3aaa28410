use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

pub mod models;
pub mod repo;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS signup_config (
    id                 INTEGER PRIMARY KEY CHECK (id = 1),
    management_channel TEXT,
    selected_post      TEXT,
    gvg_roles          TEXT NOT NULL DEFAULT '[]',
    gvg_reacts         TEXT NOT NULL DEFAULT '[]'
)
"#;

pub async fn init_pool(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Create the tables this bot owns. Safe to call on every start.
pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
