use crate::db::models::{SignupConfig, SignupConfigRow, SignupConfigUpdate};
use sqlx::{SqliteConnection, SqlitePool};

/// Primary key of the singleton config row.
pub const SIGNUP_CONFIG_ID: i64 = 1;

async fn ensure_row(conn: &mut SqliteConnection) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO signup_config (id) VALUES (?1) ON CONFLICT(id) DO NOTHING")
        .bind(SIGNUP_CONFIG_ID)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn load(conn: &mut SqliteConnection) -> sqlx::Result<SignupConfig> {
    let row: SignupConfigRow = sqlx::query_as(
        r#"
        SELECT id, management_channel, selected_post, gvg_roles, gvg_reacts
        FROM signup_config
        WHERE id = ?1
        "#,
    )
    .bind(SIGNUP_CONFIG_ID)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into_config())
}

/// Read the config, creating the empty singleton on first use.
pub async fn get_signup_config(pool: &SqlitePool) -> sqlx::Result<SignupConfig> {
    let mut conn = pool.acquire().await?;
    ensure_row(&mut *conn).await?;
    load(&mut *conn).await
}

/// Merge the set fields of `update` into the stored config and return the result.
///
/// The merge happens inside one `UPDATE` so two admins saving at the same time
/// cannot lose each other's untouched fields; the later commit wins per field.
pub async fn update_signup_config(
    pool: &SqlitePool,
    update: &SignupConfigUpdate,
) -> sqlx::Result<SignupConfig> {
    let management_channel =
        nullable_column(update.management_channel.as_ref().map(|v| v.as_ref().map(encode)));
    let selected_post =
        nullable_column(update.selected_post.as_ref().map(|v| v.as_ref().map(encode)));
    let roles = update.tracked_role_ids.as_ref().map(encode);
    let reacts = update.tracked_reactions.as_ref().map(encode);

    let mut tx = pool.begin().await?;
    ensure_row(&mut *tx).await?;
    sqlx::query(
        r#"
        UPDATE signup_config SET
            management_channel = CASE WHEN ?1 THEN ?2 ELSE management_channel END,
            selected_post      = CASE WHEN ?3 THEN ?4 ELSE selected_post END,
            gvg_roles          = COALESCE(?5, gvg_roles),
            gvg_reacts         = COALESCE(?6, gvg_reacts)
        WHERE id = ?7
        "#,
    )
    .bind(management_channel.0)
    .bind(management_channel.1)
    .bind(selected_post.0)
    .bind(selected_post.1)
    .bind(roles)
    .bind(reacts)
    .bind(SIGNUP_CONFIG_ID)
    .execute(&mut *tx)
    .await?;
    let config = load(&mut *tx).await?;
    tx.commit().await?;
    Ok(config)
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Plain data (ids, strings) always serializes.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// `(is_set, new_value)` pair for nullable columns.
fn nullable_column(value: Option<Option<String>>) -> (bool, Option<String>) {
    match value {
        Some(v) => (true, v),
        None => (false, None),
    }
}

/// Number of config rows; only used to check the singleton invariant.
pub async fn count_signup_configs(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signup_config")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
