use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::model::TrackerSnapshot;

/// Load the user's snapshot; users who never saved one get the defaults.
pub async fn load_snapshot(db: &PgPool, user_id: Uuid) -> anyhow::Result<TrackerSnapshot> {
    let row = sqlx::query_as::<_, (Json<TrackerSnapshot>,)>(
        r#"
        SELECT snapshot
          FROM tracker_snapshots
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load tracker snapshot")?;

    Ok(row.map(|(Json(s),)| s).unwrap_or_default())
}

pub async fn save_snapshot(
    db: &PgPool,
    user_id: Uuid,
    snapshot: &TrackerSnapshot,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tracker_snapshots (user_id, snapshot, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (user_id)
        DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(Json(snapshot))
    .execute(db)
    .await
    .context("save tracker snapshot")?;

    Ok(())
}
