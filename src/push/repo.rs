use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One registered browser endpoint. The table is keyed by `user_id`, so a
/// user can hold at most one subscription at a time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushSubscription {
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: OffsetDateTime,
}

/// Registers a subscription, superseding any existing one for the user.
pub async fn replace_for_user(
    db: &PgPool,
    user_id: Uuid,
    endpoint: &str,
    p256dh: &str,
    auth: &str,
) -> anyhow::Result<PushSubscription> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let sub = sqlx::query_as::<_, PushSubscription>(
        r#"
        INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
        VALUES ($1, $2, $3, $4)
        RETURNING user_id, endpoint, p256dh, auth, created_at
        "#,
    )
    .bind(user_id)
    .bind(endpoint)
    .bind(p256dh)
    .bind(auth)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(sub)
}

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<PushSubscription>> {
    let sub = sqlx::query_as::<_, PushSubscription>(
        r#"
        SELECT user_id, endpoint, p256dh, auth, created_at
        FROM push_subscriptions
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(sub)
}

/// Used only by the notification sweep.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<PushSubscription>> {
    let subs = sqlx::query_as::<_, PushSubscription>(
        r#"
        SELECT user_id, endpoint, p256dh, auth, created_at
        FROM push_subscriptions
        ORDER BY created_at
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(subs)
}

/// Opt-out. Deleting an absent row is a no-op.
pub async fn delete_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Prunes a subscription the push service reported gone. Matching on both
/// user and endpoint keeps the delete idempotent and means a re-subscription
/// that raced in with a fresh endpoint is left alone.
pub async fn delete_endpoint(db: &PgPool, user_id: Uuid, endpoint: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
        .bind(user_id)
        .bind(endpoint)
        .execute(db)
        .await?;
    Ok(())
}
