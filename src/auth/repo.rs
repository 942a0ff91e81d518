use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub notification_time: String,
    pub created_at: OffsetDateTime,
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, notification_time, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, notification_time, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING id, email, password_hash, notification_time, created_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn set_notification_time(
    db: &PgPool,
    user_id: Uuid,
    notification_time: &str,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET notification_time = $2
        WHERE id = $1
        RETURNING id, email, password_hash, notification_time, created_at
        "#,
    )
    .bind(user_id)
    .bind(notification_time)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Preferred reminder times for the whole user base, for the sweep's
/// hour gate.
pub async fn notification_times(db: &PgPool) -> anyhow::Result<HashMap<Uuid, String>> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT id, notification_time
        FROM users
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}
