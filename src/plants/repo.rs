use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::care::{self, CareKind, CareStatus};

const PLANT_COLUMNS: &str = "id, user_id, name, location, photo_url, \
     watering_frequency_days, last_watered_date, \
     fertilizing_frequency_days, last_fertilized_date, \
     repotting_frequency_months, last_repotted_date, \
     pruning_frequency_months, last_pruned_date, \
     notes, created_at";

/// One tracked plant. Watering is always active; the other three care
/// tracks are active only when both their frequency and last date are set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub watering_frequency_days: i32,
    pub last_watered_date: Date,
    pub fertilizing_frequency_days: Option<i32>,
    pub last_fertilized_date: Option<Date>,
    pub repotting_frequency_months: Option<i32>,
    pub last_repotted_date: Option<Date>,
    pub pruning_frequency_months: Option<i32>,
    pub last_pruned_date: Option<Date>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Plant {
    /// Active (last date, frequency) pair for a track. A track with only a
    /// frequency or only a date is inert and yields `None`; it never
    /// participates in scheduling.
    pub fn track(&self, kind: CareKind) -> Option<(Date, i32)> {
        match kind {
            CareKind::Water => Some((self.last_watered_date, self.watering_frequency_days)),
            CareKind::Fertilize => self
                .last_fertilized_date
                .zip(self.fertilizing_frequency_days),
            CareKind::Repot => self.last_repotted_date.zip(self.repotting_frequency_months),
            CareKind::Prune => self.last_pruned_date.zip(self.pruning_frequency_months),
        }
    }

    pub fn care_status(&self, kind: CareKind, today: Date) -> Option<CareStatus> {
        self.track(kind)
            .map(|(last, frequency)| care::status(last, frequency, kind.unit(), today))
    }
}

pub struct NewPlant {
    pub name: String,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub watering_frequency_days: i32,
    pub last_watered_date: Date,
    pub fertilizing_frequency_days: Option<i32>,
    pub last_fertilized_date: Option<Date>,
    pub repotting_frequency_months: Option<i32>,
    pub last_repotted_date: Option<Date>,
    pub pruning_frequency_months: Option<i32>,
    pub last_pruned_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct PlantChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub watering_frequency_days: Option<i32>,
    pub last_watered_date: Option<Date>,
    pub fertilizing_frequency_days: Option<i32>,
    pub last_fertilized_date: Option<Date>,
    pub repotting_frequency_months: Option<i32>,
    pub last_repotted_date: Option<Date>,
    pub pruning_frequency_months: Option<i32>,
    pub last_pruned_date: Option<Date>,
    pub notes: Option<String>,
}

pub async fn create(db: &PgPool, user_id: Uuid, new: NewPlant) -> anyhow::Result<Plant> {
    let sql = format!(
        r#"
        INSERT INTO plants (user_id, name, location, photo_url,
            watering_frequency_days, last_watered_date,
            fertilizing_frequency_days, last_fertilized_date,
            repotting_frequency_months, last_repotted_date,
            pruning_frequency_months, last_pruned_date, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {PLANT_COLUMNS}
        "#
    );
    let plant = sqlx::query_as::<_, Plant>(&sql)
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.location)
        .bind(&new.photo_url)
        .bind(new.watering_frequency_days)
        .bind(new.last_watered_date)
        .bind(new.fertilizing_frequency_days)
        .bind(new.last_fertilized_date)
        .bind(new.repotting_frequency_months)
        .bind(new.last_repotted_date)
        .bind(new.pruning_frequency_months)
        .bind(new.last_pruned_date)
        .bind(&new.notes)
        .fetch_one(db)
        .await?;
    Ok(plant)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Plant>> {
    let sql = format!("SELECT {PLANT_COLUMNS} FROM plants WHERE user_id = $1");
    let plants = sqlx::query_as::<_, Plant>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(plants)
}

/// Full scan, used only by the notification sweep.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Plant>> {
    let sql = format!("SELECT {PLANT_COLUMNS} FROM plants");
    let plants = sqlx::query_as::<_, Plant>(&sql).fetch_all(db).await?;
    Ok(plants)
}

/// Partial update. Absent fields keep their current value; `id` and
/// `user_id` are never written.
pub async fn update_partial(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    changes: PlantChanges,
) -> anyhow::Result<Option<Plant>> {
    let sql = format!(
        r#"
        UPDATE plants SET
            name = COALESCE($3, name),
            location = COALESCE($4, location),
            photo_url = COALESCE($5, photo_url),
            watering_frequency_days = COALESCE($6, watering_frequency_days),
            last_watered_date = COALESCE($7, last_watered_date),
            fertilizing_frequency_days = COALESCE($8, fertilizing_frequency_days),
            last_fertilized_date = COALESCE($9, last_fertilized_date),
            repotting_frequency_months = COALESCE($10, repotting_frequency_months),
            last_repotted_date = COALESCE($11, last_repotted_date),
            pruning_frequency_months = COALESCE($12, pruning_frequency_months),
            last_pruned_date = COALESCE($13, last_pruned_date),
            notes = COALESCE($14, notes)
        WHERE id = $1 AND user_id = $2
        RETURNING {PLANT_COLUMNS}
        "#
    );
    let plant = sqlx::query_as::<_, Plant>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(changes.name)
        .bind(changes.location)
        .bind(changes.photo_url)
        .bind(changes.watering_frequency_days)
        .bind(changes.last_watered_date)
        .bind(changes.fertilizing_frequency_days)
        .bind(changes.last_fertilized_date)
        .bind(changes.repotting_frequency_months)
        .bind(changes.last_repotted_date)
        .bind(changes.pruning_frequency_months)
        .bind(changes.last_pruned_date)
        .bind(changes.notes)
        .fetch_optional(db)
        .await?;
    Ok(plant)
}

/// Records a care action: sets only that track's last date. Returns `None`
/// when the plant no longer exists (or is not owned by the caller), so bulk
/// callers can observe concurrent deletions.
pub async fn set_care_date(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    kind: CareKind,
    date: Date,
) -> anyhow::Result<Option<Plant>> {
    let column = match kind {
        CareKind::Water => "last_watered_date",
        CareKind::Fertilize => "last_fertilized_date",
        CareKind::Repot => "last_repotted_date",
        CareKind::Prune => "last_pruned_date",
    };
    let sql = format!(
        "UPDATE plants SET {column} = $3 WHERE id = $1 AND user_id = $2 RETURNING {PLANT_COLUMNS}"
    );
    let plant = sqlx::query_as::<_, Plant>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
    Ok(plant)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM plants WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use time::macros::datetime;

    /// Plant with only the watering track active.
    pub fn plant(user_id: Uuid, name: &str, frequency_days: i32, last_watered: Date) -> Plant {
        Plant {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            location: None,
            photo_url: None,
            watering_frequency_days: frequency_days,
            last_watered_date: last_watered,
            fertilizing_frequency_days: None,
            last_fertilized_date: None,
            repotting_frequency_months: None,
            last_repotted_date: None,
            pruning_frequency_months: None,
            last_pruned_date: None,
            notes: None,
            created_at: datetime!(2024-01-01 00:00 UTC),
        }
    }
}
