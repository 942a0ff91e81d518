use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::plants::repo::{NewPlant, Plant, PlantChanges};

#[derive(Debug, Deserialize)]
pub struct CreatePlantRequest {
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

impl From<CreatePlantRequest> for NewPlant {
    fn from(r: CreatePlantRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
            photo_url: r.photo_url,
            watering_frequency_days: r.watering_frequency_days,
            last_watered_date: r.last_watered_date,
            fertilizing_frequency_days: r.fertilizing_frequency_days,
            last_fertilized_date: r.last_fertilized_date,
            repotting_frequency_months: r.repotting_frequency_months,
            last_repotted_date: r.last_repotted_date,
            pruning_frequency_months: r.pruning_frequency_months,
            last_pruned_date: r.last_pruned_date,
            notes: r.notes,
        }
    }
}

/// Partial update; absent fields are left untouched. `id` and owner are not
/// accepted here at all.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlantRequest {
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

impl From<UpdatePlantRequest> for PlantChanges {
    fn from(r: UpdatePlantRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
            photo_url: r.photo_url,
            watering_frequency_days: r.watering_frequency_days,
            last_watered_date: r.last_watered_date,
            fertilizing_frequency_days: r.fertilizing_frequency_days,
            last_fertilized_date: r.last_fertilized_date,
            repotting_frequency_months: r.repotting_frequency_months,
            last_repotted_date: r.last_repotted_date,
            pruning_frequency_months: r.pruning_frequency_months,
            last_pruned_date: r.last_pruned_date,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub id: Uuid,
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

impl From<Plant> for PlantResponse {
    fn from(p: Plant) -> Self {
        Self {
            id: p.id,
            name: p.name,
            location: p.location,
            photo_url: p.photo_url,
            watering_frequency_days: p.watering_frequency_days,
            last_watered_date: p.last_watered_date,
            fertilizing_frequency_days: p.fertilizing_frequency_days,
            last_fertilized_date: p.last_fertilized_date,
            repotting_frequency_months: p.repotting_frequency_months,
            last_repotted_date: p.last_repotted_date,
            pruning_frequency_months: p.pruning_frequency_months,
            last_pruned_date: p.last_pruned_date,
            notes: p.notes,
            created_at: p.created_at,
        }
    }
}
