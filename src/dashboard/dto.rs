use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::care::CareState;
use crate::dashboard::services::Classified;
use crate::plants::dto::PlantResponse;

#[derive(Debug, Serialize)]
pub struct DashboardPlant {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub due_date: Date,
    pub state: CareState,
    /// Days overdue when overdue, days until due otherwise.
    pub days: i64,
}

impl From<Classified> for DashboardPlant {
    fn from(c: Classified) -> Self {
        Self {
            id: c.plant.id,
            name: c.plant.name,
            location: c.plant.location,
            photo_url: c.plant.photo_url,
            due_date: c.status.due_date,
            state: c.status.state,
            days: c.status.days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub needs_water: Vec<DashboardPlant>,
    pub up_to_date: Vec<DashboardPlant>,
}

/// Result of a bulk action: how many plants were touched (may be fewer than
/// were due, on partial failure) and their updated records.
#[derive(Debug, Serialize)]
pub struct BulkActionResponse {
    pub updated: usize,
    pub plants: Vec<PlantResponse>,
}
