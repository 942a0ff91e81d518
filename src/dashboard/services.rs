use time::{Date, Duration};
use uuid::Uuid;

use crate::care::{self, CareKind, CareState, CareStatus};
use crate::plants::repo::Plant;

/// A plant with its watering track classified against one fixed `today`.
#[derive(Debug, Clone)]
pub struct Classified {
    pub plant: Plant,
    pub status: CareStatus,
}

/// Splits a user's plants into `needs_water` (overdue or due today) and
/// `up_to_date` (upcoming). Each group is sorted ascending by due date, so
/// the most overdue plant comes first; ties break on plant id to keep the
/// order total.
pub fn partition(plants: Vec<Plant>, today: Date) -> (Vec<Classified>, Vec<Classified>) {
    let mut needs_water = Vec::new();
    let mut up_to_date = Vec::new();

    for plant in plants {
        // The watering track is required, so it always classifies.
        let status = care::status(
            plant.last_watered_date,
            plant.watering_frequency_days,
            CareKind::Water.unit(),
            today,
        );
        let entry = Classified { plant, status };
        match entry.status.state {
            CareState::Overdue | CareState::DueToday => needs_water.push(entry),
            CareState::Upcoming => up_to_date.push(entry),
        }
    }

    let key = |c: &Classified| (c.status.due_date, c.plant.id);
    needs_water.sort_by_key(key);
    up_to_date.sort_by_key(key);
    (needs_water, up_to_date)
}

/// The two bulk actions on the dashboard's "needs water" group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Water,
    Postpone,
}

/// The watered date a bulk action writes. Watering stamps today; postponing
/// stamps yesterday, so every touched plant comes due again tomorrow no
/// matter how overdue it was.
pub fn bulk_target_date(action: BulkAction, today: Date) -> Date {
    match action {
        BulkAction::Water => today,
        BulkAction::Postpone => today - Duration::days(1),
    }
}

/// Plants the bulk water/postpone actions should touch: everything in
/// `needs_water`, except plants already watered today, which are satisfied
/// for the day and must not be re-actioned.
pub fn due_for_watering(plants: &[Plant], today: Date) -> Vec<Uuid> {
    let mut due: Vec<(Date, Uuid)> = plants
        .iter()
        .filter(|p| p.last_watered_date != today)
        .filter_map(|p| {
            let status = p.care_status(CareKind::Water, today)?;
            match status.state {
                CareState::Overdue | CareState::DueToday => Some((status.due_date, p.id)),
                CareState::Upcoming => None,
            }
        })
        .collect();
    due.sort();
    due.into_iter().map(|(_, id)| id).collect()
}
