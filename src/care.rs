//! Pure care-scheduling arithmetic.
//!
//! All dates are UTC calendar days; time of day never enters any comparison.
//! Month addition clamps the day-of-month to the target month's length
//! (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year).

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

/// One of the four care tracks a plant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareKind {
    Water,
    Fertilize,
    Repot,
    Prune,
}

impl CareKind {
    pub const ALL: [CareKind; 4] = [
        CareKind::Water,
        CareKind::Fertilize,
        CareKind::Repot,
        CareKind::Prune,
    ];

    /// Imperative verb used in notification messages.
    pub fn verb(self) -> &'static str {
        match self {
            CareKind::Water => "Water",
            CareKind::Fertilize => "Fertilize",
            CareKind::Repot => "Repot",
            CareKind::Prune => "Prune",
        }
    }

    /// Watering and fertilizing cadences are in days, repotting and pruning
    /// in months.
    pub fn unit(self) -> CareUnit {
        match self {
            CareKind::Water | CareKind::Fertilize => CareUnit::Days,
            CareKind::Repot | CareKind::Prune => CareUnit::Months,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareUnit {
    Days,
    Months,
}

/// Where a due date stands relative to today. Ternary on purpose: the
/// boundary between overdue and due-today is a classification, not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareState {
    Overdue,
    DueToday,
    Upcoming,
}

/// Next due date for a track last performed on `last` with the given
/// cadence. The caller guarantees `frequency >= 1`. A cadence that would
/// run off the calendar saturates to the maximum date, which classifies as
/// far-future upcoming; stored data can never panic the scheduler.
pub fn next_due(last: Date, frequency: i32, unit: CareUnit) -> Date {
    match unit {
        CareUnit::Days => last
            .checked_add(Duration::days(i64::from(frequency)))
            .unwrap_or(Date::MAX),
        CareUnit::Months => add_months(last, frequency),
    }
}

fn add_months(date: Date, months: i32) -> Date {
    let zero_based = i64::from(date.month() as u8) - 1 + i64::from(months);
    let Ok(year) = i32::try_from(i64::from(date.year()) + zero_based.div_euclid(12)) else {
        return Date::MAX;
    };
    // rem_euclid(12) + 1 is always 1..=12.
    let Ok(month) = Month::try_from((zero_based.rem_euclid(12) + 1) as u8) else {
        return Date::MAX;
    };
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).unwrap_or(Date::MAX)
}

pub fn classify(due: Date, today: Date) -> CareState {
    match due.cmp(&today) {
        std::cmp::Ordering::Less => CareState::Overdue,
        std::cmp::Ordering::Equal => CareState::DueToday,
        std::cmp::Ordering::Greater => CareState::Upcoming,
    }
}

/// Absolute whole-day distance between two dates. Display and grouping
/// only; never used to classify.
pub fn days_between(a: Date, b: Date) -> i64 {
    (a - b).whole_days().abs()
}

/// A classified track, computed against one fixed `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CareStatus {
    pub due_date: Date,
    pub state: CareState,
    /// Days overdue when `state` is `Overdue`, days until due otherwise.
    pub days: i64,
}

pub fn status(last: Date, frequency: i32, unit: CareUnit, today: Date) -> CareStatus {
    let due_date = next_due(last, frequency, unit);
    CareStatus {
        due_date,
        state: classify(due_date, today),
        days: days_between(due_date, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn next_due_adds_days() {
        assert_eq!(
            next_due(date!(2024 - 03 - 01), 7, CareUnit::Days),
            date!(2024 - 03 - 08)
        );
    }

    #[test]
    fn next_due_crosses_year_boundary() {
        assert_eq!(
            next_due(date!(2024 - 12 - 30), 3, CareUnit::Days),
            date!(2025 - 01 - 02)
        );
    }

    #[test]
    fn month_addition_clamps_to_end_of_month() {
        assert_eq!(
            next_due(date!(2023 - 01 - 31), 1, CareUnit::Months),
            date!(2023 - 02 - 28)
        );
        // Leap year keeps the 29th.
        assert_eq!(
            next_due(date!(2024 - 01 - 31), 1, CareUnit::Months),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            next_due(date!(2024 - 08 - 31), 1, CareUnit::Months),
            date!(2024 - 09 - 30)
        );
    }

    #[test]
    fn month_addition_wraps_years() {
        assert_eq!(
            next_due(date!(2023 - 11 - 15), 14, CareUnit::Months),
            date!(2025 - 01 - 15)
        );
    }

    #[test]
    fn classify_is_ternary() {
        let today = date!(2024 - 06 - 10);
        assert_eq!(classify(date!(2024 - 06 - 09), today), CareState::Overdue);
        assert_eq!(classify(today, today), CareState::DueToday);
        assert_eq!(classify(date!(2024 - 06 - 11), today), CareState::Upcoming);
    }

    #[test]
    fn due_date_lands_exactly_on_due_today() {
        // classify(next_due(d, f, days), d + f) == DueToday, for a sample of f.
        let last = date!(2024 - 02 - 27);
        for f in [1, 3, 7, 30, 365] {
            let due = next_due(last, f, CareUnit::Days);
            assert_eq!(classify(due, last + Duration::days(i64::from(f))), CareState::DueToday);
        }
    }

    #[test]
    fn eight_days_since_weekly_watering_is_one_day_overdue() {
        let today = date!(2024 - 05 - 20);
        let s = status(today - Duration::days(8), 7, CareUnit::Days, today);
        assert_eq!(s.state, CareState::Overdue);
        assert_eq!(s.days, 1);
    }

    #[test]
    fn exactly_on_cadence_is_due_today() {
        let today = date!(2024 - 05 - 20);
        let s = status(today - Duration::days(3), 3, CareUnit::Days, today);
        assert_eq!(s.state, CareState::DueToday);
        assert_eq!(s.days, 0);
    }

    #[test]
    fn absurd_frequencies_saturate_instead_of_panicking() {
        let today = date!(2024 - 06 - 10);
        let due = next_due(today, i32::MAX, CareUnit::Days);
        assert_eq!(classify(due, today), CareState::Upcoming);
        let due = next_due(today, 1_200_000, CareUnit::Months);
        assert_eq!(classify(due, today), CareState::Upcoming);
    }

    #[test]
    fn days_between_is_absolute() {
        assert_eq!(days_between(date!(2024 - 01 - 01), date!(2024 - 01 - 11)), 10);
        assert_eq!(days_between(date!(2024 - 01 - 11), date!(2024 - 01 - 01)), 10);
    }
}
