use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scheduling::Interval;

/// Weekly recurring window, `day_of_week` 0 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "interviewer_id": 7,
    "day_of_week": 1,
    "start_time": "09:00:00",
    "end_time": "12:00:00",
    "is_active": true
}))]
pub struct AvailabilityWindow {
    pub id: u64,
    pub interviewer_id: u64,
    pub day_of_week: u8,
    #[schema(value_type = String, format = "time")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, format = "time")]
    pub end_time: NaiveTime,
    pub is_active: bool,
}

pub fn day_of_week(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_sunday() as u8
}

impl AvailabilityWindow {
    /// The slot must start and end on the window's day, inside `[start_time, end_time]`.
    /// Slots crossing midnight never fit.
    pub fn fits(&self, slot: &Interval) -> bool {
        if !self.is_active || day_of_week(slot.start) != self.day_of_week {
            return false;
        }
        if slot.start.date_naive() != slot.end.date_naive() {
            return false;
        }
        self.start_time <= slot.start.time() && slot.end.time() <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(day: u8, from: (u32, u32), to: (u32, u32)) -> AvailabilityWindow {
        AvailabilityWindow {
            id: 1,
            interviewer_id: 7,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(from.0, from.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(to.0, to.1, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn sunday_is_day_zero() {
        let sunday = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        assert_eq!(day_of_week(sunday), 0);
        let wednesday = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        assert_eq!(day_of_week(wednesday), 3);
    }

    #[test]
    fn slot_must_sit_inside_window() {
        let w = window(3, (9, 0), (12, 0));
        let start = |h, m| Utc.with_ymd_and_hms(2025, 10, 1, h, m, 0).unwrap();
        assert!(w.fits(&Interval::from_minutes(start(9, 0), 30)));
        assert!(w.fits(&Interval::from_minutes(start(11, 30), 30)));
        assert!(!w.fits(&Interval::from_minutes(start(11, 45), 30)));
        assert!(!w.fits(&Interval::from_minutes(start(8, 45), 30)));
    }

    #[test]
    fn inactive_or_other_day_never_fits() {
        let mut w = window(4, (9, 0), (17, 0));
        let slot = Interval::from_minutes(Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap(), 30);
        assert!(!w.fits(&slot));
        w.day_of_week = 3;
        assert!(w.fits(&slot));
        w.is_active = false;
        assert!(!w.fits(&slot));
    }
}
