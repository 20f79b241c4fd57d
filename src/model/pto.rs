use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PtoType {
    Vacation,
    Sick,
    Personal,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PtoStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "start_date": "2026-01-05",
    "end_date": "2026-01-07",
    "days": 3.0,
    "half_day": false,
    "pto_type": "vacation",
    "status": "pending",
    "reason": "Family trip",
    "reviewed_by": null,
    "reviewed_at": null,
    "created_at": "2026-01-01T00:00:00Z"
}))]
pub struct PtoRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub days: f64,
    pub half_day: bool,
    #[schema(value_type = PtoType)]
    pub pto_type: String,
    #[schema(value_type = PtoStatus)]
    pub status: String,
    pub reason: Option<String>,
    pub reviewed_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PtoPolicy {
    #[schema(example = "vacation", value_type = PtoType)]
    pub pto_type: String,
    #[schema(example = 15.0)]
    pub annual_allowance: f64,
}

#[derive(Debug, PartialEq)]
pub enum DayCountError {
    EndBeforeStart,
    HalfDaySpansDays,
    NoWorkingDays,
}

impl DayCountError {
    pub fn message(&self) -> &'static str {
        match self {
            DayCountError::EndBeforeStart => "start_date cannot be after end_date",
            DayCountError::HalfDaySpansDays => "A half-day request must start and end on the same day",
            DayCountError::NoWorkingDays => "The requested range contains no working days",
        }
    }
}

fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Days charged against the balance: weekdays in `[start, end]`, or 0.5 for a half day.
pub fn count_pto_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> Result<f64, DayCountError> {
    if start > end {
        return Err(DayCountError::EndBeforeStart);
    }
    if half_day {
        if start != end {
            return Err(DayCountError::HalfDaySpansDays);
        }
        return if is_working_day(start) {
            Ok(0.5)
        } else {
            Err(DayCountError::NoWorkingDays)
        };
    }

    let mut days = 0u32;
    let mut cursor = start;
    while cursor <= end {
        if is_working_day(cursor) {
            days += 1;
        }
        cursor = cursor + Duration::days(1);
    }

    if days == 0 {
        return Err(DayCountError::NoWorkingDays);
    }
    Ok(f64::from(days))
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct PtoBalance {
    #[schema(example = "vacation", value_type = PtoType)]
    pub pto_type: PtoType,
    #[schema(example = 15.0)]
    pub allowance: f64,
    #[schema(example = 4.5)]
    pub used: f64,
    #[schema(example = 2.0)]
    pub pending: f64,
    #[schema(example = 10.5)]
    pub remaining: f64,
}

impl PtoBalance {
    pub fn new(pto_type: PtoType, allowance: f64, used: f64, pending: f64) -> Self {
        Self {
            pto_type,
            allowance,
            used,
            pending,
            remaining: allowance - used,
        }
    }

    pub fn can_take(&self, days: f64) -> bool {
        self.used + days <= self.allowance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn full_week_skips_the_weekend() {
        // 2025-10-06 is a Monday
        assert_eq!(count_pto_days(d(2025, 10, 6), d(2025, 10, 12), false), Ok(5.0));
        assert_eq!(count_pto_days(d(2025, 10, 10), d(2025, 10, 13), false), Ok(2.0));
    }

    #[test]
    fn half_day_counts_half() {
        assert_eq!(count_pto_days(d(2025, 10, 7), d(2025, 10, 7), true), Ok(0.5));
        assert_eq!(
            count_pto_days(d(2025, 10, 7), d(2025, 10, 8), true),
            Err(DayCountError::HalfDaySpansDays)
        );
    }

    #[test]
    fn weekend_only_range_is_rejected() {
        assert_eq!(
            count_pto_days(d(2025, 10, 11), d(2025, 10, 12), false),
            Err(DayCountError::NoWorkingDays)
        );
        assert_eq!(
            count_pto_days(d(2025, 10, 11), d(2025, 10, 11), true),
            Err(DayCountError::NoWorkingDays)
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            count_pto_days(d(2025, 10, 8), d(2025, 10, 7), false),
            Err(DayCountError::EndBeforeStart)
        );
    }

    #[test]
    fn balance_tracks_approved_days_only() {
        let balance = PtoBalance::new(PtoType::Vacation, 15.0, 12.5, 4.0);
        assert_eq!(balance.remaining, 2.5);
        assert!(balance.can_take(2.5));
        assert!(!balance.can_take(3.0));
    }
}
