use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, warn};

use crate::model::employee::EmployeeRef;
use crate::scheduling::{Availability, BookedInterview, ConflictPolicy, Interval, PtoBooking, ScheduleContext};
use crate::utils::availability_cache;

/// Who the interview is booked with.
#[derive(Debug, Clone)]
pub enum Interviewer {
    Employee(EmployeeRef),
    /// Free-text name for people without an employee record.
    Named(String),
}

impl Interviewer {
    pub fn label(&self) -> String {
        match self {
            Interviewer::Employee(e) => e.full_name(),
            Interviewer::Named(name) => name.clone(),
        }
    }
}

#[derive(FromRow)]
struct InterviewSlotRow {
    id: u64,
    candidate_id: u64,
    scheduled_at: DateTime<Utc>,
    duration_minutes: u32,
    status: String,
}

#[derive(FromRow)]
struct PtoRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    pto_type: String,
    status: String,
    half_day: bool,
}

impl InterviewSlotRow {
    fn into_booking(self) -> Option<BookedInterview> {
        Some(BookedInterview {
            id: self.id,
            candidate_id: self.candidate_id,
            start: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            status: self.status.parse().ok()?,
        })
    }
}

impl PtoRow {
    fn into_booking(self) -> Option<PtoBooking> {
        Some(PtoBooking {
            id: self.id,
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            pto_type: self.pto_type.parse().ok()?,
            status: self.status.parse().ok()?,
            half_day: self.half_day,
        })
    }
}

/// Range wide enough for the proposal and every suggestion after it.
pub fn search_range(proposed: &Interval, policy: &ConflictPolicy) -> Interval {
    Interval::new(
        proposed.start - Duration::days(1),
        proposed.end + Duration::days(policy.suggestion_horizon_days + 1),
    )
}

/// Loads the interviewer's commitments around `proposed`.
///
/// Availability comes from the cache; a failed lookup is logged and
/// reported as [`Availability::LookupFailed`] instead of failing the call.
pub async fn load_context(
    pool: &MySqlPool,
    interviewer: &Interviewer,
    proposed: &Interval,
    policy: &ConflictPolicy,
    exclude_interview_id: Option<u64>,
) -> Result<ScheduleContext, sqlx::Error> {
    let range = search_range(proposed, policy);
    let mut ctx = ScheduleContext::empty(interviewer.label());

    let rows = match interviewer {
        Interviewer::Employee(employee) => {
            sqlx::query_as::<_, InterviewSlotRow>(
                r#"
                SELECT id, candidate_id, scheduled_at, duration_minutes, status
                FROM interviews
                WHERE interviewer_id = ?
                AND status = 'scheduled'
                AND scheduled_at >= ? AND scheduled_at < ?
                AND id <> ?
                "#,
            )
            .bind(employee.id)
            .bind(range.start)
            .bind(range.end)
            .bind(exclude_interview_id.unwrap_or(0))
            .fetch_all(pool)
            .await?
        }
        Interviewer::Named(name) => {
            sqlx::query_as::<_, InterviewSlotRow>(
                r#"
                SELECT id, candidate_id, scheduled_at, duration_minutes, status
                FROM interviews
                WHERE interviewer_id IS NULL
                AND LOWER(interviewer_name) = LOWER(?)
                AND status = 'scheduled'
                AND scheduled_at >= ? AND scheduled_at < ?
                AND id <> ?
                "#,
            )
            .bind(name.trim())
            .bind(range.start)
            .bind(range.end)
            .bind(exclude_interview_id.unwrap_or(0))
            .fetch_all(pool)
            .await?
        }
    };
    ctx.interviews = rows.into_iter().filter_map(InterviewSlotRow::into_booking).collect();

    let Interviewer::Employee(employee) = interviewer else {
        debug!(interviews = ctx.interviews.len(), "Loaded free-text interviewer context");
        return Ok(ctx);
    };

    let first_day = range.start.date_naive();
    let last_day = range.end.date_naive();

    ctx.own_pto = sqlx::query_as::<_, PtoRow>(
        r#"
        SELECT id, employee_id, start_date, end_date, pto_type, status, half_day
        FROM pto_requests
        WHERE employee_id = ?
        AND status IN ('approved', 'pending')
        AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(employee.id)
    .bind(last_day)
    .bind(first_day)
    .fetch_all(pool)
    .await?
    .into_iter()
    .filter_map(PtoRow::into_booking)
    .collect();

    if let Some(department_id) = employee.department_id {
        ctx.department_pto = sqlx::query_as::<_, PtoRow>(
            r#"
            SELECT p.id, p.employee_id, p.start_date, p.end_date, p.pto_type, p.status, p.half_day
            FROM pto_requests p
            JOIN employees e ON e.id = p.employee_id
            WHERE e.department_id = ?
            AND p.employee_id <> ?
            AND p.status = 'approved'
            AND p.start_date <= ? AND p.end_date >= ?
            "#,
        )
        .bind(department_id)
        .bind(employee.id)
        .bind(last_day)
        .bind(first_day)
        .fetch_all(pool)
        .await?
        .into_iter()
        .filter_map(PtoRow::into_booking)
        .collect();
    }

    ctx.availability = match availability_cache::windows_for(pool, employee.id).await {
        Ok(windows) => Availability::Windows(windows.as_ref().clone()),
        Err(e) => {
            warn!(error = %e, interviewer_id = employee.id, "Availability lookup failed, scheduling unverified");
            Availability::LookupFailed
        }
    };

    debug!(
        interviewer_id = employee.id,
        interviews = ctx.interviews.len(),
        own_pto = ctx.own_pto.len(),
        department_pto = ctx.department_pto.len(),
        "Loaded schedule context"
    );

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pto::PtoStatus;
    use chrono::TimeZone;

    #[test]
    fn search_range_covers_the_suggestion_horizon() {
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap();
        let proposed = Interval::from_minutes(start, 30);
        let range = search_range(&proposed, &ConflictPolicy::default());
        assert!(range.start <= start - Duration::hours(23));
        assert!(range.end >= start + Duration::days(14) + Duration::minutes(30));
    }

    #[test]
    fn unknown_stored_values_are_dropped() {
        let row = PtoRow {
            id: 1,
            employee_id: 2,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            pto_type: "sabbatical".into(),
            status: "approved".into(),
            half_day: false,
        };
        assert!(row.into_booking().is_none());
    }

    #[test]
    fn half_day_flag_reaches_the_booking() {
        let row = PtoRow {
            id: 1,
            employee_id: 2,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            pto_type: "personal".into(),
            status: "approved".into(),
            half_day: true,
        };
        let booking = row.into_booking().unwrap();
        assert!(booking.half_day);
        assert_eq!(booking.status, PtoStatus::Approved);
    }
}
