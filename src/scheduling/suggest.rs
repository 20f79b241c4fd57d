use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::scheduling::{ConflictPolicy, Interval, ScheduleContext, check_conflicts, has_hard_conflict};

fn align_up(instant: DateTime<Utc>, step_minutes: i64) -> DateTime<Utc> {
    let step = step_minutes.max(1) * 60;
    let secs = instant.timestamp();
    let aligned = secs + (step - secs.rem_euclid(step)) % step;
    DateTime::from_timestamp(aligned, 0).unwrap_or(instant)
}

fn within_business_hours(slot: &Interval, policy: &ConflictPolicy) -> bool {
    if matches!(slot.start.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    slot.start.date_naive() == slot.end.date_naive()
        && policy.business_hours_start <= slot.start.time()
        && slot.end.time() <= policy.business_hours_end
}

/// First free slots of the same length after the proposal.
///
/// Candidates step forward on the `suggestion_step_minutes` grid, never
/// before `not_before`, and stop at the horizon. A candidate is kept when it
/// sits inside the interviewer's availability (business hours when there is
/// none) and re-checks with no hard conflict.
pub fn suggest_alternatives(
    proposed: &Interval,
    ctx: &ScheduleContext,
    policy: &ConflictPolicy,
    not_before: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let length = proposed.duration();
    if length <= Duration::zero() || policy.max_suggestions == 0 {
        return Vec::new();
    }

    let step = Duration::minutes(policy.suggestion_step_minutes.max(1));
    let horizon_end = proposed.start + Duration::days(policy.suggestion_horizon_days);

    let mut cursor = align_up(proposed.start.max(not_before), policy.suggestion_step_minutes);
    if cursor == proposed.start {
        cursor = cursor + step;
    }

    let mut suggestions = Vec::with_capacity(policy.max_suggestions);
    while cursor < horizon_end && suggestions.len() < policy.max_suggestions {
        let slot = Interval::new(cursor, cursor + length);

        let bookable = match ctx.availability.windows() {
            Some(windows) => windows.iter().any(|w| w.fits(&slot)),
            None => within_business_hours(&slot, policy),
        };

        if bookable && !has_hard_conflict(&check_conflicts(&slot, ctx, policy)) {
            suggestions.push(cursor);
        }
        cursor = cursor + step;
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::availability::AvailabilityWindow;
    use crate::model::interview::InterviewStatus;
    use crate::model::pto::{PtoStatus, PtoType};
    use crate::scheduling::{Availability, BookedInterview, PtoBooking};
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, day, h, m, 0).unwrap()
    }

    fn busy_morning() -> ScheduleContext {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.interviews.push(BookedInterview {
            id: 1,
            candidate_id: 40,
            start: at(1, 9, 0),
            duration_minutes: 90,
            status: InterviewStatus::Scheduled,
        });
        ctx
    }

    #[test]
    fn align_up_keeps_aligned_instants() {
        assert_eq!(align_up(at(1, 9, 0), 30), at(1, 9, 0));
        assert_eq!(align_up(at(1, 9, 1), 30), at(1, 9, 30));
        assert_eq!(align_up(at(1, 9, 45), 30), at(1, 10, 0));
    }

    #[test]
    fn suggests_first_free_slots_after_the_clash() {
        let ctx = busy_morning();
        let proposed = Interval::from_minutes(at(1, 9, 0), 30);
        let slots = suggest_alternatives(&proposed, &ctx, &ConflictPolicy::default(), at(1, 0, 0));
        assert_eq!(slots, vec![at(1, 10, 30), at(1, 11, 0), at(1, 11, 30)]);
    }

    #[test]
    fn every_suggestion_rechecks_clean() {
        let mut ctx = busy_morning();
        ctx.own_pto.push(PtoBooking {
            id: 3,
            employee_id: 7,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 3).unwrap(),
            pto_type: PtoType::Sick,
            status: PtoStatus::Approved,
            half_day: false,
        });
        let policy = ConflictPolicy {
            max_suggestions: 40,
            ..ConflictPolicy::default()
        };
        let proposed = Interval::from_minutes(at(1, 9, 0), 60);
        let slots = suggest_alternatives(&proposed, &ctx, &policy, at(1, 0, 0));
        assert_eq!(slots.len(), 40);
        for start in slots {
            let slot = Interval::from_minutes(start, 60);
            assert!(!has_hard_conflict(&check_conflicts(&slot, &ctx, &policy)), "{}", start);
            assert_ne!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 2).unwrap());
            assert_ne!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
        }
    }

    #[test]
    fn weekends_are_skipped_without_windows() {
        // Friday afternoon, last slot of the day taken
        let ctx = ScheduleContext::empty("Dana Reyes");
        let policy = ConflictPolicy {
            max_suggestions: 1,
            ..ConflictPolicy::default()
        };
        let proposed = Interval::from_minutes(at(3, 16, 30), 30);
        let slots = suggest_alternatives(&proposed, &ctx, &policy, at(1, 0, 0));
        assert_eq!(slots, vec![at(6, 9, 0)]);
    }

    #[test]
    fn availability_windows_drive_the_scan() {
        let mut ctx = busy_morning();
        ctx.availability = Availability::Windows(vec![AvailabilityWindow {
            id: 1,
            interviewer_id: 7,
            day_of_week: 4, // Thursday
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            is_active: true,
        }]);
        let proposed = Interval::from_minutes(at(1, 9, 0), 30);
        let slots = suggest_alternatives(&proposed, &ctx, &ConflictPolicy::default(), at(1, 0, 0));
        assert_eq!(slots, vec![at(2, 14, 0), at(2, 14, 30), at(9, 14, 0)]);
    }

    #[test]
    fn never_suggests_the_past() {
        let ctx = busy_morning();
        let proposed = Interval::from_minutes(at(1, 9, 0), 30);
        let now = at(1, 13, 10);
        let slots = suggest_alternatives(&proposed, &ctx, &ConflictPolicy::default(), now);
        assert_eq!(slots[0], at(1, 13, 30));
    }

    #[test]
    fn horizon_bounds_the_search() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.own_pto.push(PtoBooking {
            id: 3,
            employee_id: 7,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            pto_type: PtoType::Vacation,
            status: PtoStatus::Approved,
            half_day: false,
        });
        let proposed = Interval::from_minutes(at(1, 9, 0), 30);
        let slots = suggest_alternatives(&proposed, &ctx, &ConflictPolicy::default(), at(1, 0, 0));
        assert!(slots.is_empty());
    }
}
