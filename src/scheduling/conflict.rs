use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::availability::AvailabilityWindow;
use crate::model::interview::InterviewStatus;
use crate::model::pto::{PtoStatus, PtoType};
use crate::scheduling::Interval;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Soft,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    InterviewOverlap,
    InterviewProximity,
    ApprovedPto,
    PendingPto,
    DepartmentPto,
    OutsideAvailability,
    AvailabilityUnverified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub severity: Severity,
    pub kind: ConflictKind,
    #[schema(example = "Interviewer already has an interview from 09:00 to 09:30 UTC on 2025-10-01")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pto_request_id: Option<u64>,
}

impl Conflict {
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// Tunables for conflict classification and slot suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictPolicy {
    /// Non-overlapping interviews closer than this raise a soft conflict. 0 disables.
    pub proximity_buffer_minutes: i64,
    /// Other employees of the same department on approved PTO needed for a warning.
    pub department_pto_threshold: usize,
    pub suggestion_step_minutes: i64,
    pub suggestion_horizon_days: i64,
    pub max_suggestions: usize,
    /// Used for suggestions when the interviewer has no availability windows.
    pub business_hours_start: NaiveTime,
    pub business_hours_end: NaiveTime,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            proximity_buffer_minutes: 0,
            department_pto_threshold: 2,
            suggestion_step_minutes: 30,
            suggestion_horizon_days: 14,
            max_suggestions: 3,
            business_hours_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            business_hours_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookedInterview {
    pub id: u64,
    pub candidate_id: u64,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: InterviewStatus,
}

impl BookedInterview {
    pub fn interval(&self) -> Interval {
        Interval::from_minutes(self.start, i64::from(self.duration_minutes))
    }
}

#[derive(Debug, Clone)]
pub struct PtoBooking {
    pub id: u64,
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pto_type: PtoType,
    pub status: PtoStatus,
    /// Which half of the day is off is not recorded.
    pub half_day: bool,
}

impl PtoBooking {
    pub fn interval(&self) -> Interval {
        Interval::from_dates(self.start_date, self.end_date)
    }
}

/// Result of looking up an interviewer's weekly windows.
#[derive(Debug, Clone)]
pub enum Availability {
    /// Free-text interviewer, nothing to look up.
    Unknown,
    /// Active windows; empty when the interviewer never set any.
    Windows(Vec<AvailabilityWindow>),
    /// Lookup failed; scheduling proceeds with a warning.
    LookupFailed,
}

impl Availability {
    pub fn windows(&self) -> Option<&[AvailabilityWindow]> {
        match self {
            Availability::Windows(w) if !w.is_empty() => Some(w),
            _ => None,
        }
    }
}

/// Everything already on the interviewer's plate around the proposal.
#[derive(Debug, Clone)]
pub struct ScheduleContext {
    pub interviewer_label: String,
    pub interviews: Vec<BookedInterview>,
    pub own_pto: Vec<PtoBooking>,
    pub department_pto: Vec<PtoBooking>,
    pub availability: Availability,
}

impl ScheduleContext {
    pub fn empty(interviewer_label: impl Into<String>) -> Self {
        Self {
            interviewer_label: interviewer_label.into(),
            interviews: Vec::new(),
            own_pto: Vec::new(),
            department_pto: Vec::new(),
            availability: Availability::Unknown,
        }
    }
}

fn describe_slot(interval: &Interval) -> String {
    format!(
        "from {} to {} UTC on {}",
        interval.start.format("%H:%M"),
        interval.end.format("%H:%M"),
        interval.start.format("%Y-%m-%d")
    )
}

/// Conflicts against the interviewer's calendar, hard ones first.
pub fn check_conflicts(
    proposed: &Interval,
    ctx: &ScheduleContext,
    policy: &ConflictPolicy,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for booked in ctx.interviews.iter().filter(|i| i.status.is_active()) {
        let existing = booked.interval();
        if proposed.overlaps(&existing) {
            conflicts.push(Conflict {
                severity: Severity::Hard,
                kind: ConflictKind::InterviewOverlap,
                message: format!(
                    "{} already has an interview {} (candidate #{})",
                    ctx.interviewer_label,
                    describe_slot(&existing),
                    booked.candidate_id
                ),
                interview_id: Some(booked.id),
                pto_request_id: None,
            });
        } else if policy.proximity_buffer_minutes > 0
            && proposed.gap(&existing).num_minutes() < policy.proximity_buffer_minutes
        {
            conflicts.push(Conflict {
                severity: Severity::Soft,
                kind: ConflictKind::InterviewProximity,
                message: format!(
                    "{} has another interview {}, less than {} minutes apart",
                    ctx.interviewer_label,
                    describe_slot(&existing),
                    policy.proximity_buffer_minutes
                ),
                interview_id: Some(booked.id),
                pto_request_id: None,
            });
        }
    }

    for pto in ctx.own_pto.iter().filter(|p| proposed.overlaps(&p.interval())) {
        // a half day still blocks the whole date
        let (severity, kind, label) = match (pto.status, pto.half_day) {
            (PtoStatus::Approved, false) => (Severity::Hard, ConflictKind::ApprovedPto, "approved"),
            (PtoStatus::Approved, true) => (Severity::Hard, ConflictKind::ApprovedPto, "approved half-day"),
            (PtoStatus::Pending, false) => (Severity::Soft, ConflictKind::PendingPto, "pending"),
            (PtoStatus::Pending, true) => (Severity::Soft, ConflictKind::PendingPto, "pending half-day"),
            (PtoStatus::Denied, _) => continue,
        };
        conflicts.push(Conflict {
            severity,
            kind,
            message: format!(
                "{} has {} {} PTO from {} to {}",
                ctx.interviewer_label, label, pto.pto_type, pto.start_date, pto.end_date
            ),
            interview_id: None,
            pto_request_id: Some(pto.id),
        });
    }

    let colleagues_away: BTreeSet<u64> = ctx
        .department_pto
        .iter()
        .filter(|p| p.status == PtoStatus::Approved && proposed.overlaps(&p.interval()))
        .map(|p| p.employee_id)
        .collect();
    if policy.department_pto_threshold > 0 && colleagues_away.len() >= policy.department_pto_threshold {
        conflicts.push(Conflict {
            severity: Severity::Soft,
            kind: ConflictKind::DepartmentPto,
            message: format!(
                "{} other employees in the interviewer's department are on approved PTO at this time",
                colleagues_away.len()
            ),
            interview_id: None,
            pto_request_id: None,
        });
    }

    match &ctx.availability {
        Availability::LookupFailed => conflicts.push(Conflict {
            severity: Severity::Soft,
            kind: ConflictKind::AvailabilityUnverified,
            message: "Unable to verify interviewer availability, check manually".to_string(),
            interview_id: None,
            pto_request_id: None,
        }),
        availability => {
            if let Some(windows) = availability.windows() {
                if !windows.iter().any(|w| w.fits(proposed)) {
                    conflicts.push(Conflict {
                        severity: Severity::Soft,
                        kind: ConflictKind::OutsideAvailability,
                        message: format!(
                            "The slot {} is outside {}'s availability windows",
                            describe_slot(proposed),
                            ctx.interviewer_label
                        ),
                        interview_id: None,
                        pto_request_id: None,
                    });
                }
            }
        }
    }

    conflicts.sort_by_key(|c| c.severity != Severity::Hard);
    conflicts
}

pub fn has_hard_conflict(conflicts: &[Conflict]) -> bool {
    conflicts.iter().any(Conflict::is_hard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, day, h, m, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    fn interview(id: u64, start: DateTime<Utc>, minutes: u32, status: InterviewStatus) -> BookedInterview {
        BookedInterview {
            id,
            candidate_id: 100 + id,
            start,
            duration_minutes: minutes,
            status,
        }
    }

    fn pto(id: u64, employee_id: u64, from: u32, to: u32, status: PtoStatus) -> PtoBooking {
        PtoBooking {
            id,
            employee_id,
            start_date: date(from),
            end_date: date(to),
            pto_type: PtoType::Vacation,
            status,
            half_day: false,
        }
    }

    fn ctx_with_interview() -> ScheduleContext {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.interviews
            .push(interview(1, at(1, 9, 0), 30, InterviewStatus::Scheduled));
        ctx
    }

    #[test]
    fn overlapping_start_is_one_hard_conflict() {
        let ctx = ctx_with_interview();
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 9, 15), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::Hard);
        assert_eq!(conflicts[0].interview_id, Some(1));
    }

    #[test]
    fn back_to_back_is_clear_under_default_policy() {
        let ctx = ctx_with_interview();
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 9, 30), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert!(conflicts.is_empty(), "{:?}", conflicts);
    }

    #[test]
    fn containing_interview_is_referenced_exactly_once() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.interviews
            .push(interview(9, at(1, 13, 0), 120, InterviewStatus::Scheduled));
        ctx.interviews
            .push(interview(10, at(1, 16, 0), 60, InterviewStatus::Scheduled));
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 14, 0), 15),
            &ctx,
            &ConflictPolicy::default(),
        );
        let hard: Vec<_> = conflicts.iter().filter(|c| c.is_hard()).collect();
        assert_eq!(hard.len(), 1);
        assert_eq!(hard[0].interview_id, Some(9));
    }

    #[test]
    fn inactive_interviews_are_ignored() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        for (id, status) in [
            (1, InterviewStatus::Cancelled),
            (2, InterviewStatus::Completed),
            (3, InterviewStatus::NoShow),
            (4, InterviewStatus::Rescheduled),
        ] {
            ctx.interviews.push(interview(id, at(1, 9, 0), 60, status));
        }
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 9, 0), 60),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn proximity_buffer_raises_soft_conflict() {
        let ctx = ctx_with_interview();
        let policy = ConflictPolicy {
            proximity_buffer_minutes: 15,
            ..ConflictPolicy::default()
        };
        let close = check_conflicts(&Interval::from_minutes(at(1, 9, 40), 30), &ctx, &policy);
        assert_eq!(close.len(), 1);
        assert_eq!(close[0].kind, ConflictKind::InterviewProximity);
        assert!(!has_hard_conflict(&close));

        let far = check_conflicts(&Interval::from_minutes(at(1, 9, 45), 30), &ctx, &policy);
        assert!(far.is_empty());
    }

    #[test]
    fn approved_pto_is_hard_and_names_the_dates() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.own_pto.push(pto(55, 7, 1, 3, PtoStatus::Approved));
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(2, 10, 0), 45),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].is_hard());
        assert_eq!(conflicts[0].pto_request_id, Some(55));
        assert!(conflicts[0].message.contains("2025-10-01"));
        assert!(conflicts[0].message.contains("2025-10-03"));
    }

    #[test]
    fn approved_half_day_pto_blocks_the_whole_date() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.own_pto.push(PtoBooking {
            half_day: true,
            ..pto(56, 7, 2, 2, PtoStatus::Approved)
        });
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(2, 10, 0), 45),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ApprovedPto);
        assert_eq!(conflicts[0].severity, Severity::Hard);
        assert!(conflicts[0].message.contains("approved half-day"));

        let late = check_conflicts(
            &Interval::from_minutes(at(2, 16, 0), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert!(has_hard_conflict(&late));
    }

    #[test]
    fn pending_pto_warns_and_denied_pto_is_ignored() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.own_pto.push(pto(1, 7, 2, 2, PtoStatus::Pending));
        ctx.own_pto.push(pto(2, 7, 2, 2, PtoStatus::Denied));
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(2, 10, 0), 45),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::PendingPto);
        assert_eq!(conflicts[0].severity, Severity::Soft);
    }

    #[test]
    fn department_warning_starts_at_threshold() {
        let slot = Interval::from_minutes(at(2, 10, 0), 45);
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.department_pto.push(pto(1, 20, 1, 2, PtoStatus::Approved));
        // same colleague twice still counts once
        ctx.department_pto.push(pto(2, 20, 2, 4, PtoStatus::Approved));
        ctx.department_pto.push(pto(3, 21, 2, 2, PtoStatus::Pending));
        assert!(check_conflicts(&slot, &ctx, &ConflictPolicy::default()).is_empty());

        ctx.department_pto.push(pto(4, 22, 2, 2, PtoStatus::Approved));
        let conflicts = check_conflicts(&slot, &ctx, &ConflictPolicy::default());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::DepartmentPto);
        assert_eq!(conflicts[0].severity, Severity::Soft);

        let strict = ConflictPolicy {
            department_pto_threshold: 3,
            ..ConflictPolicy::default()
        };
        assert!(check_conflicts(&slot, &ctx, &strict).is_empty());
    }

    #[test]
    fn failed_availability_lookup_only_warns() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.availability = Availability::LookupFailed;
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 10, 0), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::AvailabilityUnverified);
        assert!(!has_hard_conflict(&conflicts));
    }

    #[test]
    fn slot_outside_windows_is_soft() {
        let mut ctx = ScheduleContext::empty("Dana Reyes");
        ctx.availability = Availability::Windows(vec![AvailabilityWindow {
            id: 1,
            interviewer_id: 7,
            day_of_week: 3,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            is_active: true,
        }]);
        let policy = ConflictPolicy::default();
        assert!(check_conflicts(&Interval::from_minutes(at(1, 10, 0), 30), &ctx, &policy).is_empty());
        let outside = check_conflicts(&Interval::from_minutes(at(1, 14, 0), 30), &ctx, &policy);
        assert_eq!(outside.len(), 1);
        assert_eq!(outside[0].kind, ConflictKind::OutsideAvailability);
    }

    #[test]
    fn hard_conflicts_sort_first() {
        let mut ctx = ctx_with_interview();
        ctx.availability = Availability::LookupFailed;
        ctx.own_pto.push(pto(5, 7, 1, 1, PtoStatus::Approved));
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 9, 0), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        assert_eq!(conflicts.len(), 3);
        assert!(conflicts[0].is_hard());
        assert!(conflicts[1].is_hard());
        assert!(!conflicts[2].is_hard());
    }

    #[test]
    fn conflict_serializes_with_contract_field_names() {
        let ctx = ctx_with_interview();
        let conflicts = check_conflicts(
            &Interval::from_minutes(at(1, 9, 15), 30),
            &ctx,
            &ConflictPolicy::default(),
        );
        let json = serde_json::to_value(&conflicts[0]).unwrap();
        assert_eq!(json["severity"], "hard");
        assert_eq!(json["kind"], "interview_overlap");
        assert_eq!(json["interviewId"], 1);
        assert!(json.get("ptoRequestId").is_none());
    }
}
