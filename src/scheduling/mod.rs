//! Interview conflict detection and slot suggestion.
//!
//! `interval`, `conflict` and `suggest` are pure; `context` is the only part
//! that touches the database.

pub mod conflict;
pub mod context;
pub mod interval;
pub mod suggest;

pub use conflict::{
    Availability, BookedInterview, Conflict, ConflictKind, ConflictPolicy, PtoBooking,
    ScheduleContext, Severity, check_conflicts, has_hard_conflict,
};
pub use context::{Interviewer, load_context};
pub use interval::Interval;
pub use suggest::suggest_alternatives;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Conflicts for one proposal plus alternatives when it is blocked.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    #[schema(value_type = Vec<String>, example = json!(["2025-10-01T10:30:00Z"]))]
    pub suggested_times: Vec<DateTime<Utc>>,
}

impl ConflictReport {
    pub fn has_hard(&self) -> bool {
        has_hard_conflict(&self.conflicts)
    }
}

/// Runs the checker and, on a hard conflict, the suggestion scan.
pub fn evaluate(
    proposed: &Interval,
    ctx: &ScheduleContext,
    policy: &ConflictPolicy,
    now: DateTime<Utc>,
) -> ConflictReport {
    let conflicts = check_conflicts(proposed, ctx, policy);
    let suggested_times = if has_hard_conflict(&conflicts) {
        suggest_alternatives(proposed, ctx, policy, now)
    } else {
        Vec::new()
    };
    ConflictReport {
        conflicts,
        suggested_times,
    }
}
