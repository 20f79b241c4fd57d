use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl InterviewStatus {
    /// Only a scheduled interview occupies the interviewer's calendar.
    pub fn is_active(self) -> bool {
        self == InterviewStatus::Scheduled
    }

    pub fn can_transition_to(self, next: InterviewStatus) -> bool {
        matches!(
            (self, next),
            (
                InterviewStatus::Scheduled,
                InterviewStatus::Completed
                    | InterviewStatus::Cancelled
                    | InterviewStatus::NoShow
                    | InterviewStatus::Rescheduled
            )
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 12,
    "candidateId": 40,
    "interviewerId": 7,
    "interviewerName": null,
    "scheduledAt": "2025-10-01T09:00:00Z",
    "durationMinutes": 30,
    "interviewType": "onsite",
    "location": "Room 4B",
    "notes": null,
    "status": "scheduled",
    "rescheduledFrom": null
}))]
pub struct Interview {
    pub id: u64,
    pub candidate_id: u64,
    pub interviewer_id: Option<u64>,
    pub interviewer_name: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub interview_type: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = InterviewStatus)]
    pub status: String,
    pub rescheduled_from: Option<u64>,
}

impl Interview {
    /// Unknown values stored by hand count as terminal, never as scheduled.
    pub fn parsed_status(&self) -> Option<InterviewStatus> {
        self.status.parse().ok()
    }
}
