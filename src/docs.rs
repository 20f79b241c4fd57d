use crate::api::attendance::{CheckIn, IssueCode, IssuedCode};
use crate::api::availability::AddAvailability;
use crate::api::interview::{
    ConflictCheckRequest, InterviewListResponse, RescheduleInterview, ScheduleInterview,
    ScheduledInterview, UpdateInterviewStatus,
};
use crate::api::pto::{
    BalanceResponse, CreatePto, PtoCreated, PtoListResponse, UpdatePolicy,
};
use crate::model::availability::AvailabilityWindow;
use crate::model::interview::{Interview, InterviewStatus};
use crate::model::pto::{PtoBalance, PtoPolicy, PtoRequest, PtoStatus, PtoType};
use crate::models::{LoginReqDto, LoginResponse};
use crate::scheduling::{Conflict, ConflictKind, ConflictReport, Severity};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Portal API",
        version = "1.0.0",
        description = r#"
## HR Portal: interviews, PTO and attendance

### 🔹 Key Features
- **Interview Scheduling**
  - Check a proposed slot against the interviewer's interviews, PTO and availability
  - Hard conflicts block booking (HTTP 409) and come with suggested alternative times
  - Reschedule, complete, cancel or mark no-show
- **Interviewer Availability**
  - Weekly recurring windows per interviewer
- **PTO Management**
  - Request vacation, sick or personal days, approve/deny, view balances
- **Attendance**
  - QR-code based check-in and check-out

### 🔐 Security
All endpoints except login require a **JWT Bearer** access token.
Booking interviews and reviewing PTO is limited to **HR**, **Admin** and **Manager** roles.

### 📦 Response Format
- JSON-based RESTful responses, errors as `{"message": "..."}`
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::interview::check_conflicts,
        crate::api::interview::schedule_interview,
        crate::api::interview::list_interviews,
        crate::api::interview::get_interview,
        crate::api::interview::update_status,
        crate::api::interview::reschedule_interview,

        crate::api::availability::list_availability,
        crate::api::availability::add_availability,
        crate::api::availability::remove_availability,

        crate::api::pto::create_pto,
        crate::api::pto::list_pto,
        crate::api::pto::get_pto,
        crate::api::pto::approve_pto,
        crate::api::pto::deny_pto,
        crate::api::pto::pto_balance,
        crate::api::pto::list_policies,
        crate::api::pto::update_policy,

        crate::api::attendance::issue_code,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            ConflictCheckRequest,
            ConflictReport,
            Conflict,
            ConflictKind,
            Severity,
            ScheduleInterview,
            ScheduledInterview,
            RescheduleInterview,
            UpdateInterviewStatus,
            InterviewListResponse,
            Interview,
            InterviewStatus,
            AddAvailability,
            AvailabilityWindow,
            CreatePto,
            PtoCreated,
            PtoListResponse,
            PtoRequest,
            PtoType,
            PtoStatus,
            PtoPolicy,
            PtoBalance,
            BalanceResponse,
            UpdatePolicy,
            IssueCode,
            IssuedCode,
            CheckIn
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication APIs"),
        (name = "Interview", description = "Interview scheduling and conflict detection APIs"),
        (name = "Availability", description = "Interviewer availability APIs"),
        (name = "PTO", description = "Paid time off APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/login"));
        assert!(paths.contains_key("/api/v1/interviews/conflicts"));
        assert!(paths.contains_key("/api/v1/pto/{pto_id}/approve"));
        assert!(paths.contains_key("/api/v1/attendance/check-in"));
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
