use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult, db_error},
    model::{
        employee::EmployeeRef,
        interview::{Interview, InterviewStatus},
    },
    scheduling::{self, Conflict, ConflictPolicy, ConflictReport, Interval, Interviewer, load_context},
    utils::query_filter::{Page, WhereClause},
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

const MAX_DURATION_MINUTES: u32 = 8 * 60;
const MAX_INTERVIEW_TYPE_LEN: usize = 32;

const INTERVIEW_COLUMNS: &str = r#"
    id, candidate_id, interviewer_id, interviewer_name, scheduled_at, duration_minutes,
    interview_type, location, notes, status, rescheduled_from
"#;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckRequest {
    /// Interviewer employee id
    #[schema(example = 7)]
    pub actor_id: Option<u64>,
    /// Free-text interviewer, used when there is no employee record
    #[schema(example = "External panel: J. Ortiz")]
    pub interviewer_name: Option<String>,
    #[schema(example = "2025-10-01T09:15:00Z", value_type = String, format = "date-time")]
    pub proposed_start: DateTime<Utc>,
    #[schema(example = 30)]
    pub duration_minutes: u32,
    /// Interview being moved, ignored when checking
    pub exclude_interview_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterview {
    #[schema(example = 40)]
    pub candidate_id: u64,
    #[schema(example = 7)]
    pub interviewer_id: Option<u64>,
    pub interviewer_name: Option<String>,
    #[schema(example = "2025-10-01T09:30:00Z", value_type = String, format = "date-time")]
    pub scheduled_at: DateTime<Utc>,
    #[schema(example = 30)]
    pub duration_minutes: u32,
    #[schema(example = "onsite")]
    pub interview_type: Option<String>,
    #[schema(example = "Room 4B")]
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Book despite hard conflicts
    #[serde(default)]
    pub force_schedule: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleInterview {
    #[schema(example = "2025-10-02T14:00:00Z", value_type = String, format = "date-time")]
    pub scheduled_at: DateTime<Utc>,
    /// Defaults to the current duration
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub force_schedule: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateInterviewStatus {
    pub status: InterviewStatus,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInterview {
    pub interview: Interview,
    /// Soft conflicts, plus hard ones when the booking was forced
    pub conflicts: Vec<Conflict>,
    pub forced: bool,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InterviewFilter {
    pub interviewer_id: Option<u64>,
    pub candidate_id: Option<u64>,
    #[param(example = "scheduled")]
    pub status: Option<String>,
    /// Only interviews starting at or after this instant
    #[param(value_type = Option<String>, format = DateTime)]
    pub from: Option<DateTime<Utc>>,
    /// Only interviews starting before this instant
    #[param(value_type = Option<String>, format = DateTime)]
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterviewListResponse {
    pub data: Vec<Interview>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

fn validate_duration(minutes: u32) -> AppResult<()> {
    if minutes == 0 || minutes > MAX_DURATION_MINUTES {
        return Err(AppError::bad_request(format!(
            "durationMinutes must be between 1 and {}",
            MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}

fn normalized_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

fn require_interviewer(id: Option<u64>, name: Option<&str>) -> AppResult<()> {
    if id.is_none() && normalized_name(name).is_none() {
        return Err(AppError::bad_request(
            "An interviewer id or interviewer name is required",
        ));
    }
    Ok(())
}

fn usable_interviewer(employee: EmployeeRef) -> AppResult<Interviewer> {
    if !employee.is_active() {
        return Err(AppError::bad_request(format!(
            "Interviewer {} is not an active employee",
            employee.id
        )));
    }
    Ok(Interviewer::Employee(employee))
}

/// Hard conflicts block the booking unless it is forced.
fn gate(report: ConflictReport, force: bool) -> AppResult<ConflictReport> {
    if report.has_hard() && !force {
        info!(conflicts = report.conflicts.len(), "Scheduling blocked by hard conflict");
        return Err(AppError::Scheduling(report));
    }
    Ok(report)
}

async fn resolve_interviewer(
    pool: &MySqlPool,
    id: Option<u64>,
    name: Option<&str>,
) -> AppResult<Interviewer> {
    if let Some(id) = id {
        let employee = sqlx::query_as::<_, EmployeeRef>(
            "SELECT id, first_name, last_name, department_id, status FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, interviewer_id = id, "Failed to fetch interviewer");
            AppError::Internal
        })?
        .ok_or_else(|| AppError::not_found("Interviewer not found"))?;
        return usable_interviewer(employee);
    }

    normalized_name(name)
        .map(|n| Interviewer::Named(n.to_string()))
        .ok_or_else(|| AppError::bad_request("An interviewer id or interviewer name is required"))
}

async fn conflict_report(
    pool: &MySqlPool,
    policy: &ConflictPolicy,
    interviewer: &Interviewer,
    proposed: &Interval,
    exclude_interview_id: Option<u64>,
) -> AppResult<ConflictReport> {
    let ctx = load_context(pool, interviewer, proposed, policy, exclude_interview_id)
        .await
        .map_err(db_error("Failed to load schedule context"))?;
    Ok(scheduling::evaluate(proposed, &ctx, policy, Utc::now()))
}

async fn fetch_interview(pool: &MySqlPool, interview_id: u64) -> AppResult<Interview> {
    let sql = format!("SELECT {} FROM interviews WHERE id = ?", INTERVIEW_COLUMNS);
    sqlx::query_as::<_, Interview>(&sql)
        .bind(interview_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, interview_id, "Failed to fetch interview");
            AppError::Internal
        })?
        .ok_or_else(|| AppError::not_found("Interview not found"))
}

/// Check a proposed slot without booking it
#[utoipa::path(
    post,
    path = "/api/v1/interviews/conflicts",
    request_body = ConflictCheckRequest,
    responses(
        (status = 200, description = "Conflicts for the proposed slot", body = ConflictReport),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Interviewer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
#[instrument(skip(auth, pool, policy, payload), fields(actor_id = ?payload.actor_id))]
pub async fn check_conflicts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<ConflictPolicy>,
    payload: web::Json<ConflictCheckRequest>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;
    validate_duration(payload.duration_minutes)?;
    require_interviewer(payload.actor_id, payload.interviewer_name.as_deref())?;

    let interviewer = resolve_interviewer(
        pool.get_ref(),
        payload.actor_id,
        payload.interviewer_name.as_deref(),
    )
    .await?;
    let proposed = Interval::from_minutes(payload.proposed_start, i64::from(payload.duration_minutes));

    let report = conflict_report(
        pool.get_ref(),
        policy.get_ref(),
        &interviewer,
        &proposed,
        payload.exclude_interview_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Book an interview, re-validating conflicts server-side
#[utoipa::path(
    post,
    path = "/api/v1/interviews",
    request_body = ScheduleInterview,
    responses(
        (status = 201, description = "Interview scheduled", body = ScheduledInterview),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Candidate or interviewer not found"),
        (status = 409, description = "Hard conflict; body carries conflicts and suggestedTimes", body = ConflictReport)
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
#[instrument(
    skip(auth, pool, policy, payload),
    fields(candidate_id = payload.candidate_id, interviewer_id = ?payload.interviewer_id)
)]
pub async fn schedule_interview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<ConflictPolicy>,
    payload: web::Json<ScheduleInterview>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;
    validate_duration(payload.duration_minutes)?;
    require_interviewer(payload.interviewer_id, payload.interviewer_name.as_deref())?;

    let interview_type = payload
        .interview_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("onsite");
    if interview_type.len() > MAX_INTERVIEW_TYPE_LEN {
        return Err(AppError::bad_request("interviewType is too long"));
    }

    let candidate_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM candidates WHERE id = ?)")
            .bind(payload.candidate_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(db_error("Failed to look up candidate"))?;
    if !candidate_exists {
        return Err(AppError::not_found("Candidate not found"));
    }

    let interviewer = resolve_interviewer(
        pool.get_ref(),
        payload.interviewer_id,
        payload.interviewer_name.as_deref(),
    )
    .await?;
    let proposed = Interval::from_minutes(payload.scheduled_at, i64::from(payload.duration_minutes));

    let report = conflict_report(pool.get_ref(), policy.get_ref(), &interviewer, &proposed, None).await?;
    let report = gate(report, payload.force_schedule)?;
    if report.has_hard() {
        warn!(user_id = auth.user_id, "Interview force-scheduled over hard conflicts");
    }

    let (interviewer_id, interviewer_name) = match &interviewer {
        Interviewer::Employee(e) => (Some(e.id), None),
        Interviewer::Named(name) => (None, Some(name.clone())),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO interviews
            (candidate_id, interviewer_id, interviewer_name, scheduled_at, duration_minutes,
             interview_type, location, notes, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.candidate_id)
    .bind(interviewer_id)
    .bind(interviewer_name)
    .bind(payload.scheduled_at)
    .bind(payload.duration_minutes)
    .bind(interview_type)
    .bind(payload.location.as_deref())
    .bind(payload.notes.as_deref())
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to insert interview"))?;

    let interview = fetch_interview(pool.get_ref(), result.last_insert_id()).await?;
    info!(interview_id = interview.id, "Interview scheduled");

    Ok(HttpResponse::Created().json(ScheduledInterview {
        interview,
        forced: report.has_hard(),
        conflicts: report.conflicts,
    }))
}

/// List interviews
#[utoipa::path(
    get,
    path = "/api/v1/interviews",
    params(InterviewFilter),
    responses(
        (status = 200, description = "Paginated interview list", body = InterviewListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
pub async fn list_interviews(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<InterviewFilter>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<InterviewStatus>()
                .map_err(|_| AppError::bad_request(format!("Unknown interview status: {}", raw)))?,
        ),
        None => None,
    };

    let page = Page::new(query.page, query.per_page);

    let mut filter = WhereClause::new();
    filter
        .and_opt("interviewer_id = ?", query.interviewer_id)
        .and_opt("candidate_id = ?", query.candidate_id)
        .and_opt("status = ?", status.map(|s| s.as_ref().to_string()))
        .and_opt("scheduled_at >= ?", query.from)
        .and_opt("scheduled_at < ?", query.to);
    let where_sql = filter.sql();

    let count_sql = format!("SELECT COUNT(*) FROM interviews{}", where_sql);
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(db_error("Failed to count interviews"))?;

    let data_sql = format!(
        "SELECT {} FROM interviews{} ORDER BY scheduled_at DESC LIMIT ? OFFSET ?",
        INTERVIEW_COLUMNS, where_sql
    );
    let interviews = filter
        .bind_as(sqlx::query_as::<_, Interview>(&data_sql))
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch interview list"))?;

    Ok(HttpResponse::Ok().json(InterviewListResponse {
        data: interviews,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

/// Get one interview
#[utoipa::path(
    get,
    path = "/api/v1/interviews/{interview_id}",
    params(("interview_id" = u64, Path, description = "Interview id")),
    responses(
        (status = 200, description = "Interview found", body = Interview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Interview not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
pub async fn get_interview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;
    let interview = fetch_interview(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(interview))
}

/// Move an interview to completed, cancelled or no_show
#[utoipa::path(
    put,
    path = "/api/v1/interviews/{interview_id}/status",
    params(("interview_id" = u64, Path, description = "Interview id")),
    request_body = UpdateInterviewStatus,
    responses(
        (status = 200, description = "Status updated", body = Interview),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Interview not found"),
        (status = 409, description = "Interview changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
pub async fn update_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateInterviewStatus>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;

    let next = payload.status;
    if next == InterviewStatus::Rescheduled {
        return Err(AppError::bad_request(
            "Use the reschedule endpoint to move an interview",
        ));
    }

    let interview_id = path.into_inner();
    let current = fetch_interview(pool.get_ref(), interview_id).await?;
    let allowed = current
        .parsed_status()
        .is_some_and(|status| status.can_transition_to(next));
    if !allowed {
        return Err(AppError::bad_request(format!(
            "Cannot change interview status from {} to {}",
            current.status, next
        )));
    }

    let result = sqlx::query("UPDATE interviews SET status = ? WHERE id = ? AND status = ?")
        .bind(next.as_ref())
        .bind(interview_id)
        .bind(&current.status)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, interview_id, "Interview status update failed");
            AppError::Internal
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::conflict("Interview was modified by another request"));
    }

    info!(interview_id, status = %next, "Interview status updated");
    let interview = fetch_interview(pool.get_ref(), interview_id).await?;
    Ok(HttpResponse::Ok().json(interview))
}

/// Move a scheduled interview to a new slot
#[utoipa::path(
    put,
    path = "/api/v1/interviews/{interview_id}/reschedule",
    params(("interview_id" = u64, Path, description = "Interview id")),
    request_body = RescheduleInterview,
    responses(
        (status = 201, description = "Replacement interview scheduled", body = ScheduledInterview),
        (status = 400, description = "Interview is not scheduled or input is invalid"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Interview not found"),
        (status = 409, description = "Hard conflict at the new slot", body = ConflictReport)
    ),
    security(("bearer_auth" = [])),
    tag = "Interview"
)]
#[instrument(skip(auth, pool, policy, payload))]
pub async fn reschedule_interview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<ConflictPolicy>,
    path: web::Path<u64>,
    payload: web::Json<RescheduleInterview>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;
    if let Some(minutes) = payload.duration_minutes {
        validate_duration(minutes)?;
    }

    let interview_id = path.into_inner();
    let current = fetch_interview(pool.get_ref(), interview_id).await?;
    if current.parsed_status() != Some(InterviewStatus::Scheduled) {
        return Err(AppError::bad_request(format!(
            "Only scheduled interviews can be rescheduled (current status: {})",
            current.status
        )));
    }

    let duration_minutes = payload.duration_minutes.unwrap_or(current.duration_minutes);
    let interviewer = resolve_interviewer(
        pool.get_ref(),
        current.interviewer_id,
        current.interviewer_name.as_deref(),
    )
    .await?;
    let proposed = Interval::from_minutes(payload.scheduled_at, i64::from(duration_minutes));

    let report = conflict_report(
        pool.get_ref(),
        policy.get_ref(),
        &interviewer,
        &proposed,
        Some(interview_id),
    )
    .await?;
    let report = gate(report, payload.force_schedule)?;
    if report.has_hard() {
        warn!(interview_id, user_id = auth.user_id, "Interview force-rescheduled over hard conflicts");
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(db_error("Failed to open reschedule transaction"))?;

    let retired = sqlx::query(
        "UPDATE interviews SET status = 'rescheduled' WHERE id = ? AND status = 'scheduled'",
    )
    .bind(interview_id)
    .execute(&mut *tx)
    .await
    .map_err(db_error("Failed to retire rescheduled interview"))?;
    if retired.rows_affected() == 0 {
        return Err(AppError::conflict("Interview was modified by another request"));
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO interviews
            (candidate_id, interviewer_id, interviewer_name, scheduled_at, duration_minutes,
             interview_type, location, notes, rescheduled_from, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(current.candidate_id)
    .bind(current.interviewer_id)
    .bind(current.interviewer_name.as_deref())
    .bind(payload.scheduled_at)
    .bind(duration_minutes)
    .bind(&current.interview_type)
    .bind(current.location.as_deref())
    .bind(current.notes.as_deref())
    .bind(interview_id)
    .bind(auth.user_id)
    .execute(&mut *tx)
    .await
    .map_err(db_error("Failed to insert replacement interview"))?;

    tx.commit()
        .await
        .map_err(db_error("Failed to commit reschedule"))?;

    let interview = fetch_interview(pool.get_ref(), inserted.last_insert_id()).await?;
    info!(from = interview_id, to = interview.id, "Interview rescheduled");

    Ok(HttpResponse::Created().json(ScheduledInterview {
        interview,
        forced: report.has_hard(),
        conflicts: report.conflicts,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/interviews")
            // /interviews
            .service(
                web::resource("")
                    .route(web::get().to(list_interviews))
                    .route(web::post().to(schedule_interview)),
            )
            // /interviews/conflicts
            .service(web::resource("/conflicts").route(web::post().to(check_conflicts)))
            // /interviews/{id}
            .service(web::resource("/{id}").route(web::get().to(get_interview)))
            // /interviews/{id}/status
            .service(web::resource("/{id}/status").route(web::put().to(update_status)))
            // /interviews/{id}/reschedule
            .service(web::resource("/{id}/reschedule").route(web::put().to(reschedule_interview))),
    );
}
