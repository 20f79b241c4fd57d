use std::collections::HashMap;

use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult, db_error},
    model::pto::{PtoBalance, PtoPolicy, PtoRequest, PtoStatus, PtoType, count_pto_days},
    utils::query_filter::{Page, WhereClause},
};
use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const PTO_COLUMNS: &str = r#"
    id, employee_id, start_date, end_date, days, half_day, pto_type, status,
    reason, reviewed_by, reviewed_at, created_at
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreatePto {
    /// Defaults to the caller; HR/Admin/Manager may file for someone else
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "vacation")]
    pub pto_type: PtoType,
    /// Single-day request charged as 0.5
    #[serde(default)]
    pub half_day: bool,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PtoCreated {
    #[schema(example = 31)]
    pub id: u64,
    #[schema(example = 3.0)]
    pub days: f64,
    #[schema(example = "pending")]
    pub status: PtoStatus,
}

#[derive(Deserialize, IntoParams)]
pub struct PtoFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by status
    #[param(example = "pending")]
    pub status: Option<String>,
    /// Filter by PTO type
    #[param(example = "vacation")]
    pub pto_type: Option<String>,
    /// Requests ending on or after this date
    #[param(value_type = Option<String>, format = Date, example = "2026-01-01")]
    pub from: Option<NaiveDate>,
    /// Requests starting on or before this date
    #[param(value_type = Option<String>, format = Date, example = "2026-12-31")]
    pub to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PtoListResponse {
    pub data: Vec<PtoRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Defaults to the caller's employee record
    pub employee_id: Option<u64>,
    /// Defaults to the current year
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    pub balances: Vec<PtoBalance>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePolicy {
    #[schema(example = 20.0)]
    pub annual_allowance: f64,
}

fn parse_filter<T: std::str::FromStr>(raw: Option<&str>, what: &str) -> AppResult<Option<T>> {
    raw.map(|v| {
        v.parse::<T>()
            .map_err(|_| AppError::bad_request(format!("Unknown {}: {}", what, v)))
    })
    .transpose()
}

/// Allowance per policy type minus approved usage; pending reported alongside.
pub fn build_balances(policies: &[PtoPolicy], usage: &[(String, String, f64)]) -> Vec<PtoBalance> {
    let mut used: HashMap<(PtoType, PtoStatus), f64> = HashMap::new();
    for (pto_type, status, days) in usage {
        if let (Ok(t), Ok(s)) = (pto_type.parse::<PtoType>(), status.parse::<PtoStatus>()) {
            *used.entry((t, s)).or_default() += days;
        }
    }

    policies
        .iter()
        .filter_map(|p| Some((p.pto_type.parse::<PtoType>().ok()?, p.annual_allowance)))
        .map(|(t, allowance)| {
            PtoBalance::new(
                t,
                allowance,
                used.get(&(t, PtoStatus::Approved)).copied().unwrap_or(0.0),
                used.get(&(t, PtoStatus::Pending)).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

async fn fetch_pto(pool: &MySqlPool, pto_id: u64) -> AppResult<PtoRequest> {
    let sql = format!("SELECT {} FROM pto_requests WHERE id = ?", PTO_COLUMNS);
    sqlx::query_as::<_, PtoRequest>(&sql)
        .bind(pto_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, pto_id, "Failed to fetch PTO request");
            AppError::Internal
        })?
        .ok_or_else(|| AppError::not_found("PTO request not found"))
}

/* =========================
Create PTO request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/pto",
    request_body(content = CreatePto, description = "PTO request payload", content_type = "application/json"),
    responses(
        (status = 201, description = "PTO request submitted", body = PtoCreated),
        (status = 400, description = "Invalid dates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an existing pending or approved request")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn create_pto(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePto>,
) -> AppResult<HttpResponse> {
    let employee_id = match payload.employee_id {
        Some(id) if auth.employee_id != Some(id) => {
            auth.require_approver()?;
            id
        }
        Some(id) => id,
        None => auth.require_employee_profile()?,
    };

    let days = count_pto_days(payload.start_date, payload.end_date, payload.half_day)
        .map_err(|e| AppError::bad_request(e.message()))?;

    let overlapping: Option<u64> = sqlx::query_scalar(
        r#"
        SELECT id FROM pto_requests
        WHERE employee_id = ?
        AND status IN ('pending', 'approved')
        AND start_date <= ? AND end_date >= ?
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .bind(payload.end_date)
    .bind(payload.start_date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_error("Failed to check overlapping PTO"))?;

    if let Some(existing) = overlapping {
        return Err(AppError::conflict(format!(
            "Overlaps existing PTO request #{}",
            existing
        )));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO pto_requests
            (employee_id, start_date, end_date, days, half_day, pto_type, reason)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .bind(payload.half_day)
    .bind(payload.pto_type.as_ref())
    .bind(payload.reason.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create PTO request");
        AppError::Internal
    })?;

    info!(employee_id, days, pto_type = %payload.pto_type, "PTO request submitted");

    Ok(HttpResponse::Created().json(PtoCreated {
        id: result.last_insert_id(),
        days,
        status: PtoStatus::Pending,
    }))
}

/* =========================
Approve PTO (HR/Admin/Manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/pto/{pto_id}/approve",
    params(("pto_id" = u64, Path, description = "ID of the PTO request to approve")),
    responses(
        (status = 200, description = "PTO approved", body = Object, example = json!({"message": "PTO approved"})),
        (status = 400, description = "PTO request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "PTO request not found"),
        (status = 409, description = "Insufficient balance")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn approve_pto(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;

    let pto_id = path.into_inner();
    let request = fetch_pto(pool.get_ref(), pto_id).await?;
    if auth.employee_id == Some(request.employee_id) {
        return Err(AppError::forbidden("You cannot approve your own PTO request"));
    }
    if request.status != PtoStatus::Pending.as_ref() {
        return Err(AppError::bad_request("PTO request already processed"));
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(db_error("Failed to open approval transaction"))?;

    let allowance: Option<f64> =
        sqlx::query_scalar("SELECT annual_allowance FROM pto_policies WHERE pto_type = ?")
            .bind(&request.pto_type)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to fetch PTO policy"))?;

    // no policy row means the type is not capped
    if let Some(allowance) = allowance {
        let used: f64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(days), 0) AS DOUBLE)
            FROM pto_requests
            WHERE employee_id = ?
            AND pto_type = ?
            AND status = 'approved'
            AND YEAR(start_date) = ?
            FOR UPDATE
            "#,
        )
        .bind(request.employee_id)
        .bind(&request.pto_type)
        .bind(request.start_date.year())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to sum approved PTO"))?;

        let pto_type = request
            .pto_type
            .parse::<PtoType>()
            .map_err(|_| AppError::Internal)?;
        let balance = PtoBalance::new(pto_type, allowance, used, 0.0);
        if !balance.can_take(request.days) {
            return Err(AppError::conflict(format!(
                "Insufficient {} balance: {} day(s) remaining, {} requested",
                request.pto_type, balance.remaining, request.days
            )));
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE pto_requests
        SET status = 'approved', reviewed_by = ?, reviewed_at = NOW()
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(pto_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, pto_id, "Approve PTO failed");
        AppError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::bad_request("PTO request already processed"));
    }

    tx.commit()
        .await
        .map_err(db_error("Failed to commit PTO approval"))?;

    info!(pto_id, approver = auth.user_id, "PTO approved");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "PTO approved"
    })))
}

/* =========================
Deny PTO (HR/Admin/Manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/pto/{pto_id}/deny",
    params(("pto_id" = u64, Path, description = "ID of the PTO request to deny")),
    responses(
        (status = 200, description = "PTO denied", body = Object, example = json!({"message": "PTO denied"})),
        (status = 400, description = "PTO request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn deny_pto(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;

    let pto_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE pto_requests
        SET status = 'denied', reviewed_by = ?, reviewed_at = NOW()
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(pto_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, pto_id, "Deny PTO failed");
        AppError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::bad_request("PTO request not found or already processed"));
    }

    info!(pto_id, approver = auth.user_id, "PTO denied");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "PTO denied"
    })))
}

/// for getting a PTO request
#[utoipa::path(
    get,
    path = "/api/v1/pto/{pto_id}",
    params(("pto_id" = u64, Path, description = "ID of the PTO request to fetch")),
    responses(
        (status = 200, description = "PTO request found", body = PtoRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "PTO request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn get_pto(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let request = fetch_pto(pool.get_ref(), path.into_inner()).await?;
    auth.require_self_or_approver(request.employee_id)?;
    Ok(HttpResponse::Ok().json(request))
}

/// for listing PTO requests
#[utoipa::path(
    get,
    path = "/api/v1/pto",
    params(PtoFilter),
    responses(
        (status = 200, description = "Paginated PTO list", body = PtoListResponse),
        (status = 400, description = "Unknown status or type filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn list_pto(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PtoFilter>,
) -> AppResult<HttpResponse> {
    auth.require_approver()?;

    let status: Option<PtoStatus> = parse_filter(query.status.as_deref(), "PTO status")?;
    let pto_type: Option<PtoType> = parse_filter(query.pto_type.as_deref(), "PTO type")?;
    let page = Page::new(query.page, query.per_page);

    let mut filter = WhereClause::new();
    filter
        .and_opt("employee_id = ?", query.employee_id)
        .and_opt("status = ?", status.map(|s| s.as_ref().to_string()))
        .and_opt("pto_type = ?", pto_type.map(|t| t.as_ref().to_string()))
        .and_opt("end_date >= ?", query.from)
        .and_opt("start_date <= ?", query.to);
    let where_sql = filter.sql();

    let count_sql = format!("SELECT COUNT(*) FROM pto_requests{}", where_sql);
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(db_error("Failed to count PTO requests"))?;

    let data_sql = format!(
        "SELECT {} FROM pto_requests{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        PTO_COLUMNS, where_sql
    );
    let requests = filter
        .bind_as(sqlx::query_as::<_, PtoRequest>(&data_sql))
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch PTO list"))?;

    Ok(HttpResponse::Ok().json(PtoListResponse {
        data: requests,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

/// Remaining PTO per type for one employee and year
#[utoipa::path(
    get,
    path = "/api/v1/pto/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balance per PTO type", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn pto_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<BalanceQuery>,
) -> AppResult<HttpResponse> {
    let employee_id = match query.employee_id {
        Some(id) => id,
        None => auth.require_employee_profile()?,
    };
    auth.require_self_or_approver(employee_id)?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let policies = sqlx::query_as::<_, PtoPolicy>(
        "SELECT pto_type, annual_allowance FROM pto_policies ORDER BY pto_type",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(db_error("Failed to fetch PTO policies"))?;

    let usage = sqlx::query_as::<_, (String, String, f64)>(
        r#"
        SELECT pto_type, status, CAST(SUM(days) AS DOUBLE)
        FROM pto_requests
        WHERE employee_id = ?
        AND YEAR(start_date) = ?
        AND status IN ('approved', 'pending')
        GROUP BY pto_type, status
        "#,
    )
    .bind(employee_id)
    .bind(year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, year, "Failed to sum PTO usage");
        AppError::Internal
    })?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        year,
        balances: build_balances(&policies, &usage),
    }))
}

/// PTO allowance per type
#[utoipa::path(
    get,
    path = "/api/v1/pto/policies",
    responses(
        (status = 200, description = "Configured PTO policies", body = [PtoPolicy]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn list_policies(_auth: AuthUser, pool: web::Data<MySqlPool>) -> AppResult<HttpResponse> {
    let policies = sqlx::query_as::<_, PtoPolicy>(
        "SELECT pto_type, annual_allowance FROM pto_policies ORDER BY pto_type",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(db_error("Failed to fetch PTO policies"))?;

    Ok(HttpResponse::Ok().json(policies))
}

/// Set the annual allowance of a PTO type (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/pto/policies/{pto_type}",
    params(("pto_type" = PtoType, Path, description = "PTO type")),
    request_body = UpdatePolicy,
    responses(
        (status = 200, description = "Policy saved", body = PtoPolicy),
        (status = 400, description = "Allowance out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "PTO"
)]
pub async fn update_policy(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<PtoType>,
    payload: web::Json<UpdatePolicy>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let allowance = payload.annual_allowance;
    if !(0.0..=366.0).contains(&allowance) || (allowance * 2.0).fract() != 0.0 {
        return Err(AppError::bad_request(
            "annual_allowance must be between 0 and 366 in half-day steps",
        ));
    }

    let pto_type = path.into_inner();
    sqlx::query(
        r#"
        INSERT INTO pto_policies (pto_type, annual_allowance)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE annual_allowance = VALUES(annual_allowance)
        "#,
    )
    .bind(pto_type.as_ref())
    .bind(allowance)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to save PTO policy"))?;

    info!(pto_type = %pto_type, allowance, "PTO policy updated");
    Ok(HttpResponse::Ok().json(PtoPolicy {
        pto_type: pto_type.to_string(),
        annual_allowance: allowance,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pto")
            // /pto
            .service(
                web::resource("")
                    .route(web::get().to(list_pto))
                    .route(web::post().to(create_pto)),
            )
            // static segments before /pto/{id}
            .service(web::resource("/balance").route(web::get().to(pto_balance)))
            .service(web::resource("/policies").route(web::get().to(list_policies)))
            .service(web::resource("/policies/{pto_type}").route(web::put().to(update_policy)))
            // /pto/{id}
            .service(web::resource("/{id}").route(web::get().to(get_pto)))
            // /pto/{id}/approve
            .service(web::resource("/{id}/approve").route(web::put().to(approve_pto)))
            // /pto/{id}/deny
            .service(web::resource("/{id}/deny").route(web::put().to(deny_pto))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{bearer, test_app};
    use crate::model::role::Role;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use serde_json::json;

    fn policy(t: &str, allowance: f64) -> PtoPolicy {
        PtoPolicy {
            pto_type: t.into(),
            annual_allowance: allowance,
        }
    }

    #[test]
    fn balances_combine_policy_and_usage() {
        let policies = [policy("personal", 3.0), policy("vacation", 15.0)];
        let usage = vec![
            ("vacation".to_string(), "approved".to_string(), 4.5),
            ("vacation".to_string(), "pending".to_string(), 2.0),
            ("sick".to_string(), "approved".to_string(), 1.0),
        ];
        let balances = build_balances(&policies, &usage);
        assert_eq!(
            balances,
            vec![
                PtoBalance::new(PtoType::Personal, 3.0, 0.0, 0.0),
                PtoBalance::new(PtoType::Vacation, 15.0, 4.5, 2.0),
            ]
        );
        assert_eq!(balances[1].remaining, 10.5);
    }

    #[actix_web::test]
    async fn inverted_dates_are_rejected() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::post()
            .uri("/api/v1/pto")
            .insert_header(bearer(Role::Employee, Some(3)))
            .set_json(json!({
                "start_date": "2026-01-07",
                "end_date": "2026-01-05",
                "pto_type": "vacation"
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body["message"], "start_date cannot be after end_date");
    }

    #[actix_web::test]
    async fn employees_cannot_file_for_colleagues() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::post()
            .uri("/api/v1/pto")
            .insert_header(bearer(Role::Employee, Some(3)))
            .set_json(json!({
                "employee_id": 4,
                "start_date": "2026-01-05",
                "end_date": "2026-01-05",
                "pto_type": "sick"
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn users_without_profile_need_an_employee_id() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::post()
            .uri("/api/v1/pto")
            .insert_header(bearer(Role::ApiUser, None))
            .set_json(json!({
                "start_date": "2026-01-05",
                "end_date": "2026-01-05",
                "pto_type": "personal"
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn only_approvers_list_requests() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::get()
            .uri("/api/v1/pto")
            .insert_header(bearer(Role::Employee, Some(3)))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn policy_changes_are_admin_only_and_range_checked() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::put()
            .uri("/api/v1/pto/policies/vacation")
            .insert_header(bearer(Role::Hr, None))
            .set_json(json!({ "annual_allowance": 20.0 }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::put()
            .uri("/api/v1/pto/policies/vacation")
            .insert_header(bearer(Role::Admin, None))
            .set_json(json!({ "annual_allowance": 10.25 }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
