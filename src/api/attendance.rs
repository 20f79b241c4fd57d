use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult, db_error},
    model::attendance::{AttendanceCode, qr_payload, token_from_scan},
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_VALID_MINUTES: i64 = 15;
const MAX_VALID_MINUTES: i64 = 12 * 60;

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCode {
    #[schema(example = "HQ lobby")]
    pub location: Option<String>,
    /// Lifetime of the code, 1 to 720 minutes (default 15)
    #[schema(example = 15)]
    pub valid_minutes: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedCode {
    #[schema(example = 5)]
    pub id: u64,
    #[schema(example = "6f1c3a52-9d55-4c8e-9a59-0b0b7f7c1d11")]
    pub token: String,
    /// String to encode in the QR image
    #[schema(example = "hrm-attendance:6f1c3a52-9d55-4c8e-9a59-0b0b7f7c1d11")]
    pub qr_payload: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub valid_on: NaiveDate,
    #[schema(example = "2026-01-05T09:15:00Z", format = "date-time", value_type = String)]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckIn {
    /// Bare token or the full scanned QR payload
    #[schema(example = "hrm-attendance:6f1c3a52-9d55-4c8e-9a59-0b0b7f7c1d11")]
    pub token: String,
}

fn valid_minutes(requested: Option<i64>) -> AppResult<i64> {
    let minutes = requested.unwrap_or(DEFAULT_VALID_MINUTES);
    if !(1..=MAX_VALID_MINUTES).contains(&minutes) {
        return Err(AppError::bad_request(format!(
            "valid_minutes must be between 1 and {}",
            MAX_VALID_MINUTES
        )));
    }
    Ok(minutes)
}

/// Issue a QR check-in code (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/codes",
    request_body = IssueCode,
    responses(
        (status = 201, description = "Code issued", body = IssuedCode),
        (status = 400, description = "valid_minutes out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn issue_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<IssueCode>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;
    let minutes = valid_minutes(payload.valid_minutes)?;

    let now = Utc::now();
    let token = Uuid::new_v4().to_string();
    let valid_on = now.date_naive();
    let expires_at = now + Duration::minutes(minutes);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance_codes (token, location, valid_on, expires_at, created_by)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token)
    .bind(payload.location.as_deref())
    .bind(valid_on)
    .bind(expires_at)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to store attendance code"))?;

    info!(code_id = result.last_insert_id(), minutes, "Attendance code issued");

    Ok(HttpResponse::Created().json(IssuedCode {
        id: result.last_insert_id(),
        qr_payload: qr_payload(&token),
        token,
        valid_on,
        expires_at,
    }))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckIn,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Invalid or expired code, or already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckIn>,
) -> AppResult<HttpResponse> {
    let employee_id = auth.require_employee_profile()?;

    let token = token_from_scan(&payload.token);
    if token.is_empty() {
        return Err(AppError::bad_request("Attendance code required"));
    }

    let code = sqlx::query_as::<_, AttendanceCode>(
        r#"
        SELECT id, token, location, valid_on, expires_at
        FROM attendance_codes
        WHERE token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_error("Failed to look up attendance code"))?
    .ok_or_else(|| AppError::bad_request("Invalid attendance code"))?;

    let now = Utc::now();
    if !code.is_usable(now) {
        return Err(AppError::bad_request("Attendance code expired"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, code_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(now.date_naive())
    .bind(now.time())
    .bind(code.id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!(employee_id, code_id = code.id, location = ?code.location, "Checked in");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Checked in successfully"
            })))
        }

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(AppError::bad_request("Already checked in today"));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(AppError::Internal)
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(auth: AuthUser, pool: web::Data<MySqlPool>) -> AppResult<HttpResponse> {
    let employee_id = auth.require_employee_profile()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?
        WHERE employee_id = ?
        AND date = ?
        AND check_out IS NULL
        "#,
    )
    .bind(now.time())
    .bind(employee_id)
    .bind(now.date_naive())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        AppError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::bad_request("No active check-in found for today"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // /attendance/codes
            .service(web::resource("/codes").route(web::post().to(issue_code)))
            // /attendance/check-in
            .service(web::resource("/check-in").route(web::post().to(check_in)))
            // /attendance/check-out
            .service(web::resource("/check-out").route(web::put().to(check_out))),
    );
}
