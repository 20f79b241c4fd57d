use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult, db_error},
    model::availability::AvailabilityWindow,
    utils::availability_cache,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveTime;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddAvailability {
    /// 0 = Sunday … 6 = Saturday
    #[schema(example = 1)]
    pub day_of_week: u8,
    #[schema(example = "09:00:00", format = "time", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "12:00:00", format = "time", value_type = String)]
    pub end_time: NaiveTime,
}

impl AddAvailability {
    fn validate(&self) -> AppResult<()> {
        if self.day_of_week > 6 {
            return Err(AppError::bad_request("day_of_week must be between 0 (Sunday) and 6"));
        }
        if self.start_time >= self.end_time {
            return Err(AppError::bad_request("start_time must be before end_time"));
        }
        Ok(())
    }

    fn overlaps(&self, other: &AvailabilityWindow) -> bool {
        other.is_active
            && other.day_of_week == self.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

async fn fetch_windows(pool: &MySqlPool, interviewer_id: u64) -> AppResult<Vec<AvailabilityWindow>> {
    sqlx::query_as::<_, AvailabilityWindow>(
        r#"
        SELECT id, interviewer_id, day_of_week, start_time, end_time, is_active
        FROM interviewer_availability
        WHERE interviewer_id = ?
        ORDER BY day_of_week, start_time
        "#,
    )
    .bind(interviewer_id)
    .fetch_all(pool)
    .await
    .map_err(db_error("Failed to fetch availability"))
}

/// Weekly availability of an interviewer
#[utoipa::path(
    get,
    path = "/api/v1/interviewers/{interviewer_id}/availability",
    params(("interviewer_id" = u64, Path, description = "Employee ID of the interviewer")),
    responses(
        (status = 200, description = "All windows, active and retired", body = [AvailabilityWindow]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn list_availability(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let windows = fetch_windows(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(windows))
}

#[utoipa::path(
    post,
    path = "/api/v1/interviewers/{interviewer_id}/availability",
    params(("interviewer_id" = u64, Path, description = "Employee ID of the interviewer")),
    request_body = AddAvailability,
    responses(
        (status = 201, description = "Window added", body = AvailabilityWindow),
        (status = 400, description = "Invalid day or time range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an active window")
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn add_availability(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AddAvailability>,
) -> AppResult<HttpResponse> {
    let interviewer_id = path.into_inner();
    auth.require_self_or_hr(interviewer_id)?;
    payload.validate()?;

    let existing = fetch_windows(pool.get_ref(), interviewer_id).await?;
    if let Some(clash) = existing.iter().find(|w| payload.overlaps(w)) {
        return Err(AppError::conflict(format!(
            "Overlaps availability window #{} ({}-{})",
            clash.id, clash.start_time, clash.end_time
        )));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO interviewer_availability (interviewer_id, day_of_week, start_time, end_time)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(interviewer_id)
    .bind(payload.day_of_week)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to insert availability"))?;

    availability_cache::invalidate(interviewer_id).await;
    info!(interviewer_id, day = payload.day_of_week, "Availability window added");

    Ok(HttpResponse::Created().json(AvailabilityWindow {
        id: result.last_insert_id(),
        interviewer_id,
        day_of_week: payload.day_of_week,
        start_time: payload.start_time,
        end_time: payload.end_time,
        is_active: true,
    }))
}

/// Deactivates a window. Rows are never deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/interviewers/{interviewer_id}/availability/{slot_id}",
    params(
        ("interviewer_id" = u64, Path, description = "Employee ID of the interviewer"),
        ("slot_id" = u64, Path, description = "Availability window ID")
    ),
    responses(
        (status = 204, description = "Window deactivated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Window not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn remove_availability(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
) -> AppResult<HttpResponse> {
    let (interviewer_id, slot_id) = path.into_inner();
    auth.require_self_or_hr(interviewer_id)?;

    let result = sqlx::query(
        r#"
        UPDATE interviewer_availability
        SET is_active = FALSE
        WHERE id = ? AND interviewer_id = ? AND is_active = TRUE
        "#,
    )
    .bind(slot_id)
    .bind(interviewer_id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to deactivate availability"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Availability window not found"));
    }

    availability_cache::invalidate(interviewer_id).await;
    info!(interviewer_id, slot_id, "Availability window deactivated");

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/interviewers/{interviewer_id}/availability")
            .service(
                web::resource("")
                    .route(web::get().to(list_availability))
                    .route(web::post().to(add_availability)),
            )
            .service(web::resource("/{slot_id}").route(web::delete().to(remove_availability))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{bearer, test_app};
    use crate::model::role::Role;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service};
    use serde_json::json;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn existing(day: u8, from: NaiveTime, to: NaiveTime, is_active: bool) -> AvailabilityWindow {
        AvailabilityWindow {
            id: 9,
            interviewer_id: 7,
            day_of_week: day,
            start_time: from,
            end_time: to,
            is_active,
        }
    }

    #[test]
    fn new_windows_must_not_overlap_active_ones() {
        let req = AddAvailability {
            day_of_week: 1,
            start_time: t(11, 0),
            end_time: t(13, 0),
        };
        assert!(req.overlaps(&existing(1, t(9, 0), t(12, 0), true)));
        assert!(!req.overlaps(&existing(1, t(9, 0), t(11, 0), true)));
        assert!(!req.overlaps(&existing(2, t(9, 0), t(12, 0), true)));
        assert!(!req.overlaps(&existing(1, t(9, 0), t(12, 0), false)));
    }

    #[test]
    fn validation_rejects_bad_days_and_empty_ranges() {
        let bad_day = AddAvailability {
            day_of_week: 7,
            start_time: t(9, 0),
            end_time: t(10, 0),
        };
        assert!(bad_day.validate().is_err());
        let empty = AddAvailability {
            day_of_week: 3,
            start_time: t(10, 0),
            end_time: t(10, 0),
        };
        assert!(empty.validate().is_err());
    }

    #[actix_web::test]
    async fn employees_edit_only_their_own_windows() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::post()
            .uri("/api/v1/interviewers/8/availability")
            .insert_header(bearer(Role::Employee, Some(7)))
            .set_json(json!({ "day_of_week": 1, "start_time": "09:00:00", "end_time": "12:00:00" }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::delete()
            .uri("/api/v1/interviewers/8/availability/3")
            .insert_header(bearer(Role::Manager, Some(7)))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn inverted_window_is_rejected() {
        let app = init_service(test_app(configure)).await;
        let req = TestRequest::post()
            .uri("/api/v1/interviewers/7/availability")
            .insert_header(bearer(Role::Employee, Some(7)))
            .set_json(json!({ "day_of_week": 1, "start_time": "12:00:00", "end_time": "09:00:00" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
