use crate::config::Config;
use crate::error::AppError;
use crate::{model::role::Role, auth::jwt::verify_token};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

fn from_bearer(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let config = req.app_data::<Data<Config>>().ok_or(AppError::Internal)?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    let role = Role::from_id(claims.role).ok_or_else(|| AppError::Unauthorized("Invalid role".into()))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // auth_middleware already decoded the token on protected routes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        ready(from_bearer(req))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(AppError::forbidden("HR/Admin only"))
        }
    }

    /// HR, Admin or Manager.
    pub fn require_approver(&self) -> Result<(), AppError> {
        if self.role.can_approve() {
            Ok(())
        } else {
            Err(AppError::forbidden("HR/Admin/Manager only"))
        }
    }

    pub fn require_employee_profile(&self) -> Result<u64, AppError> {
        self.employee_id
            .ok_or_else(|| AppError::forbidden("No employee profile"))
    }

    /// Own records, or anyone's for approvers.
    pub fn require_self_or_approver(&self, employee_id: u64) -> Result<(), AppError> {
        if self.employee_id == Some(employee_id) || self.role.can_approve() {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only access your own records"))
        }
    }

    /// Own records, or anyone's for HR/Admin.
    pub fn require_self_or_hr(&self, employee_id: u64) -> Result<(), AppError> {
        if self.employee_id == Some(employee_id) || matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only change your own records"))
        }
    }
}
