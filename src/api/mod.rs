pub mod attendance;
pub mod availability;
pub mod interview;
pub mod pto;

use actix_web::web;

use crate::error::AppError;

/// Malformed JSON bodies answer with the same `{"message"}` shape as handler errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| AppError::not_found(err.to_string()).into())
}
