use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorResponse, ValidationError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Admin authorization required")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("Too many votes. Please try again in {0} seconds.")]
    RateLimited(i64),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound => Status::NotFound,
            ApiError::InvalidId(_) | ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::Unauthorized => Status::Unauthorized,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Maps constraint violations onto client errors; everything else is internal.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            match db.code().as_deref() {
                Some("23505") => return ApiError::Conflict("Record already exists".into()),
                Some("23503") => return ApiError::BadRequest("Referenced record does not exist".into()),
                _ => {}
            }
        }
        error!("Database error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        // internal details stay in the logs
        let message = match &self {
            ApiError::Internal(_) => "An internal server error occurred.".to_string(),
            other => other.to_string(),
        };

        rocket::Response::build_from(Json(ErrorResponse { error: message }).respond_to(req)?)
            .status(status)
            .ok()
    }
}
