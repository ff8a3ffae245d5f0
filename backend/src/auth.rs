use ring::constant_time::verify_slices_are_equal;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::routes::AppState;

/// Shared secret guarding the admin routes.
#[derive(Debug, Clone, Default)]
pub struct AdminToken {
    secret: Option<String>,
}

impl AdminToken {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// `header` is the raw `Authorization` value.
    pub fn verify(&self, header: Option<&str>) -> bool {
        let Some(secret) = &self.secret else {
            return false;
        };
        let Some(presented) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            return false;
        };
        verify_slices_are_equal(secret.as_bytes(), presented.trim().as_bytes()).is_ok()
    }
}

/// Request guard for routes only administrators may call.
pub struct Admin;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Admin {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((
                Status::InternalServerError,
                ApiError::Internal("application state missing".into()),
            ));
        };

        if state.admin.verify(req.headers().get_one("Authorization")) {
            debug!("Admin request authorized: {}", req.uri());
            Outcome::Success(Admin)
        } else {
            warn!("Rejected admin request to {}", req.uri());
            Outcome::Error((Status::Unauthorized, ApiError::Unauthorized))
        }
    }
}
