// src/middleware/auth_extractor.rs - bearer token authentication

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::{debug, error};

use crate::errors::ServiceError;
use crate::services::auth_services::AuthService;

/// The user behind a valid `Authorization: Bearer <jwt>` header.
/// Take `Option<AuthenticatedUser>` for endpoints anonymous visitors may call.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<AuthenticatedUser, ServiceError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(ServiceError::Unauthorized)?
        .to_str()
        .map_err(|_| ServiceError::Unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ServiceError::Unauthorized)?;

    let Some(auth) = req.app_data::<web::Data<AuthService>>() else {
        error!("AuthService is not registered as app data");
        return Err(ServiceError::Unauthorized);
    };

    match auth.verify_token(token) {
        Ok(user_id) => Ok(AuthenticatedUser { user_id }),
        Err(e) => {
            debug!("rejected bearer token: {}", e);
            Err(ServiceError::Unauthorized)
        }
    }
}
