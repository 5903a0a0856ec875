//! Ownership and staff checks applied before mutations.

use crate::errors::ServiceError;
use crate::models::user::User;

/// Only the author of a post or comment may change it.
pub fn ensure_author(user_id: i64, author_id: i64) -> Result<(), ServiceError> {
    if user_id != author_id {
        return Err(ServiceError::Forbidden("only the author can change this"));
    }
    Ok(())
}

pub fn ensure_staff(user: Option<&User>) -> Result<(), ServiceError> {
    match user {
        Some(u) if u.is_staff => Ok(()),
        Some(_) => Err(ServiceError::Forbidden("staff access required")),
        None => Err(ServiceError::Unauthorized),
    }
}
