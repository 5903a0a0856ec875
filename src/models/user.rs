use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `users` table.
/// `password_hash` is an argon2 encoded string and never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub is_staff: bool,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Version sent to other clients (redacted)
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            date_joined: user.date_joined,
        }
    }
}

/// JWT claims issued on login.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
}
