use serde::{Deserialize, Serialize};

use crate::models::user::UserPublic;

#[derive(Deserialize)]
pub struct RegisterIn {
    pub username: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub session: SessionOut,
    pub user: UserPublic,
}
