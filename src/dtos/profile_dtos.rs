use serde::{Deserialize, Serialize};

use crate::models::post::PostView;
use crate::models::user::UserPublic;
use crate::pagination::Page;

#[derive(Debug, Deserialize)]
pub struct ProfileEditIn {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileOut {
    pub profile: UserPublic,
    /// Only present for the profile owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub posts: Page<PostView>,
}
