use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::default_true;
use crate::models::category::Category;
use crate::models::comment::CommentView;
use crate::models::post::PostView;
use crate::pagination::Page;

/// Body of create and edit requests.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    /// base64, optionally prefixed with a `data:<mime>;base64,` header
    pub data: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetailOut {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPostsOut {
    pub category: Category,
    pub posts: Page<PostView>,
}
