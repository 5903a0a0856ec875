use chrono::{DateTime, Utc};
use serde::Serialize;

use super::post::AuthorRef;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author: AuthorRef,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
