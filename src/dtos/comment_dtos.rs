use serde::{Deserialize, Serialize};

use crate::models::comment::Comment;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentOut {
    pub comment: Comment,
}
