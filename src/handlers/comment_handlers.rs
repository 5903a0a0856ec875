// src/handlers/comment_handlers.rs

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::dtos::comment_dtos::{CommentForm, CommentOut};
use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::AppState;

/// POST /api/posts/{post_id}/comments
#[post("/posts/{post_id}/comments")]
pub async fn add_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentForm>,
) -> Result<HttpResponse, ServiceError> {
    let comment = app_state
        .blog
        .add_comment(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Comment added", CommentOut { comment })))
}

/// GET /api/posts/{post_id}/comments/{comment_id}
/// Current text of a comment, for its author's edit form.
#[get("/posts/{post_id}/comments/{comment_id}")]
pub async fn get_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (post_id, comment_id) = path.into_inner();
    let comment = app_state
        .blog
        .comment_for_edit(user.user_id, post_id, comment_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Comment retrieved", CommentOut { comment })))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
#[put("/posts/{post_id}/comments/{comment_id}")]
pub async fn edit_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentForm>,
) -> Result<HttpResponse, ServiceError> {
    let (post_id, comment_id) = path.into_inner();
    let comment = app_state
        .blog
        .edit_comment(user.user_id, post_id, comment_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Comment updated", CommentOut { comment })))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
#[delete("/posts/{post_id}/comments/{comment_id}")]
pub async fn delete_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (post_id, comment_id) = path.into_inner();
    app_state
        .blog
        .delete_comment(user.user_id, post_id, comment_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Comment deleted")))
}
