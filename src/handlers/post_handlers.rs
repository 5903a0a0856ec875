// src/handlers/post_handlers.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use log::debug;

use crate::dtos::post_dtos::PostForm;
use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::pagination::PageQuery;
use crate::AppState;

/// GET /api/posts?page=
#[get("/posts")]
pub async fn index(
    app_state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let viewer = user.map(|u| u.user_id);
    let page = app_state.blog.index(viewer, query.page.as_deref()).await?;
    debug!("index page {} of {} for {:?}", page.number, page.num_pages, viewer);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved successfully", page)))
}

/// POST /api/posts
#[post("/posts")]
pub async fn create_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostForm>,
) -> Result<HttpResponse, ServiceError> {
    let post = app_state.blog.create_post(user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Post created successfully", post)))
}

/// GET /api/posts/{post_id}
#[get("/posts/{post_id}")]
pub async fn post_detail(
    app_state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let detail = app_state
        .blog
        .post_detail(path.into_inner(), user.map(|u| u.user_id))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post retrieved successfully", detail)))
}

/// PUT /api/posts/{post_id}
#[put("/posts/{post_id}")]
pub async fn edit_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PostForm>,
) -> Result<HttpResponse, ServiceError> {
    let post = app_state
        .blog
        .edit_post(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post updated successfully", post)))
}

/// DELETE /api/posts/{post_id}
#[delete("/posts/{post_id}")]
pub async fn delete_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    app_state.blog.delete_post(user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Post deleted")))
}
