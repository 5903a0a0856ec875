// src/handlers/admin_handlers.rs - staff endpoints under /admin

use actix_web::{delete, get, patch, post, web, HttpResponse};

use crate::dtos::admin_dtos::{
    AdminCommentQuery, AdminListQuery, AdminPostPatch, AdminPostQuery, CategoryIn, LocationIn,
    PublishPatch,
};
use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::AppState;

#[get("/locations")]
pub async fn list_locations(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let locations = app_state.admin.list_locations(user.user_id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Locations retrieved", locations)))
}

#[post("/locations")]
pub async fn create_location(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<LocationIn>,
) -> Result<HttpResponse, ServiceError> {
    let location = app_state.admin.create_location(user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Location created", location)))
}

#[patch("/locations/{id}")]
pub async fn patch_location(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PublishPatch>,
) -> Result<HttpResponse, ServiceError> {
    let location = app_state
        .admin
        .set_location_published(user.user_id, path.into_inner(), body.is_published)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Location updated", location)))
}

#[delete("/locations/{id}")]
pub async fn delete_location(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    app_state.admin.delete_location(user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Location deleted")))
}

#[get("/categories")]
pub async fn list_categories(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let categories = app_state.admin.list_categories(user.user_id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Categories retrieved", categories)))
}

#[post("/categories")]
pub async fn create_category(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CategoryIn>,
) -> Result<HttpResponse, ServiceError> {
    let category = app_state.admin.create_category(user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Category created", category)))
}

#[patch("/categories/{id}")]
pub async fn patch_category(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PublishPatch>,
) -> Result<HttpResponse, ServiceError> {
    let category = app_state
        .admin
        .set_category_published(user.user_id, path.into_inner(), body.is_published)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Category updated", category)))
}

#[delete("/categories/{id}")]
pub async fn delete_category(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    app_state.admin.delete_category(user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Category deleted")))
}

#[get("/posts")]
pub async fn list_posts(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AdminPostQuery>,
) -> Result<HttpResponse, ServiceError> {
    let posts = app_state.admin.list_posts(user.user_id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Posts retrieved", posts)))
}

#[patch("/posts/{id}")]
pub async fn patch_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<AdminPostPatch>,
) -> Result<HttpResponse, ServiceError> {
    let post = app_state
        .admin
        .patch_post(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Post updated", post)))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    app_state.admin.delete_post(user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Post deleted")))
}

#[get("/comments")]
pub async fn list_comments(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AdminCommentQuery>,
) -> Result<HttpResponse, ServiceError> {
    let comments = app_state.admin.list_comments(user.user_id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Comments retrieved", comments)))
}

#[patch("/comments/{id}")]
pub async fn patch_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PublishPatch>,
) -> Result<HttpResponse, ServiceError> {
    let comment = app_state
        .admin
        .set_comment_published(user.user_id, path.into_inner(), body.is_published)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Comment updated", comment)))
}

#[delete("/comments/{id}")]
pub async fn delete_comment(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    app_state.admin.delete_comment(user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Comment deleted")))
}
