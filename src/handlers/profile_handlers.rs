// src/handlers/profile_handlers.rs
use actix_web::{get, put, web, HttpResponse};

use crate::dtos::profile_dtos::ProfileEditIn;
use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::pagination::PageQuery;
use crate::AppState;

/// GET /api/profile/{username}?page=
#[get("/profile/{username}")]
pub async fn get_profile(
    app_state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let profile = app_state
        .blog
        .profile(&path, user.map(|u| u.user_id), query.page.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Profile retrieved successfully", profile)))
}

/// PUT /api/profile
/// Edit the caller's own name and email.
#[put("/profile")]
pub async fn edit_profile(
    app_state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ProfileEditIn>,
) -> Result<HttpResponse, ServiceError> {
    let profile = app_state
        .accounts
        .edit_profile(user.user_id, body.into_inner())
        .await?;
    let location = format!("/api/profile/{}", urlencoding::encode(&profile.username));
    Ok(HttpResponse::Ok()
        .insert_header(("Location", location))
        .json(ApiResponse::success("Profile updated successfully", profile)))
}
