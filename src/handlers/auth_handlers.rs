use actix_web::{post, web, HttpResponse};
use log::info;

use crate::dtos::auth_dtos::{LoginIn, RegisterIn};
use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::AppState;

/// POST /auth/register
#[post("/register")]
pub async fn register(
    app_state: web::Data<AppState>,
    body: web::Json<RegisterIn>,
) -> Result<HttpResponse, ServiceError> {
    let user = app_state.accounts.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Registration successful", user)))
}

/// POST /auth/login
#[post("/login")]
pub async fn login(
    app_state: web::Data<AppState>,
    body: web::Json<LoginIn>,
) -> Result<HttpResponse, ServiceError> {
    let response = app_state.accounts.login(body.into_inner()).await?;
    info!("user {} logged in", response.user.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Login successful", response)))
}
