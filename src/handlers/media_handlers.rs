use actix_web::{get, web, HttpResponse};

use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::services::media_services::content_type_for;
use crate::AppState;

/// GET /media/{path}
/// Serve uploaded post images
#[get("/media/{path:.*}")]
pub async fn serve_media(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let relative = path.into_inner();
    match app_state.blog.media().read(&relative).await? {
        Some(data) => Ok(HttpResponse::Ok()
            .content_type(content_type_for(&relative))
            .body(data)),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error("File not found"))),
    }
}
