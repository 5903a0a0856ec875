use actix_web::{get, web, HttpResponse};

use crate::dtos::ApiResponse;
use crate::errors::ServiceError;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::pagination::PageQuery;
use crate::AppState;

/// GET /api/categories/{slug}/posts?page=
#[get("/categories/{slug}/posts")]
pub async fn category_posts(
    app_state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let out = app_state
        .blog
        .category_posts(&path, user.map(|u| u.user_id), query.page.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Category posts retrieved", out)))
}
