pub mod admin_handlers;
pub mod auth_handlers;
pub mod category_handlers;
pub mod comment_handlers;
pub mod media_handlers;
pub mod post_handlers;
pub mod profile_handlers;


use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::dtos::ApiResponse;

/// Route table shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth_handlers::register) // POST /auth/register
            .service(auth_handlers::login), // POST /auth/login
    )
    .service(
        web::scope("/api")
            .service(post_handlers::index) // GET /api/posts
            .service(post_handlers::create_post) // POST /api/posts
            .service(post_handlers::post_detail) // GET /api/posts/{id}
            .service(post_handlers::edit_post) // PUT /api/posts/{id}
            .service(post_handlers::delete_post) // DELETE /api/posts/{id}
            .service(comment_handlers::add_comment)
            .service(comment_handlers::get_comment)
            .service(comment_handlers::edit_comment)
            .service(comment_handlers::delete_comment)
            .service(category_handlers::category_posts)
            .service(profile_handlers::edit_profile) // PUT /api/profile
            .service(profile_handlers::get_profile), // GET /api/profile/{username}
    )
    .service(
        web::scope("/admin")
            .service(admin_handlers::list_locations)
            .service(admin_handlers::create_location)
            .service(admin_handlers::patch_location)
            .service(admin_handlers::delete_location)
            .service(admin_handlers::list_categories)
            .service(admin_handlers::create_category)
            .service(admin_handlers::patch_category)
            .service(admin_handlers::delete_category)
            .service(admin_handlers::list_posts)
            .service(admin_handlers::patch_post)
            .service(admin_handlers::delete_post)
            .service(admin_handlers::list_comments)
            .service(admin_handlers::patch_comment)
            .service(admin_handlers::delete_comment),
    )
    .service(media_handlers::serve_media);
}

/// JSON bodies up to `limit` bytes; malformed bodies get the error envelope.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let response = HttpResponse::BadRequest().json(ApiResponse::error(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response = HttpResponse::BadRequest().json(ApiResponse::error(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}
