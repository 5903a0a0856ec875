// src/main.rs
mod authorization;
mod config;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod pagination;
mod repositories;
mod services;
mod visibility;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};

use crate::config::{Settings, StorageBackend};
use crate::repositories::memory_repository::MemoryRepository;
use crate::repositories::pg_repository::PgRepository;
use crate::repositories::BlogRepository;
use crate::services::account_services::AccountService;
use crate::services::admin_services::AdminService;
use crate::services::auth_services::AuthService;
use crate::services::blog_services::BlogService;
use crate::services::media_services::MediaStore;

pub struct AppState {
    pub blog: BlogService,
    pub accounts: AccountService,
    pub admin: AdminService,
}

impl AppState {
    pub fn new(repo: Arc<dyn BlogRepository>, auth: AuthService, media: MediaStore) -> Self {
        Self {
            blog: BlogService::new(repo.clone(), media.clone()),
            accounts: AccountService::new(repo.clone(), auth),
            admin: AdminService::new(repo, media),
        }
    }
}

async fn build_repository(storage: StorageBackend) -> anyhow::Result<Arc<dyn BlogRepository>> {
    match storage {
        StorageBackend::Postgres => {
            let pool = config::get_pg_pool()?;
            let repo = PgRepository::new(pool);
            repo.migrate().await?;
            Ok(Arc::new(repo))
        }
        StorageBackend::Memory => {
            warn!("STORAGE=memory: all data is lost on restart");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let repo = match build_repository(settings.storage).await {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to set up storage: {:#}", e);
            std::process::exit(1);
        }
    };

    let auth_service = AuthService::new(&settings.jwt_secret, settings.jwt_ttl_secs);
    let state = web::Data::new(AppState::new(
        repo,
        auth_service.clone(),
        MediaStore::new(settings.media_root.clone()),
    ));
    let auth_data = web::Data::new(auth_service);

    if let Some((username, password)) = &settings.admin {
        if let Err(e) = state.accounts.ensure_admin(username, password).await {
            error!("Failed to create staff account {}: {}", username, e);
            std::process::exit(1);
        }
    }

    let bind_address = format!("0.0.0.0:{}", settings.port);
    info!("Starting server on {}", bind_address);
    info!("Media root: {}", settings.media_root.display());

    let allowed_origins = settings.allowed_origins.clone();
    let max_body_bytes = settings.max_body_bytes;

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(auth_data.clone())
            .app_data(handlers::json_config(max_body_bytes))
            .app_data(handlers::query_config())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
