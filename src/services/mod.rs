pub mod account_services;
pub mod admin_services;
pub mod auth_services;
pub mod blog_services;
pub mod media_services;
pub mod validation;
