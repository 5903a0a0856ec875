pub mod blog_repository;
pub mod memory_repository;
pub mod pg_repository;

pub use blog_repository::{BlogRepository, RepoError, RepoResult};
