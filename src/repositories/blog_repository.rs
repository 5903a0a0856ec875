// src/repositories/blog_repository.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::dtos::admin_dtos::{AdminCommentQuery, AdminListQuery, AdminPostQuery};
use crate::models::category::{Category, NewCategory};
use crate::models::comment::{Comment, CommentView, NewComment};
use crate::models::location::{Location, NewLocation};
use crate::models::post::{AdminPostChanges, NewPost, Post, PostChanges, PostFilter, PostView};
use crate::models::user::{NewUser, ProfileChanges, User};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("duplicate value violates {0}")]
    Conflict(String),
    #[error("referenced row does not exist: {0}")]
    MissingReference(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage seam for the blog. Lookups return `Ok(None)` for missing rows,
/// mutations of missing rows return `Ok(None)` / `Ok(false)`.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User>;
    async fn find_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn update_user_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<Option<User>>;

    async fn create_location(&self, new_location: NewLocation) -> RepoResult<Location>;
    async fn find_location(&self, id: i64) -> RepoResult<Option<Location>>;
    async fn list_locations(&self, query: &AdminListQuery) -> RepoResult<Vec<Location>>;
    async fn set_location_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Location>>;
    async fn delete_location(&self, id: i64) -> RepoResult<bool>;

    async fn create_category(&self, new_category: NewCategory) -> RepoResult<Category>;
    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    async fn list_categories(&self, query: &AdminListQuery) -> RepoResult<Vec<Category>>;
    async fn set_category_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> RepoResult<bool>;

    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post>;
    async fn find_post(&self, id: i64) -> RepoResult<Option<PostView>>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>>;
    async fn update_post_admin(&self, id: i64, changes: AdminPostChanges) -> RepoResult<Option<Post>>;
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;
    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<u64>;
    /// Posts matching `filter`, newest `pub_date` first.
    async fn list_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> RepoResult<Vec<PostView>>;
    /// Unfiltered by visibility, ordered by title ignoring case.
    async fn admin_list_posts(&self, query: &AdminPostQuery) -> RepoResult<Vec<PostView>>;

    async fn create_comment(&self, new_comment: NewComment) -> RepoResult<Comment>;
    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>>;
    async fn update_comment_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>>;
    async fn set_comment_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64) -> RepoResult<bool>;
    /// Comments of one post, oldest first.
    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<CommentView>>;
    /// All comments, newest first.
    async fn admin_list_comments(&self, query: &AdminCommentQuery) -> RepoResult<Vec<CommentView>>;
}
