// src/repositories/pg_repository.rs - PostgreSQL store on a deadpool pool

use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::{debug, info};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

use super::blog_repository::{BlogRepository, RepoError, RepoResult};
use crate::dtos::admin_dtos::{AdminCommentQuery, AdminListQuery, AdminPostQuery};
use crate::models::category::{Category, NewCategory};
use crate::models::comment::{Comment, CommentView, NewComment};
use crate::models::location::{Location, NewLocation};
use crate::models::post::{
    AdminPostChanges, AuthorRef, CategoryRef, LocationRef, NewPost, Post, PostChanges, PostFilter,
    PostView,
};
use crate::models::user::{NewUser, ProfileChanges, User};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, email, is_staff, date_joined";
const LOCATION_COLUMNS: &str = "id, name, is_published, created_at";
const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";
const POST_COLUMNS: &str =
    "id, title, text, pub_date, author_id, location_id, category_id, image, is_published, created_at";
const COMMENT_COLUMNS: &str = "id, text, post_id, author_id, is_published, created_at";

const POST_VIEW_SELECT: &str = "
    SELECT p.id, p.title, p.text, p.pub_date, p.image, p.is_published, p.created_at,
           u.id AS author_id, u.username AS author_username,
           c.id AS category_id, c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           l.id AS location_id, l.name AS location_name, l.is_published AS location_is_published,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
      FROM posts p
      JOIN users u ON u.id = p.author_id
      LEFT JOIN categories c ON c.id = p.category_id
      LEFT JOIN locations l ON l.id = p.location_id";

const COMMENT_VIEW_SELECT: &str = "
    SELECT cm.id, cm.text, cm.post_id, cm.is_published, cm.created_at,
           u.id AS author_id, u.username AS author_username
      FROM comments cm
      JOIN users u ON u.id = cm.author_id";

pub struct PgRepository {
    pool: Pool,
}

impl PgRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the schema if it is missing. Every statement is idempotent.
    pub async fn migrate(&self) -> RepoResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("database schema is up to date");
        Ok(())
    }
}

/// Positional parameters for queries assembled at runtime.
#[derive(Default)]
struct SqlParams {
    values: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl SqlParams {
    fn push<T: ToSql + Sync + Send + 'static>(&mut self, value: T) -> String {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v.as_ref() as &(dyn ToSql + Sync)).collect()
    }
}

/// `%q%` for ILIKE with the wildcard characters of `q` escaped.
fn like_pattern(q: Option<&str>) -> Option<String> {
    let q = q.map(str::trim).filter(|q| !q.is_empty())?;
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

fn map_db_error(err: tokio_postgres::Error) -> RepoError {
    if let Some(db) = err.as_db_error() {
        let constraint = db.constraint().unwrap_or_default().to_string();
        if *db.code() == SqlState::UNIQUE_VIOLATION {
            return RepoError::Conflict(constraint);
        }
        if *db.code() == SqlState::FOREIGN_KEY_VIOLATION {
            return RepoError::MissingReference(constraint);
        }
    }
    RepoError::Postgres(err)
}

/// WHERE clause selecting the posts `filter` lets the viewer see.
fn post_filter_clause(filter: &PostFilter, params: &mut SqlParams) -> String {
    let now = params.push(filter.now);
    let public = format!(
        "(p.is_published AND p.pub_date <= {} AND c.is_published IS TRUE)",
        now
    );
    let mut conditions = vec![match filter.viewer_id {
        Some(viewer_id) => format!("({} OR p.author_id = {})", public, params.push(viewer_id)),
        None => public,
    }];
    if let Some(author_id) = filter.author_id {
        conditions.push(format!("p.author_id = {}", params.push(author_id)));
    }
    if let Some(category_id) = filter.category_id {
        conditions.push(format!("p.category_id = {}", params.push(category_id)));
    }
    format!("WHERE {}", conditions.join(" AND "))
}

fn user_from_row(row: &Row) -> Result<User, tokio_postgres::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        is_staff: row.try_get("is_staff")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn location_from_row(row: &Row) -> Result<Location, tokio_postgres::Error> {
    Ok(Location {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &Row) -> Result<Category, tokio_postgres::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &Row) -> Result<Post, tokio_postgres::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author_id: row.try_get("author_id")?,
        location_id: row.try_get("location_id")?,
        category_id: row.try_get("category_id")?,
        image: row.try_get("image")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_view_from_row(row: &Row) -> Result<PostView, tokio_postgres::Error> {
    let category = match row.try_get::<_, Option<i64>>("category_id")? {
        Some(id) => Some(CategoryRef {
            id,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        }),
        None => None,
    };
    let location = match row.try_get::<_, Option<i64>>("location_id")? {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
        }),
        None => None,
    };

    Ok(PostView {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category,
        location,
        image: row.try_get("image")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        comment_count: row.try_get("comment_count")?,
    })
}

fn comment_from_row(row: &Row) -> Result<Comment, tokio_postgres::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_view_from_row(row: &Row) -> Result<CommentView, tokio_postgres::Error> {
    Ok(CommentView {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect<T>(
    rows: Vec<Row>,
    map: fn(&Row) -> Result<T, tokio_postgres::Error>,
) -> RepoResult<Vec<T>> {
    rows.iter().map(|r| map(r).map_err(RepoError::from)).collect()
}

fn optional<T>(
    row: Option<Row>,
    map: fn(&Row) -> Result<T, tokio_postgres::Error>,
) -> RepoResult<Option<T>> {
    row.as_ref().map(map).transpose().map_err(RepoError::from)
}

#[async_trait]
impl BlogRepository for PgRepository {
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO users (username, password_hash, email, is_staff)
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_one(
                &sql,
                &[&new_user.username, &new_user.password_hash, &new_user.email, &new_user.is_staff],
            )
            .await
            .map_err(map_db_error)?;
        Ok(user_from_row(&row)?)
    }

    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        optional(client.query_opt(&sql, &[&id]).await?, user_from_row)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        optional(client.query_opt(&sql, &[&username]).await?, user_from_row)
    }

    async fn update_user_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<Option<User>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_opt(&sql, &[&id, &changes.first_name, &changes.last_name, &changes.email])
            .await?;
        optional(row, user_from_row)
    }

    async fn create_location(&self, new_location: NewLocation) -> RepoResult<Location> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO locations (name, is_published) VALUES ($1, $2) RETURNING {}",
            LOCATION_COLUMNS
        );
        let row = client
            .query_one(&sql, &[&new_location.name, &new_location.is_published])
            .await
            .map_err(map_db_error)?;
        Ok(location_from_row(&row)?)
    }

    async fn find_location(&self, id: i64) -> RepoResult<Option<Location>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM locations WHERE id = $1", LOCATION_COLUMNS);
        optional(client.query_opt(&sql, &[&id]).await?, location_from_row)
    }

    async fn list_locations(&self, query: &AdminListQuery) -> RepoResult<Vec<Location>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM locations
             WHERE ($1::text IS NULL OR name ILIKE $1)
               AND ($2::bool IS NULL OR is_published = $2)
             ORDER BY lower(name), id",
            LOCATION_COLUMNS
        );
        let pattern = like_pattern(query.q.as_deref());
        let rows = client.query(&sql, &[&pattern, &query.is_published]).await?;
        collect(rows, location_from_row)
    }

    async fn set_location_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Location>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE locations SET is_published = $2 WHERE id = $1 RETURNING {}",
            LOCATION_COLUMNS
        );
        optional(client.query_opt(&sql, &[&id, &is_published]).await?, location_from_row)
    }

    async fn delete_location(&self, id: i64) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM locations WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn create_category(&self, new_category: NewCategory) -> RepoResult<Category> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO categories (title, description, slug, is_published)
             VALUES ($1, $2, $3, $4) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &new_category.title,
                    &new_category.description,
                    &new_category.slug,
                    &new_category.is_published,
                ],
            )
            .await
            .map_err(map_db_error)?;
        Ok(category_from_row(&row)?)
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        optional(client.query_opt(&sql, &[&id]).await?, category_from_row)
    }

    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
        optional(client.query_opt(&sql, &[&slug]).await?, category_from_row)
    }

    async fn list_categories(&self, query: &AdminListQuery) -> RepoResult<Vec<Category>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM categories
             WHERE ($1::text IS NULL OR title ILIKE $1 OR slug ILIKE $1)
               AND ($2::bool IS NULL OR is_published = $2)
             ORDER BY lower(title), id",
            CATEGORY_COLUMNS
        );
        let pattern = like_pattern(query.q.as_deref());
        let rows = client.query(&sql, &[&pattern, &query.is_published]).await?;
        collect(rows, category_from_row)
    }

    async fn set_category_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Category>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE categories SET is_published = $2 WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        );
        optional(client.query_opt(&sql, &[&id, &is_published]).await?, category_from_row)
    }

    async fn delete_category(&self, id: i64) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM categories WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO posts (title, text, pub_date, author_id, location_id, category_id, image, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            POST_COLUMNS
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &new_post.title,
                    &new_post.text,
                    &new_post.pub_date,
                    &new_post.author_id,
                    &new_post.location_id,
                    &new_post.category_id,
                    &new_post.image,
                    &new_post.is_published,
                ],
            )
            .await
            .map_err(map_db_error)?;
        Ok(post_from_row(&row)?)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<PostView>> {
        let client = self.pool.get().await?;
        let sql = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);
        optional(client.query_opt(&sql, &[&id]).await?, post_view_from_row)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE posts
                SET title = $2, text = $3, pub_date = $4, location_id = $5, category_id = $6,
                    image = COALESCE($7, image), is_published = $8
              WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        );
        let row = client
            .query_opt(
                &sql,
                &[
                    &id,
                    &changes.title,
                    &changes.text,
                    &changes.pub_date,
                    &changes.location_id,
                    &changes.category_id,
                    &changes.image,
                    &changes.is_published,
                ],
            )
            .await
            .map_err(map_db_error)?;
        optional(row, post_from_row)
    }

    async fn update_post_admin(&self, id: i64, changes: AdminPostChanges) -> RepoResult<Option<Post>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE posts
                SET is_published = COALESCE($2, is_published),
                    category_id = CASE WHEN $3 THEN $4 ELSE category_id END,
                    location_id = CASE WHEN $5 THEN $6 ELSE location_id END
              WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        );
        let set_category = changes.category_id.is_some();
        let category_id = changes.category_id.flatten();
        let set_location = changes.location_id.is_some();
        let location_id = changes.location_id.flatten();
        let row = client
            .query_opt(
                &sql,
                &[
                    &id,
                    &changes.is_published,
                    &set_category,
                    &category_id,
                    &set_location,
                    &location_id,
                ],
            )
            .await
            .map_err(map_db_error)?;
        optional(row, post_from_row)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM posts WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<u64> {
        let client = self.pool.get().await?;
        let mut params = SqlParams::default();
        let clause = post_filter_clause(filter, &mut params);
        let sql = format!(
            "SELECT COUNT(*) AS n FROM posts p
               LEFT JOIN categories c ON c.id = p.category_id
             {}",
            clause
        );
        let row = client.query_one(&sql, &params.as_refs()).await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    async fn list_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> RepoResult<Vec<PostView>> {
        let client = self.pool.get().await?;
        let mut params = SqlParams::default();
        let clause = post_filter_clause(filter, &mut params);
        let limit = params.push(limit as i64);
        let offset = params.push(offset as i64);
        let sql = format!(
            "{} {} ORDER BY p.pub_date DESC, p.id DESC LIMIT {} OFFSET {}",
            POST_VIEW_SELECT, clause, limit, offset
        );
        debug!("list_posts: {}", sql);
        let rows = client.query(&sql, &params.as_refs()).await?;
        collect(rows, post_view_from_row)
    }

    async fn admin_list_posts(&self, query: &AdminPostQuery) -> RepoResult<Vec<PostView>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR p.title ILIKE $1 OR p.text ILIKE $1)
                 AND ($2::bool IS NULL OR p.is_published = $2)
                 AND ($3::bigint IS NULL OR p.category_id = $3)
                 AND ($4::bigint IS NULL OR p.location_id = $4)
                 AND ($5::timestamptz IS NULL OR p.pub_date >= $5)
                 AND ($6::timestamptz IS NULL OR p.pub_date < $6)
               ORDER BY lower(p.title), p.id",
            POST_VIEW_SELECT
        );
        let pattern = like_pattern(query.q.as_deref());
        let rows = client
            .query(
                &sql,
                &[
                    &pattern,
                    &query.is_published,
                    &query.category_id,
                    &query.location_id,
                    &query.pub_date_from,
                    &query.pub_date_to,
                ],
            )
            .await?;
        collect(rows, post_view_from_row)
    }

    async fn create_comment(&self, new_comment: NewComment) -> RepoResult<Comment> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO comments (text, post_id, author_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );
        let row = client
            .query_one(&sql, &[&new_comment.text, &new_comment.post_id, &new_comment.author_id])
            .await
            .map_err(map_db_error)?;
        Ok(comment_from_row(&row)?)
    }

    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        optional(client.query_opt(&sql, &[&id]).await?, comment_from_row)
    }

    async fn update_comment_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE comments SET text = $2 WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );
        optional(client.query_opt(&sql, &[&id, &text]).await?, comment_from_row)
    }

    async fn set_comment_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Comment>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE comments SET is_published = $2 WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );
        optional(client.query_opt(&sql, &[&id, &is_published]).await?, comment_from_row)
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM comments WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<CommentView>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "{} WHERE cm.post_id = $1 ORDER BY cm.created_at, cm.id",
            COMMENT_VIEW_SELECT
        );
        let rows = client.query(&sql, &[&post_id]).await?;
        collect(rows, comment_view_from_row)
    }

    async fn admin_list_comments(&self, query: &AdminCommentQuery) -> RepoResult<Vec<CommentView>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR cm.text ILIKE $1)
                 AND ($2::bool IS NULL OR cm.is_published = $2)
                 AND ($3::timestamptz IS NULL OR cm.created_at >= $3)
                 AND ($4::timestamptz IS NULL OR cm.created_at < $4)
               ORDER BY cm.created_at DESC, cm.id DESC",
            COMMENT_VIEW_SELECT
        );
        let pattern = like_pattern(query.q.as_deref());
        let rows = client
            .query(
                &sql,
                &[&pattern, &query.is_published, &query.created_from, &query.created_to],
            )
            .await?;
        collect(rows, comment_view_from_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("50%_off")), Some("%50\\%\\_off%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn anonymous_filter_has_no_author_bypass() {
        let mut params = SqlParams::default();
        let clause = post_filter_clause(&PostFilter::new(None, Utc::now()), &mut params);
        assert_eq!(
            clause,
            "WHERE (p.is_published AND p.pub_date <= $1 AND c.is_published IS TRUE)"
        );
        assert_eq!(params.values.len(), 1);
    }

    #[test]
    fn viewer_filter_adds_bypass_and_scopes() {
        let mut params = SqlParams::default();
        let filter = PostFilter::new(Some(4), Utc::now()).by_author(4).in_category(9);
        let clause = post_filter_clause(&filter, &mut params);
        assert!(clause.contains("OR p.author_id = $2)"));
        assert!(clause.contains("p.author_id = $3"));
        assert!(clause.contains("p.category_id = $4"));
        assert_eq!(params.values.len(), 4);
    }
}
