use chrono::{DateTime, Utc};
use serde::Serialize;

/// Row of the `posts` table.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub image: Option<String>,
    pub is_published: bool,
}

/// Full replacement of the author-editable fields.
/// `image: None` keeps the stored image.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub image: Option<String>,
    pub is_published: bool,
}

/// Columns editable from the admin list. `None` leaves a column untouched,
/// `Some(None)` clears a foreign key.
#[derive(Debug, Clone, Default)]
pub struct AdminPostChanges {
    pub is_published: Option<bool>,
    pub category_id: Option<Option<i64>>,
    pub location_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

/// A post joined with its author, category, location and comment count,
/// the shape every listing and the detail view work with.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
}

/// Which posts a listing selects. `viewer_id` enables the author bypass
/// of the visibility rule.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub viewer_id: Option<i64>,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub now: DateTime<Utc>,
}

impl PostFilter {
    pub fn new(viewer_id: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            viewer_id,
            author_id: None,
            category_id: None,
            now,
        }
    }

    pub fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}
