use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{default_true, double_option};

/// Search and filter parameters of the admin list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub q: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostQuery {
    pub q: Option<String>,
    pub is_published: Option<bool>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    /// `pub_date >= pub_date_from`
    pub pub_date_from: Option<DateTime<Utc>>,
    /// `pub_date < pub_date_to`
    pub pub_date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminCommentQuery {
    pub q: Option<String>,
    pub is_published: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LocationIn {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryIn {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct PublishPatch {
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostPatch {
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<i64>>,
}

/// Case-insensitive substring match used for `q` over a model's search fields.
pub fn search_matches(q: Option<&str>, fields: &[&str]) -> bool {
    match q.map(str::trim).filter(|q| !q.is_empty()) {
        None => true,
        Some(q) => {
            let needle = q.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }
    }
}

/// Half-open date range check; a missing bound is unbounded.
pub fn in_range(
    value: DateTime<Utc>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    from.is_none_or(|from| value >= from) && to.is_none_or(|to| value < to)
}
