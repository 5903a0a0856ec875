//! The visibility rule shared by every listing and the post detail view.
//!
//! A post is public when it is published, its publish time has passed and it
//! sits in a published category. Uncategorized posts are never public. The
//! author of a post always sees it.

use chrono::{DateTime, Utc};

use crate::models::post::{PostFilter, PostView};

pub fn is_public(post: &PostView, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && post.category.as_ref().is_some_and(|c| c.is_published)
}

pub fn is_visible_to(post: &PostView, viewer_id: Option<i64>, now: DateTime<Utc>) -> bool {
    viewer_id == Some(post.author.id) || is_public(post, now)
}

/// In-process counterpart of the SQL `WHERE` clause built by the postgres
/// repository for the same filter.
pub fn matches(filter: &PostFilter, post: &PostView) -> bool {
    if filter.author_id.is_some_and(|id| id != post.author.id) {
        return false;
    }
    if let Some(category_id) = filter.category_id {
        if post.category.as_ref().map(|c| c.id) != Some(category_id) {
            return false;
        }
    }
    is_visible_to(post, filter.viewer_id, filter.now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::{AuthorRef, CategoryRef};
    use chrono::Duration;

    fn post(author_id: i64, category: Option<(i64, bool)>) -> PostView {
        let now = Utc::now();
        PostView {
            id: 1,
            title: "Title".into(),
            text: "Text".into(),
            pub_date: now - Duration::hours(1),
            author: AuthorRef {
                id: author_id,
                username: "author".into(),
            },
            category: category.map(|(id, is_published)| CategoryRef {
                id,
                title: "Travel".into(),
                slug: "travel".into(),
                is_published,
            }),
            location: None,
            image: None,
            is_published: true,
            created_at: now,
            comment_count: 0,
        }
    }

    #[test]
    fn published_post_in_published_category_is_public() {
        assert!(is_public(&post(1, Some((1, true))), Utc::now()));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        let mut p = post(1, Some((1, true)));
        p.is_published = false;
        assert!(!is_public(&p, Utc::now()));
        assert!(!is_visible_to(&p, Some(2), Utc::now()));
        assert!(!is_visible_to(&p, None, Utc::now()));
    }

    #[test]
    fn future_post_is_hidden_until_pub_date() {
        let mut p = post(1, Some((1, true)));
        let now = Utc::now();
        p.pub_date = now + Duration::days(1);
        assert!(!is_public(&p, now));
        assert!(is_public(&p, now + Duration::days(2)));
    }

    #[test]
    fn hidden_or_missing_category_hides_post() {
        assert!(!is_public(&post(1, Some((1, false))), Utc::now()));
        assert!(!is_public(&post(1, None), Utc::now()));
    }

    #[test]
    fn author_sees_own_hidden_post() {
        let mut p = post(7, None);
        p.is_published = false;
        assert!(is_visible_to(&p, Some(7), Utc::now()));
    }

    #[test]
    fn filter_restricts_author_and_category() {
        let p = post(3, Some((5, true)));
        let now = Utc::now();
        assert!(matches(&PostFilter::new(None, now), &p));
        assert!(matches(&PostFilter::new(None, now).by_author(3), &p));
        assert!(!matches(&PostFilter::new(None, now).by_author(4), &p));
        assert!(matches(&PostFilter::new(None, now).in_category(5), &p));
        assert!(!matches(&PostFilter::new(None, now).in_category(6), &p));
    }
}
