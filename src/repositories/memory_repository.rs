// src/repositories/memory_repository.rs - in-process store for STORAGE=memory and tests

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::blog_repository::{BlogRepository, RepoError, RepoResult};
use crate::dtos::admin_dtos::{
    AdminCommentQuery, AdminListQuery, AdminPostQuery, in_range, search_matches,
};
use crate::models::category::{Category, NewCategory};
use crate::models::comment::{Comment, CommentView, NewComment};
use crate::models::location::{Location, NewLocation};
use crate::models::post::{
    AdminPostChanges, AuthorRef, CategoryRef, LocationRef, NewPost, Post, PostChanges, PostFilter,
    PostView,
};
use crate::models::user::{NewUser, ProfileChanges, User};
use crate::visibility;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    locations: Vec<Location>,
    categories: Vec<Category>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    last_id: i64,
}

/// Admin list order: case-insensitive, then by id.
fn by_name(a: &str, b: &str, a_id: i64, b_id: i64) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then(a_id.cmp(&b_id))
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn author_ref(&self, user_id: i64) -> AuthorRef {
        let username = self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        AuthorRef { id: user_id, username }
    }

    fn post_view(&self, post: &Post) -> PostView {
        let category = post.category_id.and_then(|id| {
            self.categories.iter().find(|c| c.id == id).map(|c| CategoryRef {
                id: c.id,
                title: c.title.clone(),
                slug: c.slug.clone(),
                is_published: c.is_published,
            })
        });
        let location = post.location_id.and_then(|id| {
            self.locations.iter().find(|l| l.id == id).map(|l| LocationRef {
                id: l.id,
                name: l.name.clone(),
                is_published: l.is_published,
            })
        });
        let comment_count = self.comments.iter().filter(|c| c.post_id == post.id).count() as i64;

        PostView {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: self.author_ref(post.author_id),
            category,
            location,
            image: post.image.clone(),
            is_published: post.is_published,
            created_at: post.created_at,
            comment_count,
        }
    }

    fn comment_view(&self, comment: &Comment) -> CommentView {
        CommentView {
            id: comment.id,
            text: comment.text.clone(),
            post_id: comment.post_id,
            author: self.author_ref(comment.author_id),
            is_published: comment.is_published,
            created_at: comment.created_at,
        }
    }

    fn check_post_refs(&self, location_id: Option<i64>, category_id: Option<i64>) -> RepoResult<()> {
        if let Some(id) = location_id {
            if !self.locations.iter().any(|l| l.id == id) {
                return Err(RepoError::MissingReference(format!("location {}", id)));
            }
        }
        if let Some(id) = category_id {
            if !self.categories.iter().any(|c| c.id == id) {
                return Err(RepoError::MissingReference(format!("category {}", id)));
            }
        }
        Ok(())
    }

    fn matching_posts(&self, filter: &PostFilter) -> Vec<PostView> {
        let mut views: Vec<PostView> = self
            .posts
            .iter()
            .map(|p| self.post_view(p))
            .filter(|p| visibility::matches(filter, p))
            .collect();
        views.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        views
    }
}

/// Keeps every table behind one lock so cascades stay atomic.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for MemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == new_user.username) {
            return Err(RepoError::Conflict("users_username_key".into()));
        }
        let user = User {
            id: t.next_id(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            first_name: String::new(),
            last_name: String::new(),
            email: new_user.email,
            is_staff: new_user.is_staff,
            date_joined: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<Option<User>> {
        let mut t = self.tables.write().await;
        Ok(t.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.first_name = changes.first_name;
            u.last_name = changes.last_name;
            u.email = changes.email;
            u.clone()
        }))
    }

    async fn create_location(&self, new_location: NewLocation) -> RepoResult<Location> {
        let mut t = self.tables.write().await;
        let location = Location {
            id: t.next_id(),
            name: new_location.name,
            is_published: new_location.is_published,
            created_at: Utc::now(),
        };
        t.locations.push(location.clone());
        Ok(location)
    }

    async fn find_location(&self, id: i64) -> RepoResult<Option<Location>> {
        let t = self.tables.read().await;
        Ok(t.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list_locations(&self, query: &AdminListQuery) -> RepoResult<Vec<Location>> {
        let t = self.tables.read().await;
        let mut out: Vec<Location> = t
            .locations
            .iter()
            .filter(|l| query.is_published.is_none_or(|p| l.is_published == p))
            .filter(|l| search_matches(query.q.as_deref(), &[l.name.as_str()]))
            .cloned()
            .collect();
        out.sort_by(|a, b| by_name(&a.name, &b.name, a.id, b.id));
        Ok(out)
    }

    async fn set_location_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Location>> {
        let mut t = self.tables.write().await;
        Ok(t.locations.iter_mut().find(|l| l.id == id).map(|l| {
            l.is_published = is_published;
            l.clone()
        }))
    }

    async fn delete_location(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.locations.len();
        t.locations.retain(|l| l.id != id);
        if t.locations.len() == before {
            return Ok(false);
        }
        for post in t.posts.iter_mut().filter(|p| p.location_id == Some(id)) {
            post.location_id = None;
        }
        Ok(true)
    }

    async fn create_category(&self, new_category: NewCategory) -> RepoResult<Category> {
        let mut t = self.tables.write().await;
        if t.categories.iter().any(|c| c.slug == new_category.slug) {
            return Err(RepoError::Conflict("categories_slug_key".into()));
        }
        let category = Category {
            id: t.next_id(),
            title: new_category.title,
            description: new_category.description,
            slug: new_category.slug,
            is_published: new_category.is_published,
            created_at: Utc::now(),
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list_categories(&self, query: &AdminListQuery) -> RepoResult<Vec<Category>> {
        let t = self.tables.read().await;
        let mut out: Vec<Category> = t
            .categories
            .iter()
            .filter(|c| query.is_published.is_none_or(|p| c.is_published == p))
            .filter(|c| search_matches(query.q.as_deref(), &[c.title.as_str(), c.slug.as_str()]))
            .cloned()
            .collect();
        out.sort_by(|a, b| by_name(&a.title, &b.title, a.id, b.id));
        Ok(out)
    }

    async fn set_category_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Category>> {
        let mut t = self.tables.write().await;
        Ok(t.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.is_published = is_published;
            c.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        if t.categories.len() == before {
            return Ok(false);
        }
        for post in t.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        Ok(true)
    }

    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == new_post.author_id) {
            return Err(RepoError::MissingReference(format!("user {}", new_post.author_id)));
        }
        t.check_post_refs(new_post.location_id, new_post.category_id)?;
        let post = Post {
            id: t.next_id(),
            title: new_post.title,
            text: new_post.text,
            pub_date: new_post.pub_date,
            author_id: new_post.author_id,
            location_id: new_post.location_id,
            category_id: new_post.category_id,
            image: new_post.image,
            is_published: new_post.is_published,
            created_at: Utc::now(),
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<PostView>> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == id).map(|p| t.post_view(p)))
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let mut t = self.tables.write().await;
        t.check_post_refs(changes.location_id, changes.category_id)?;
        Ok(t.posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.title = changes.title;
            p.text = changes.text;
            p.pub_date = changes.pub_date;
            p.location_id = changes.location_id;
            p.category_id = changes.category_id;
            if let Some(image) = changes.image {
                p.image = Some(image);
            }
            p.is_published = changes.is_published;
            p.clone()
        }))
    }

    async fn update_post_admin(&self, id: i64, changes: AdminPostChanges) -> RepoResult<Option<Post>> {
        let mut t = self.tables.write().await;
        t.check_post_refs(changes.location_id.flatten(), changes.category_id.flatten())?;
        Ok(t.posts.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(is_published) = changes.is_published {
                p.is_published = is_published;
            }
            if let Some(category_id) = changes.category_id {
                p.category_id = category_id;
            }
            if let Some(location_id) = changes.location_id {
                p.location_id = location_id;
            }
            p.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != id);
        if t.posts.len() == before {
            return Ok(false);
        }
        t.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<u64> {
        let t = self.tables.read().await;
        Ok(t.matching_posts(filter).len() as u64)
    }

    async fn list_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> RepoResult<Vec<PostView>> {
        let t = self.tables.read().await;
        Ok(t.matching_posts(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn admin_list_posts(&self, query: &AdminPostQuery) -> RepoResult<Vec<PostView>> {
        let t = self.tables.read().await;
        let mut out: Vec<PostView> = t
            .posts
            .iter()
            .filter(|p| query.is_published.is_none_or(|v| p.is_published == v))
            .filter(|p| query.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| query.location_id.is_none_or(|id| p.location_id == Some(id)))
            .filter(|p| in_range(p.pub_date, query.pub_date_from, query.pub_date_to))
            .filter(|p| search_matches(query.q.as_deref(), &[p.title.as_str(), p.text.as_str()]))
            .map(|p| t.post_view(p))
            .collect();
        out.sort_by(|a, b| by_name(&a.title, &b.title, a.id, b.id));
        Ok(out)
    }

    async fn create_comment(&self, new_comment: NewComment) -> RepoResult<Comment> {
        let mut t = self.tables.write().await;
        if !t.posts.iter().any(|p| p.id == new_comment.post_id) {
            return Err(RepoError::MissingReference(format!("post {}", new_comment.post_id)));
        }
        if !t.users.iter().any(|u| u.id == new_comment.author_id) {
            return Err(RepoError::MissingReference(format!("user {}", new_comment.author_id)));
        }
        let comment = Comment {
            id: t.next_id(),
            text: new_comment.text,
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            is_published: true,
            created_at: Utc::now(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>> {
        let mut t = self.tables.write().await;
        Ok(t.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.text = text;
            c.clone()
        }))
    }

    async fn set_comment_published(&self, id: i64, is_published: bool) -> RepoResult<Option<Comment>> {
        let mut t = self.tables.write().await;
        Ok(t.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.is_published = is_published;
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.comments.len();
        t.comments.retain(|c| c.id != id);
        Ok(t.comments.len() != before)
    }

    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<CommentView>> {
        let t = self.tables.read().await;
        let mut out: Vec<CommentView> = t
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| t.comment_view(c))
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn admin_list_comments(&self, query: &AdminCommentQuery) -> RepoResult<Vec<CommentView>> {
        let t = self.tables.read().await;
        let mut out: Vec<CommentView> = t
            .comments
            .iter()
            .filter(|c| query.is_published.is_none_or(|p| c.is_published == p))
            .filter(|c| in_range(c.created_at, query.created_from, query.created_to))
            .filter(|c| search_matches(query.q.as_deref(), &[c.text.as_str()]))
            .map(|c| t.comment_view(c))
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seed_user(repo: &MemoryRepository, username: &str) -> User {
        repo.create_user(NewUser {
            username: username.into(),
            password_hash: "hash".into(),
            email: String::new(),
            is_staff: false,
        })
        .await
        .unwrap()
    }

    async fn seed_category(repo: &MemoryRepository, slug: &str, is_published: bool) -> Category {
        repo.create_category(NewCategory {
            title: slug.to_uppercase(),
            description: String::new(),
            slug: slug.into(),
            is_published,
        })
        .await
        .unwrap()
    }

    fn new_post(author_id: i64, category_id: Option<i64>, title: &str) -> NewPost {
        NewPost {
            title: title.into(),
            text: "text".into(),
            pub_date: Utc::now() - Duration::hours(1),
            author_id,
            location_id: None,
            category_id,
            image: None,
            is_published: true,
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let repo = MemoryRepository::new();
        seed_user(&repo, "anna").await;
        let err = repo
            .create_user(NewUser {
                username: "anna".into(),
                password_hash: "x".into(),
                email: String::new(),
                is_staff: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_post_cascades_to_comments() {
        let repo = MemoryRepository::new();
        let user = seed_user(&repo, "anna").await;
        let post = repo.create_post(new_post(user.id, None, "p")).await.unwrap();
        repo.create_comment(NewComment {
            text: "hi".into(),
            post_id: post.id,
            author_id: user.id,
        })
        .await
        .unwrap();

        assert!(repo.delete_post(post.id).await.unwrap());
        assert!(repo.list_comments(post.id).await.unwrap().is_empty());
        assert!(repo.admin_list_comments(&AdminCommentQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_category_nulls_post_reference() {
        let repo = MemoryRepository::new();
        let user = seed_user(&repo, "anna").await;
        let category = seed_category(&repo, "travel", true).await;
        let post = repo.create_post(new_post(user.id, Some(category.id), "p")).await.unwrap();

        assert!(repo.delete_category(category.id).await.unwrap());
        let view = repo.find_post(post.id).await.unwrap().unwrap();
        assert!(view.category.is_none());
    }

    #[tokio::test]
    async fn listing_applies_visibility_and_order() {
        let repo = MemoryRepository::new();
        let anna = seed_user(&repo, "anna").await;
        let bob = seed_user(&repo, "bob").await;
        let open = seed_category(&repo, "open", true).await;
        let hidden = seed_category(&repo, "hidden", false).await;

        let mut older = new_post(anna.id, Some(open.id), "older");
        older.pub_date = Utc::now() - Duration::days(2);
        repo.create_post(older).await.unwrap();
        repo.create_post(new_post(anna.id, Some(open.id), "newer")).await.unwrap();
        repo.create_post(new_post(anna.id, Some(hidden.id), "in hidden category")).await.unwrap();
        let mut draft = new_post(bob.id, Some(open.id), "draft");
        draft.is_published = false;
        repo.create_post(draft).await.unwrap();

        let anonymous = PostFilter::new(None, Utc::now());
        let titles: Vec<String> = repo
            .list_posts(&anonymous, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);

        let as_bob = PostFilter::new(Some(bob.id), Utc::now());
        assert_eq!(repo.count_posts(&as_bob).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn comment_count_is_reported() {
        let repo = MemoryRepository::new();
        let user = seed_user(&repo, "anna").await;
        let post = repo.create_post(new_post(user.id, None, "p")).await.unwrap();
        for text in ["one", "two"] {
            repo.create_comment(NewComment {
                text: text.into(),
                post_id: post.id,
                author_id: user.id,
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.find_post(post.id).await.unwrap().unwrap().comment_count, 2);
    }

    #[tokio::test]
    async fn post_with_unknown_category_is_rejected() {
        let repo = MemoryRepository::new();
        let user = seed_user(&repo, "anna").await;
        let err = repo.create_post(new_post(user.id, Some(999), "p")).await.unwrap_err();
        assert!(matches!(err, RepoError::MissingReference(_)));
    }
}
