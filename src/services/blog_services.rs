// src/services/blog_services.rs - listings, post detail and the author-only mutations

use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::authorization::ensure_author;
use crate::dtos::comment_dtos::CommentForm;
use crate::dtos::post_dtos::{CategoryPostsOut, PostDetailOut, PostForm};
use crate::dtos::profile_dtos::ProfileOut;
use crate::errors::ServiceError;
use crate::models::comment::{Comment, NewComment};
use crate::models::post::{NewPost, Post, PostChanges, PostFilter, PostView};
use crate::models::user::UserPublic;
use crate::pagination::{self, PER_PAGE, Page};
use crate::repositories::BlogRepository;
use crate::services::media_services::MediaStore;
use crate::services::validation;
use crate::visibility;

/// Post form fields after validation.
struct CleanPost {
    title: String,
    text: String,
    location_id: Option<i64>,
    category_id: Option<i64>,
}

pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    media: MediaStore,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>, media: MediaStore) -> Self {
        Self { repo, media }
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    async fn page_of(&self, filter: PostFilter, page: Option<&str>) -> Result<Page<PostView>, ServiceError> {
        let count = self.repo.count_posts(&filter).await?;
        let window = pagination::resolve(page, count, PER_PAGE)?;
        let items = self.repo.list_posts(&filter, window.limit, window.offset).await?;
        Ok(Page::new(items, window, count))
    }

    /// Front page: every post the viewer may see, newest first.
    pub async fn index(&self, viewer: Option<i64>, page: Option<&str>) -> Result<Page<PostView>, ServiceError> {
        self.page_of(PostFilter::new(viewer, Utc::now()), page).await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        viewer: Option<i64>,
        page: Option<&str>,
    ) -> Result<CategoryPostsOut, ServiceError> {
        let category = self
            .repo
            .find_category_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or(ServiceError::NotFound("category"))?;
        let filter = PostFilter::new(viewer, Utc::now()).in_category(category.id);
        let posts = self.page_of(filter, page).await?;
        Ok(CategoryPostsOut { category, posts })
    }

    /// The owner sees all of their posts, everyone else only the public ones.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<i64>,
        page: Option<&str>,
    ) -> Result<ProfileOut, ServiceError> {
        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        let filter = PostFilter::new(viewer, Utc::now()).by_author(user.id);
        let posts = self.page_of(filter, page).await?;
        let email = (viewer == Some(user.id)).then(|| user.email.clone());
        Ok(ProfileOut {
            profile: UserPublic::from(&user),
            email,
            posts,
        })
    }

    pub async fn post_detail(&self, post_id: i64, viewer: Option<i64>) -> Result<PostDetailOut, ServiceError> {
        let post = self.visible_post(post_id, viewer).await?;
        let comments = self.repo.list_comments(post.id).await?;
        Ok(PostDetailOut { post, comments })
    }

    async fn visible_post(&self, post_id: i64, viewer: Option<i64>) -> Result<PostView, ServiceError> {
        self.repo
            .find_post(post_id)
            .await?
            .filter(|p| visibility::is_visible_to(p, viewer, Utc::now()))
            .ok_or(ServiceError::NotFound("post"))
    }

    async fn clean_post_form(&self, form: &PostForm) -> Result<CleanPost, ServiceError> {
        let title = validation::title(&form.title)?;
        let text = validation::required("text", &form.text)?.to_string();
        if let Some(id) = form.category_id {
            if self.repo.find_category(id).await?.is_none() {
                return Err(ServiceError::Validation(format!("category {} does not exist", id)));
            }
        }
        if let Some(id) = form.location_id {
            if self.repo.find_location(id).await?.is_none() {
                return Err(ServiceError::Validation(format!("location {} does not exist", id)));
            }
        }
        Ok(CleanPost {
            title,
            text,
            location_id: form.location_id,
            category_id: form.category_id,
        })
    }

    pub async fn create_post(&self, author_id: i64, form: PostForm) -> Result<Post, ServiceError> {
        let clean = self.clean_post_form(&form).await?;
        let image = match &form.image {
            Some(upload) => Some(self.media.save_post_image(upload).await?),
            None => None,
        };

        let created = self
            .repo
            .create_post(NewPost {
                title: clean.title,
                text: clean.text,
                pub_date: form.pub_date,
                author_id,
                location_id: clean.location_id,
                category_id: clean.category_id,
                image: image.clone(),
                is_published: form.is_published,
            })
            .await;

        match created {
            Ok(post) => {
                info!("user {} created post {}", author_id, post.id);
                Ok(post)
            }
            Err(e) => {
                if let Some(path) = image {
                    self.media.remove(&path).await;
                }
                Err(e.into())
            }
        }
    }

    async fn owned_post(&self, user_id: i64, post_id: i64) -> Result<PostView, ServiceError> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or(ServiceError::NotFound("post"))?;
        ensure_author(user_id, post.author.id)?;
        Ok(post)
    }

    pub async fn edit_post(&self, user_id: i64, post_id: i64, form: PostForm) -> Result<Post, ServiceError> {
        let existing = self.owned_post(user_id, post_id).await?;
        let clean = self.clean_post_form(&form).await?;
        let image = match &form.image {
            Some(upload) => Some(self.media.save_post_image(upload).await?),
            None => None,
        };

        let updated = self
            .repo
            .update_post(
                post_id,
                PostChanges {
                    title: clean.title,
                    text: clean.text,
                    pub_date: form.pub_date,
                    location_id: clean.location_id,
                    category_id: clean.category_id,
                    image: image.clone(),
                    is_published: form.is_published,
                },
            )
            .await;
        let updated = match updated {
            Ok(Some(post)) => post,
            failed => {
                if let Some(path) = image.as_deref() {
                    self.media.remove(path).await;
                }
                return Err(match failed {
                    Err(e) => e.into(),
                    Ok(_) => ServiceError::NotFound("post"),
                });
            }
        };

        if image.is_some() {
            if let Some(old) = existing.image.as_deref() {
                self.media.remove(old).await;
            }
        }
        info!("user {} edited post {}", user_id, post_id);
        Ok(updated)
    }

    pub async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<(), ServiceError> {
        let post = self.owned_post(user_id, post_id).await?;
        if !self.repo.delete_post(post_id).await? {
            return Err(ServiceError::NotFound("post"));
        }
        if let Some(image) = post.image.as_deref() {
            self.media.remove(image).await;
        }
        info!("user {} deleted post {}", user_id, post_id);
        Ok(())
    }

    pub async fn add_comment(&self, user_id: i64, post_id: i64, form: CommentForm) -> Result<Comment, ServiceError> {
        let post = self.visible_post(post_id, Some(user_id)).await?;
        let text = validation::required("text", &form.text)?.to_string();
        let comment = self
            .repo
            .create_comment(NewComment {
                text,
                post_id: post.id,
                author_id: user_id,
            })
            .await?;
        info!("user {} commented on post {}", user_id, post_id);
        Ok(comment)
    }

    /// The comment must belong to `post_id` and to the requesting user.
    async fn owned_comment(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<Comment, ServiceError> {
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or(ServiceError::NotFound("comment"))?;
        ensure_author(user_id, comment.author_id)?;
        Ok(comment)
    }

    pub async fn comment_for_edit(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<Comment, ServiceError> {
        self.owned_comment(user_id, post_id, comment_id).await
    }

    pub async fn edit_comment(
        &self,
        user_id: i64,
        post_id: i64,
        comment_id: i64,
        form: CommentForm,
    ) -> Result<Comment, ServiceError> {
        self.owned_comment(user_id, post_id, comment_id).await?;
        let text = validation::required("text", &form.text)?.to_string();
        self.repo
            .update_comment_text(comment_id, text)
            .await?
            .ok_or(ServiceError::NotFound("comment"))
    }

    pub async fn delete_comment(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<(), ServiceError> {
        self.owned_comment(user_id, post_id, comment_id).await?;
        if !self.repo.delete_comment(comment_id).await? {
            return Err(ServiceError::NotFound("comment"));
        }
        info!("user {} deleted comment {}", user_id, comment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::post_dtos::ImageUpload;
    use crate::models::category::NewCategory;
    use crate::models::user::NewUser;
    use crate::pagination::PageError;
    use crate::repositories::memory_repository::MemoryRepository;
    use base64::{engine::general_purpose, Engine as _};
    use chrono::{DateTime, Duration};

    struct Fixture {
        repo: Arc<MemoryRepository>,
        service: BlogService,
        anna: i64,
        bob: i64,
        category: i64,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(MemoryRepository::new());
        let mut ids = Vec::new();
        for username in ["anna", "bob"] {
            let user = repo
                .create_user(NewUser {
                    username: username.into(),
                    password_hash: "hash".into(),
                    email: format!("{}@example.com", username),
                    is_staff: false,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let category = repo
            .create_category(NewCategory {
                title: "Travel".into(),
                description: "Trips".into(),
                slug: "travel".into(),
                is_published: true,
            })
            .await
            .unwrap();
        let media = MediaStore::new(std::env::temp_dir().join("blogicum-service-tests"));
        Fixture {
            service: BlogService::new(repo.clone(), media),
            repo,
            anna: ids[0],
            bob: ids[1],
            category: category.id,
        }
    }

    fn form(title: &str, category_id: Option<i64>, pub_date: DateTime<Utc>) -> PostForm {
        PostForm {
            title: title.into(),
            text: "Some text".into(),
            pub_date,
            location_id: None,
            category_id,
            is_published: true,
            image: None,
        }
    }

    fn past() -> DateTime<Utc> {
        Utc::now() - Duration::hours(1)
    }

    #[tokio::test]
    async fn index_paginates_ten_per_page() {
        let f = fixture().await;
        for i in 0..12 {
            f.service
                .create_post(f.anna, form(&format!("post {}", i), Some(f.category), past()))
                .await
                .unwrap();
        }
        let first = f.service.index(None, None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.count, 12);
        assert!(first.has_next);

        let second = f.service.index(None, Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(matches!(
            f.service.index(None, Some("3")).await,
            Err(ServiceError::InvalidPage(PageError::Empty))
        ));
    }

    #[tokio::test]
    async fn future_post_visible_only_to_author() {
        let f = fixture().await;
        let post = f
            .service
            .create_post(f.anna, form("later", Some(f.category), Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        assert!(f.service.post_detail(post.id, Some(f.anna)).await.is_ok());
        assert!(matches!(
            f.service.post_detail(post.id, Some(f.bob)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(f.service.index(None, None).await.unwrap().count, 0);
        assert_eq!(f.service.index(Some(f.anna), None).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn unpublished_category_listing_is_not_found() {
        let f = fixture().await;
        f.repo.set_category_published(f.category, false).await.unwrap();
        assert!(matches!(
            f.service.category_posts("travel", None, None).await,
            Err(ServiceError::NotFound("category"))
        ));
        assert!(matches!(
            f.service.category_posts("missing", None, None).await,
            Err(ServiceError::NotFound("category"))
        ));
    }

    #[tokio::test]
    async fn profile_shows_hidden_posts_to_owner_only() {
        let f = fixture().await;
        let mut draft = form("draft", Some(f.category), past());
        draft.is_published = false;
        f.service.create_post(f.anna, draft).await.unwrap();
        f.service.create_post(f.anna, form("public", Some(f.category), past())).await.unwrap();

        let own = f.service.profile("anna", Some(f.anna), None).await.unwrap();
        assert_eq!(own.posts.count, 2);
        assert_eq!(own.email.as_deref(), Some("anna@example.com"));

        let other = f.service.profile("anna", Some(f.bob), None).await.unwrap();
        assert_eq!(other.posts.count, 1);
        assert!(other.email.is_none());

        assert!(matches!(
            f.service.profile("nobody", None, None).await,
            Err(ServiceError::NotFound("user"))
        ));
    }

    #[tokio::test]
    async fn only_author_edits_and_deletes_post() {
        let f = fixture().await;
        let post = f
            .service
            .create_post(f.anna, form("mine", Some(f.category), past()))
            .await
            .unwrap();

        assert!(matches!(
            f.service.edit_post(f.bob, post.id, form("stolen", None, past())).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete_post(f.bob, post.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        let edited = f
            .service
            .edit_post(f.anna, post.id, form("renamed", Some(f.category), past()))
            .await
            .unwrap();
        assert_eq!(edited.title, "renamed");

        f.service.delete_post(f.anna, post.id).await.unwrap();
        assert!(f.repo.find_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let f = fixture().await;
        assert!(matches!(
            f.service.create_post(f.anna, form("p", Some(999), past())).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn comment_ownership_and_post_scope() {
        let f = fixture().await;
        let first = f
            .service
            .create_post(f.anna, form("first", Some(f.category), past()))
            .await
            .unwrap();
        let second = f
            .service
            .create_post(f.anna, form("second", Some(f.category), past()))
            .await
            .unwrap();
        let comment = f
            .service
            .add_comment(f.bob, first.id, CommentForm { text: "nice".into() })
            .await
            .unwrap();

        assert!(matches!(
            f.service
                .edit_comment(f.anna, first.id, comment.id, CommentForm { text: "x".into() })
                .await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete_comment(f.bob, second.id, comment.id).await,
            Err(ServiceError::NotFound("comment"))
        ));

        let edited = f
            .service
            .edit_comment(f.bob, first.id, comment.id, CommentForm { text: "very nice".into() })
            .await
            .unwrap();
        assert_eq!(edited.text, "very nice");

        let detail = f.service.post_detail(first.id, None).await.unwrap();
        assert_eq!(detail.post.comment_count, 1);
        assert_eq!(detail.comments[0].author.username, "bob");

        f.service.delete_comment(f.bob, first.id, comment.id).await.unwrap();
        assert!(f.repo.find_comment(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cannot_comment_on_hidden_post() {
        let f = fixture().await;
        let mut draft = form("draft", Some(f.category), past());
        draft.is_published = false;
        let post = f.service.create_post(f.anna, draft).await.unwrap();

        assert!(matches!(
            f.service
                .add_comment(f.bob, post.id, CommentForm { text: "hi".into() })
                .await,
            Err(ServiceError::NotFound("post"))
        ));
        assert!(f
            .service
            .add_comment(f.anna, post.id, CommentForm { text: "note to self".into() })
            .await
            .is_ok());
    }

    fn png(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            data: general_purpose::STANDARD.encode(bytes),
            content_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn edit_keeps_image_unless_a_new_one_is_sent() {
        let f = fixture().await;
        let mut with_image = form("pic", Some(f.category), past());
        with_image.image = Some(png(b"first"));
        let post = f.service.create_post(f.anna, with_image).await.unwrap();
        let first = post.image.clone().unwrap();
        assert!(first.starts_with("post_images/"));

        let kept = f
            .service
            .edit_post(f.anna, post.id, form("pic renamed", Some(f.category), past()))
            .await
            .unwrap();
        assert_eq!(kept.image.as_deref(), Some(first.as_str()));
        assert!(f.service.media().read(&first).await.unwrap().is_some());

        let mut replacement = form("pic again", Some(f.category), past());
        replacement.image = Some(png(b"second"));
        let replaced = f.service.edit_post(f.anna, post.id, replacement).await.unwrap();
        let second = replaced.image.clone().unwrap();
        assert_ne!(second, first);
        assert!(f.service.media().read(&first).await.unwrap().is_none());
        assert_eq!(f.service.media().read(&second).await.unwrap().unwrap(), b"second");

        f.service.delete_post(f.anna, post.id).await.unwrap();
        assert!(f.service.media().read(&second).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_edit_stores_no_image() {
        let f = fixture().await;
        let post = f
            .service
            .create_post(f.anna, form("plain", Some(f.category), past()))
            .await
            .unwrap();
        let mut bad = form("plain", Some(999), past());
        bad.image = Some(png(b"never stored"));
        assert!(matches!(
            f.service.edit_post(f.anna, post.id, bad).await,
            Err(ServiceError::Validation(_))
        ));
        let stored = f.repo.find_post(post.id).await.unwrap().unwrap();
        assert!(stored.image.is_none());
    }
}
