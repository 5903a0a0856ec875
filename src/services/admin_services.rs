// src/services/admin_services.rs - staff-only management of all four models

use std::sync::Arc;

use log::info;

use crate::authorization::ensure_staff;
use crate::dtos::admin_dtos::{
    AdminCommentQuery, AdminListQuery, AdminPostPatch, AdminPostQuery, CategoryIn, LocationIn,
};
use crate::errors::ServiceError;
use crate::models::category::{Category, NewCategory};
use crate::models::comment::{Comment, CommentView};
use crate::models::location::{Location, NewLocation};
use crate::models::post::{AdminPostChanges, Post, PostView};
use crate::repositories::{BlogRepository, RepoError};
use crate::services::media_services::MediaStore;
use crate::services::validation;

pub struct AdminService {
    repo: Arc<dyn BlogRepository>,
    media: MediaStore,
}

impl AdminService {
    pub fn new(repo: Arc<dyn BlogRepository>, media: MediaStore) -> Self {
        Self { repo, media }
    }

    async fn staff(&self, user_id: i64) -> Result<(), ServiceError> {
        let user = self.repo.find_user(user_id).await?;
        ensure_staff(user.as_ref())
    }

    pub async fn list_locations(&self, user_id: i64, query: AdminListQuery) -> Result<Vec<Location>, ServiceError> {
        self.staff(user_id).await?;
        Ok(self.repo.list_locations(&query).await?)
    }

    pub async fn create_location(&self, user_id: i64, input: LocationIn) -> Result<Location, ServiceError> {
        self.staff(user_id).await?;
        let name = validation::required("name", &input.name)?.to_string();
        validation::max_chars("name", &name, validation::TITLE_MAX)?;
        let location = self
            .repo
            .create_location(NewLocation {
                name,
                is_published: input.is_published,
            })
            .await?;
        info!("staff {} created location {}", user_id, location.id);
        Ok(location)
    }

    pub async fn set_location_published(
        &self,
        user_id: i64,
        id: i64,
        is_published: bool,
    ) -> Result<Location, ServiceError> {
        self.staff(user_id).await?;
        self.repo
            .set_location_published(id, is_published)
            .await?
            .ok_or(ServiceError::NotFound("location"))
    }

    pub async fn delete_location(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        self.staff(user_id).await?;
        if !self.repo.delete_location(id).await? {
            return Err(ServiceError::NotFound("location"));
        }
        info!("staff {} deleted location {}", user_id, id);
        Ok(())
    }

    pub async fn list_categories(&self, user_id: i64, query: AdminListQuery) -> Result<Vec<Category>, ServiceError> {
        self.staff(user_id).await?;
        Ok(self.repo.list_categories(&query).await?)
    }

    pub async fn create_category(&self, user_id: i64, input: CategoryIn) -> Result<Category, ServiceError> {
        self.staff(user_id).await?;
        let title = validation::title(&input.title)?;
        let description = validation::required("description", &input.description)?.to_string();
        let slug = validation::slug(&input.slug)?;
        let category = self
            .repo
            .create_category(NewCategory {
                title,
                description,
                slug,
                is_published: input.is_published,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict(_) => {
                    ServiceError::Conflict("a category with this slug already exists".to_string())
                }
                other => other.into(),
            })?;
        info!("staff {} created category {}", user_id, category.slug);
        Ok(category)
    }

    pub async fn set_category_published(
        &self,
        user_id: i64,
        id: i64,
        is_published: bool,
    ) -> Result<Category, ServiceError> {
        self.staff(user_id).await?;
        self.repo
            .set_category_published(id, is_published)
            .await?
            .ok_or(ServiceError::NotFound("category"))
    }

    pub async fn delete_category(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        self.staff(user_id).await?;
        if !self.repo.delete_category(id).await? {
            return Err(ServiceError::NotFound("category"));
        }
        info!("staff {} deleted category {}", user_id, id);
        Ok(())
    }

    pub async fn list_posts(&self, user_id: i64, query: AdminPostQuery) -> Result<Vec<PostView>, ServiceError> {
        self.staff(user_id).await?;
        Ok(self.repo.admin_list_posts(&query).await?)
    }

    pub async fn patch_post(&self, user_id: i64, id: i64, patch: AdminPostPatch) -> Result<Post, ServiceError> {
        self.staff(user_id).await?;
        self.repo
            .update_post_admin(
                id,
                AdminPostChanges {
                    is_published: patch.is_published,
                    category_id: patch.category_id,
                    location_id: patch.location_id,
                },
            )
            .await?
            .ok_or(ServiceError::NotFound("post"))
    }

    pub async fn delete_post(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        self.staff(user_id).await?;
        let post = self.repo.find_post(id).await?.ok_or(ServiceError::NotFound("post"))?;
        if !self.repo.delete_post(id).await? {
            return Err(ServiceError::NotFound("post"));
        }
        if let Some(image) = post.image.as_deref() {
            self.media.remove(image).await;
        }
        info!("staff {} deleted post {}", user_id, id);
        Ok(())
    }

    pub async fn list_comments(&self, user_id: i64, query: AdminCommentQuery) -> Result<Vec<CommentView>, ServiceError> {
        self.staff(user_id).await?;
        Ok(self.repo.admin_list_comments(&query).await?)
    }

    pub async fn set_comment_published(
        &self,
        user_id: i64,
        id: i64,
        is_published: bool,
    ) -> Result<Comment, ServiceError> {
        self.staff(user_id).await?;
        self.repo
            .set_comment_published(id, is_published)
            .await?
            .ok_or(ServiceError::NotFound("comment"))
    }

    pub async fn delete_comment(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        self.staff(user_id).await?;
        if !self.repo.delete_comment(id).await? {
            return Err(ServiceError::NotFound("comment"));
        }
        info!("staff {} deleted comment {}", user_id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::post_dtos::ImageUpload;
    use crate::models::post::NewPost;
    use crate::models::user::NewUser;
    use crate::repositories::memory_repository::MemoryRepository;
    use base64::{engine::general_purpose, Engine as _};
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    async fn setup_with_repo() -> (AdminService, Arc<MemoryRepository>, i64, i64) {
        let repo = Arc::new(MemoryRepository::new());
        let mut ids = Vec::new();
        for (username, is_staff) in [("root", true), ("anna", false)] {
            let user = repo
                .create_user(NewUser {
                    username: username.into(),
                    password_hash: "hash".into(),
                    email: String::new(),
                    is_staff,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let media = MediaStore::new(std::env::temp_dir().join(format!("blogicum-admin-{}", Uuid::new_v4())));
        (AdminService::new(repo.clone(), media), repo, ids[0], ids[1])
    }

    async fn setup() -> (AdminService, i64, i64) {
        let (admin, _, root, anna) = setup_with_repo().await;
        (admin, root, anna)
    }

    fn new_post(title: &str, author_id: i64, category_id: Option<i64>, pub_date: DateTime<Utc>) -> NewPost {
        NewPost {
            title: title.into(),
            text: "text".into(),
            pub_date,
            author_id,
            location_id: None,
            category_id,
            image: None,
            is_published: true,
        }
    }

    fn category_in(slug: &str) -> CategoryIn {
        CategoryIn {
            title: "Travel".into(),
            description: "Trips and notes".into(),
            slug: slug.into(),
            is_published: true,
        }
    }

    #[tokio::test]
    async fn non_staff_is_forbidden() {
        let (admin, _, anna) = setup().await;
        assert!(matches!(
            admin.list_locations(anna, AdminListQuery::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn category_slug_must_be_unique_and_valid() {
        let (admin, root, _) = setup().await;
        admin.create_category(root, category_in("travel")).await.unwrap();
        assert!(matches!(
            admin.create_category(root, category_in("travel")).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            admin.create_category(root, category_in("bad slug")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn locations_are_searchable_and_filterable() {
        let (admin, root, _) = setup().await;
        for (name, is_published) in [("Moscow", true), ("Murmansk", false), ("Kazan", true)] {
            admin
                .create_location(
                    root,
                    LocationIn {
                        name: name.into(),
                        is_published,
                    },
                )
                .await
                .unwrap();
        }
        let names = |v: Vec<Location>| v.into_iter().map(|l| l.name).collect::<Vec<_>>();

        let all = admin.list_locations(root, AdminListQuery::default()).await.unwrap();
        assert_eq!(names(all), vec!["Kazan", "Moscow", "Murmansk"]);

        let found = admin
            .list_locations(
                root,
                AdminListQuery {
                    q: Some("mu".into()),
                    is_published: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(names(found), vec!["Murmansk"]);

        let published = admin
            .list_locations(
                root,
                AdminListQuery {
                    q: None,
                    is_published: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(names(published), vec!["Kazan", "Moscow"]);
    }

    #[tokio::test]
    async fn toggling_missing_rows_is_not_found() {
        let (admin, root, _) = setup().await;
        assert!(matches!(
            admin.set_category_published(root, 404, false).await,
            Err(ServiceError::NotFound("category"))
        ));
        assert!(matches!(
            admin.delete_comment(root, 404).await,
            Err(ServiceError::NotFound("comment"))
        ));
    }

    #[tokio::test]
    async fn patch_post_clears_and_validates_references() {
        let (admin, repo, root, anna) = setup_with_repo().await;
        let category = admin.create_category(root, category_in("travel")).await.unwrap();
        let post = repo
            .create_post(new_post("trip", anna, Some(category.id), Utc::now()))
            .await
            .unwrap();

        let cleared = admin
            .patch_post(
                root,
                post.id,
                AdminPostPatch {
                    category_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.category_id, None);
        assert!(cleared.is_published);

        assert!(matches!(
            admin
                .patch_post(
                    root,
                    post.id,
                    AdminPostPatch {
                        category_id: Some(Some(999)),
                        ..Default::default()
                    },
                )
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            admin.patch_post(root, 999, AdminPostPatch::default()).await,
            Err(ServiceError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_image() {
        let (admin, repo, root, anna) = setup_with_repo().await;
        let upload = ImageUpload {
            data: general_purpose::STANDARD.encode(b"gif-bytes"),
            content_type: "image/gif".into(),
        };
        let path = admin.media.save_post_image(&upload).await.unwrap();
        let mut with_image = new_post("pic", anna, None, Utc::now());
        with_image.image = Some(path.clone());
        let post = repo.create_post(with_image).await.unwrap();

        admin.delete_post(root, post.id).await.unwrap();
        assert!(admin.media.read(&path).await.unwrap().is_none());
        assert!(matches!(
            admin.delete_post(root, post.id).await,
            Err(ServiceError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn posts_filter_by_pub_date_and_sort_ignoring_case() {
        let (admin, repo, root, anna) = setup_with_repo().await;
        let may = |d: u32| Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap();
        for (title, day) in [("beta", 1), ("Alpha", 10), ("gamma", 20)] {
            repo.create_post(new_post(title, anna, None, may(day))).await.unwrap();
        }
        let titles = |v: Vec<PostView>| v.into_iter().map(|p| p.title).collect::<Vec<_>>();

        let all = admin.list_posts(root, AdminPostQuery::default()).await.unwrap();
        assert_eq!(titles(all), vec!["Alpha", "beta", "gamma"]);

        let window = admin
            .list_posts(
                root,
                AdminPostQuery {
                    pub_date_from: Some(may(1)),
                    pub_date_to: Some(may(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(titles(window), vec!["Alpha", "beta"]);
    }

    #[tokio::test]
    async fn comments_filter_by_creation_date() {
        let (admin, repo, root, anna) = setup_with_repo().await;
        let post = repo.create_post(new_post("trip", anna, None, Utc::now())).await.unwrap();
        repo.create_comment(crate::models::comment::NewComment {
            text: "first".into(),
            post_id: post.id,
            author_id: anna,
        })
        .await
        .unwrap();

        let recent = admin
            .list_comments(
                root,
                AdminCommentQuery {
                    created_from: Some(Utc::now() - chrono::Duration::hours(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);

        let old = admin
            .list_comments(
                root,
                AdminCommentQuery {
                    created_to: Some(Utc::now() - chrono::Duration::hours(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(old.is_empty());
    }
}
