// src/services/account_services.rs - registration, login and profile edits

use std::sync::Arc;

use log::{info, warn};

use crate::dtos::auth_dtos::{LoginIn, LoginResponse, RegisterIn};
use crate::dtos::profile_dtos::ProfileEditIn;
use crate::errors::ServiceError;
use crate::models::user::{NewUser, ProfileChanges, UserPublic};
use crate::repositories::{BlogRepository, RepoError};
use crate::services::auth_services::AuthService;
use crate::services::validation;

pub struct AccountService {
    repo: Arc<dyn BlogRepository>,
    auth: AuthService,
}

impl AccountService {
    pub fn new(repo: Arc<dyn BlogRepository>, auth: AuthService) -> Self {
        Self { repo, auth }
    }

    pub async fn register(&self, input: RegisterIn) -> Result<UserPublic, ServiceError> {
        let username = validation::username(&input.username)?;
        validation::new_password(&username, &input.password1, &input.password2)?;
        let email = validation::email(&input.email)?;

        let password_hash = self.auth.hash_password(&input.password1).await?;
        let user = self
            .repo
            .create_user(NewUser {
                username,
                password_hash,
                email,
                is_staff: false,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict(_) => {
                    ServiceError::Conflict("a user with that username already exists".to_string())
                }
                other => other.into(),
            })?;

        info!("registered user {} ({})", user.username, user.id);
        Ok(UserPublic::from(&user))
    }

    pub async fn login(&self, input: LoginIn) -> Result<LoginResponse, ServiceError> {
        let user = self
            .repo
            .find_user_by_username(input.username.trim())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;
        if !self.auth.verify_password(&user.password_hash, &input.password).await? {
            warn!("failed login for {}", user.username);
            return Err(ServiceError::InvalidCredentials);
        }
        let session = self.auth.issue_token(user.id)?;
        Ok(LoginResponse {
            session,
            user: UserPublic::from(&user),
        })
    }

    pub async fn edit_profile(&self, user_id: i64, input: ProfileEditIn) -> Result<UserPublic, ServiceError> {
        let first_name = input.first_name.trim().to_string();
        let last_name = input.last_name.trim().to_string();
        validation::max_chars("first_name", &first_name, validation::USERNAME_MAX)?;
        validation::max_chars("last_name", &last_name, validation::USERNAME_MAX)?;
        let email = validation::email(&input.email)?;

        let user = self
            .repo
            .update_user_profile(
                user_id,
                ProfileChanges {
                    first_name,
                    last_name,
                    email,
                },
            )
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        Ok(UserPublic::from(&user))
    }

    /// Creates the configured staff account on first start. Existing users are left alone.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<(), ServiceError> {
        if self.repo.find_user_by_username(username).await?.is_some() {
            return Ok(());
        }
        let username = validation::username(username)?;
        let password_hash = self.auth.hash_password(password).await?;
        self.repo
            .create_user(NewUser {
                username: username.clone(),
                password_hash,
                email: String::new(),
                is_staff: true,
            })
            .await?;
        info!("created staff account {}", username);
        Ok(())
    }
}
