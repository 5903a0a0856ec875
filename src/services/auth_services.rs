// src/services/auth_services.rs - password hashing and bearer tokens

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::auth_dtos::SessionOut;
use crate::models::user::JwtClaims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("invalid token")]
    InvalidToken,
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: u64,
}

impl AuthService {
    pub fn new(secret: &str, token_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Argon2 encoded hash with a fresh random salt.
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let pwd = password.as_bytes().to_vec();
        let salt = Uuid::new_v4();
        let encoded = tokio::task::spawn_blocking(move || {
            argon2::hash_encoded(&pwd, salt.as_bytes(), &argon2::Config::default())
        })
        .await??;
        Ok(encoded)
    }

    pub async fn verify_password(&self, encoded: &str, password: &str) -> Result<bool, AuthError> {
        let encoded = encoded.to_string();
        let pwd = password.as_bytes().to_vec();
        Ok(tokio::task::spawn_blocking(move || argon2::verify_encoded(&encoded, &pwd)).await??)
    }

    pub fn issue_token(&self, user_id: i64) -> Result<SessionOut, AuthError> {
        let iat = Utc::now().timestamp().max(0) as u64;
        let claims = JwtClaims {
            sub: user_id.to_string(),
            iat,
            exp: iat + self.token_ttl_secs,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(SessionOut {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: self.token_ttl_secs,
        })
    }

    /// Checks signature and expiry, returns the user id from `sub`.
    pub fn verify_token(&self, token: &str) -> Result<i64, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidToken)?;
        data.claims.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}
