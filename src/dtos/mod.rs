pub mod admin_dtos;
pub mod auth_dtos;
pub mod comment_dtos;
pub mod post_dtos;
pub mod profile_dtos;

use serde::{Deserialize, Deserializer, Serialize};

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// Distinguishes an absent field from an explicit `null` in PATCH bodies.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn default_true() -> bool {
    true
}
