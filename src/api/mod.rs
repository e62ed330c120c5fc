//! Typed contract for the posts REST API.
//!
//! Views and the search controller only ever talk to a [`PostsApi`]; the
//! reqwest-backed [`HttpPostsApi`] is built once from configuration and handed
//! around as `Arc<dyn PostsApi>`, so tests can swap in their own transport.

mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{FieldErrors, Page, Post, PostInput};

pub use http::HttpPostsApi;

pub const NOT_FOUND_MESSAGE: &str =
    "Failed to load post. It may have been deleted or does not exist.";

/// Query for `GET /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
    pub search: String,
}

impl ListParams {
    pub fn new(page: u32, per_page: u32, search: impl Into<String>) -> Self {
        Self {
            page,
            per_page,
            search: search.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("post not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("unexpected status {0}")]
    Status(u16),
}

impl ApiError {
    /// Message shown to the reader. Validation errors are spelled out per
    /// field; everything else falls back to the view's generic text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(errors) => format!("Validation failed: {}", errors),
            ApiError::NotFound => NOT_FOUND_MESSAGE.to_string(),
            ApiError::Transport(_) | ApiError::Status(_) => fallback.to_string(),
        }
    }
}

#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, params: &ListParams) -> Result<Page<Post>, ApiError>;

    async fn get_post(&self, id: i64) -> Result<Post, ApiError>;

    async fn create_post(&self, input: &PostInput) -> Result<Post, ApiError>;

    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, ApiError>;

    async fn delete_post(&self, id: i64) -> Result<(), ApiError>;
}
