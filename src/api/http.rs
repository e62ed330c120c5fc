use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Response, StatusCode,
};
use serde_json::Value;

use super::{ApiError, ListParams, PostsApi};
use crate::{
    models::{FieldErrors, Page, Post, PostInput},
    Config,
};

/// [`PostsApi`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpPostsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostsApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.api_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps non-2xx responses onto the error taxonomy.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    let body = response.bytes().await.unwrap_or_default();
    match field_errors(&body) {
        Some(errors) => Err(ApiError::Validation(errors)),
        None => {
            tracing::warn!("Posts API responded {}", status);
            Err(ApiError::Status(status.as_u16()))
        }
    }
}

/// Extracts `{"errors": {field: [messages]}}` from an error body.
fn field_errors(body: &[u8]) -> Option<FieldErrors> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let fields = value.get("errors")?.as_object()?;

    let mut errors = FieldErrors::default();
    for (field, messages) in fields {
        match messages {
            Value::Array(list) => {
                for message in list {
                    match message.as_str() {
                        Some(text) => errors.add(field, text),
                        None => errors.add(field, message.to_string()),
                    }
                }
            }
            Value::String(text) => errors.add(field, text.as_str()),
            other => errors.add(field, other.to_string()),
        }
    }

    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list_posts(&self, params: &ListParams) -> Result<Page<Post>, ApiError> {
        tracing::debug!(
            page = params.page,
            per_page = params.per_page,
            search = %params.search,
            "Listing posts"
        );
        let response = self
            .client
            .get(self.url("/posts"))
            .query(params)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/posts/{}", id)))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn create_post(&self, input: &PostInput) -> Result<Post, ApiError> {
        let response = self
            .client
            .post(self.url("/posts"))
            .json(input)
            .send()
            .await?;

        let post: Post = check(response).await?.json().await?;
        tracing::info!("Created post {}", post.id);
        Ok(post)
    }

    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/posts/{}", id)))
            .json(input)
            .send()
            .await?;

        let post: Post = check(response).await?.json().await?;
        tracing::info!("Updated post {}", post.id);
        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/posts/{}", id)))
            .send()
            .await?;

        check(response).await?;
        tracing::info!("Deleted post {}", id);
        Ok(())
    }
}
