//! In-memory posts API used by unit tests.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    api::{ApiError, ListParams, PostsApi},
    models::{Page, Post, PostInput},
};

#[derive(Default)]
pub struct FakePostsApi {
    posts: Mutex<Vec<Post>>,
    next_id: Mutex<i64>,
    list_calls: Mutex<Vec<ListParams>>,
    delays: Mutex<HashMap<String, Duration>>,
    fail_lists: AtomicBool,
}

impl FakePostsApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(1),
            ..Self::default()
        })
    }

    pub fn with_titles(titles: &[&str]) -> Arc<Self> {
        let api = Self::new();
        for title in titles {
            api.insert(title, "Some body text for the post.");
        }
        api
    }

    /// Posts titled "Post 1" through "Post `count`".
    pub fn with_count(count: usize) -> Arc<Self> {
        let api = Self::new();
        for n in 1..=count {
            api.insert(&format!("Post {}", n), "Generated body text.");
        }
        api
    }

    pub fn insert(&self, title: &str, content: &str) -> Post {
        let input = PostInput::new(title, content, None, None, true);
        self.store(&input)
    }

    pub fn list_calls(&self) -> Vec<ListParams> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Holds list responses for `search` back by `delay`.
    pub fn delay_search(&self, search: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(search.to_string(), delay);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.posts.lock().unwrap().iter().any(|p| p.id == id)
    }

    fn store(&self, input: &PostInput) -> Post {
        let mut next_id = self.next_id.lock().unwrap();
        let now = timestamp();
        let post = Post {
            id: *next_id,
            title: input.title.clone(),
            content: input.content.clone(),
            excerpt: input.excerpt.clone(),
            featured_image: input.featured_image.clone(),
            published: input.published,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        *next_id += 1;
        self.posts.lock().unwrap().push(post.clone());
        post
    }
}

fn timestamp() -> String {
    Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn matches(post: &Post, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    post.title.to_lowercase().contains(&needle)
        || post.content.to_lowercase().contains(&needle)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(&needle))
}

#[async_trait]
impl PostsApi for FakePostsApi {
    async fn list_posts(&self, params: &ListParams) -> Result<Page<Post>, ApiError> {
        self.list_calls.lock().unwrap().push(params.clone());

        let delay = self.delays.lock().unwrap().get(&params.search).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::Status(500));
        }

        // Newest first, like the real API.
        let mut found: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| params.search.is_empty() || matches(p, &params.search))
            .cloned()
            .collect();
        found.reverse();

        let total = found.len() as u64;
        let per_page = params.per_page.max(1);
        let page = Page::new(Vec::new(), total, params.page, per_page);
        if params.page == 0 || (page.pages > 0 && params.page > page.pages) {
            return Err(ApiError::NotFound);
        }

        let start = ((params.page - 1) * per_page) as usize;
        let items = found
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Ok(Page { items, ..page })
    }

    async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_post(&self, input: &PostInput) -> Result<Post, ApiError> {
        input.validate().map_err(ApiError::Validation)?;
        Ok(self.store(input))
    }

    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, ApiError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::NotFound)?;
        input.validate().map_err(ApiError::Validation)?;

        post.title = input.title.clone();
        post.content = input.content.clone();
        post.excerpt = input.excerpt.clone();
        post.featured_image = input.featured_image.clone();
        post.published = input.published;
        post.updated_at = Some(timestamp());
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
