use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::{
    api::{ApiError, ListParams, NOT_FOUND_MESSAGE},
    csrf, markdown,
    models::{Page, Post, PostInput},
    search::{BROWSE_ERROR, SEARCH_ERROR},
    Result,
};

use super::{
    views::{
        listing_href, ErrorTemplate, IndexTemplate, Pager, PostFormTemplate, PostTemplate,
        SearchTemplate,
    },
    AppState,
};

const LOAD_POST_ERROR: &str = "Failed to load post. Please try again later.";
const CREATE_ERROR: &str = "Failed to create post. Please try again later.";
const UPDATE_ERROR: &str = "Failed to update post. Please try again later.";
const DELETE_ERROR: &str = "Failed to delete post. Please try again.";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub csrf_token: String,
}

impl PostForm {
    fn input(&self) -> PostInput {
        PostInput::new(
            &self.title,
            &self.content,
            self.excerpt.as_deref(),
            self.featured_image.as_deref(),
            self.published.is_some(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub csrf_token: String,
}

/// One-based page from a query string; anything else means page 1.
fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

fn render<T: Template>(status: StatusCode, template: &T) -> Result<Response> {
    Ok((status, Html(template.render()?)).into_response())
}

fn error_page(status: StatusCode, message: &str) -> Result<Response> {
    render(
        status,
        &ErrorTemplate {
            message: message.to_string(),
        },
    )
}

fn post_error_page(err: &ApiError) -> Result<Response> {
    match err {
        ApiError::NotFound => error_page(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        other => {
            tracing::warn!("Loading post failed: {}", other);
            error_page(StatusCode::BAD_GATEWAY, LOAD_POST_ERROR)
        }
    }
}

fn form_error_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn post_view(post: Post, csrf_token: String, error: Option<String>) -> PostTemplate {
    let body_html = markdown::render(&post.content);
    PostTemplate {
        post,
        body_html,
        csrf_token,
        error,
    }
}

/// The API answers 404 for a page past the end. Looks up the page count again
/// and returns the link to the last page that exists.
async fn past_last_page(
    state: &AppState,
    result: &std::result::Result<Page<Post>, ApiError>,
    params: &ListParams,
    href: impl Fn(u32) -> String,
) -> Option<String> {
    if params.page <= 1 || !matches!(result, Err(ApiError::NotFound)) {
        return None;
    }

    let first = ListParams::new(1, params.per_page, params.search.clone());
    match state.api.list_posts(&first).await {
        Ok(page) => {
            let last = page.total_pages();
            tracing::debug!("Page {} is past the end, redirecting to {}", params.page, last);
            Some(href(last))
        }
        Err(e) => {
            tracing::warn!("Looking up the last page failed: {}", e);
            None
        }
    }
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let page = parse_page(query.page.as_deref());
    let search = query.search.unwrap_or_default().trim().to_string();
    let params = ListParams::new(page, state.config.posts_per_page, search.clone());

    let result = state.api.list_posts(&params).await;
    if let Some(href) = past_last_page(&state, &result, &params, |n| {
        listing_href("/", "search", &search, n)
    })
    .await
    {
        return Ok(Redirect::to(&href).into_response());
    }

    let template = match result {
        Ok(result) => IndexTemplate {
            pager: Pager::build(page, result.total_pages(), |n| {
                listing_href("/", "search", &search, n)
            }),
            posts: result.items,
            search,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Listing posts failed: {}", e);
            IndexTemplate {
                posts: Vec::new(),
                search,
                error: Some(BROWSE_ERROR.to_string()),
                pager: None,
            }
        }
    };

    render(StatusCode::OK, &template)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let page = parse_page(query.page.as_deref());
    let q = query.q.unwrap_or_default().trim().to_string();

    let mut template = SearchTemplate {
        query: q.clone(),
        posts: Vec::new(),
        total: 0,
        error: None,
        pager: None,
    };

    if q.is_empty() {
        return render(StatusCode::OK, &template);
    }

    let params = ListParams::new(page, state.config.search_per_page, q.clone());
    let result = state.api.list_posts(&params).await;
    if let Some(href) = past_last_page(&state, &result, &params, |n| {
        listing_href("/search", "q", &q, n)
    })
    .await
    {
        return Ok(Redirect::to(&href).into_response());
    }

    match result {
        Ok(result) => {
            template.pager = Pager::build(page, result.total_pages(), |n| {
                listing_href("/search", "q", &q, n)
            });
            template.total = result.total;
            template.posts = result.items;
        }
        Err(e) => {
            tracing::warn!("Searching posts failed: {}", e);
            template.error = Some(SEARCH_ERROR.to_string());
        }
    }

    render(StatusCode::OK, &template)
}

pub async fn show_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    cookies: Cookies,
) -> Result<Response> {
    match state.api.get_post(id).await {
        Ok(post) => render(StatusCode::OK, &post_view(post, csrf::issue(&cookies), None)),
        Err(e) => post_error_page(&e),
    }
}

pub async fn new_post(cookies: Cookies) -> Result<Response> {
    let input = PostInput {
        published: true,
        ..PostInput::default()
    };
    render(
        StatusCode::OK,
        &PostFormTemplate::create(csrf::issue(&cookies), &input),
    )
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    csrf::verify(&cookies, &headers, &form.csrf_token)?;

    let input = form.input();
    let result = match input.validate() {
        Ok(()) => state.api.create_post(&input).await,
        Err(errors) => Err(ApiError::Validation(errors)),
    };

    match result {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}", post.id)).into_response()),
        Err(e) => {
            tracing::info!("Create post rejected: {}", e);
            let template = PostFormTemplate::create(form.csrf_token.clone(), &input)
                .with_error(e.user_message(CREATE_ERROR));
            render(form_error_status(&e), &template)
        }
    }
}

pub async fn edit_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    cookies: Cookies,
) -> Result<Response> {
    match state.api.get_post(id).await {
        Ok(post) => render(
            StatusCode::OK,
            &PostFormTemplate::edit(id, csrf::issue(&cookies), &PostInput::from(&post)),
        ),
        Err(e) => post_error_page(&e),
    }
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    csrf::verify(&cookies, &headers, &form.csrf_token)?;

    let input = form.input();
    let result = match input.validate() {
        Ok(()) => state.api.update_post(id, &input).await,
        Err(errors) => Err(ApiError::Validation(errors)),
    };

    match result {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}", post.id)).into_response()),
        Err(ApiError::NotFound) => error_page(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        Err(e) => {
            tracing::info!("Update of post {} rejected: {}", id, e);
            let template = PostFormTemplate::edit(id, form.csrf_token.clone(), &input)
                .with_error(e.user_message(UPDATE_ERROR));
            render(form_error_status(&e), &template)
        }
    }
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Result<Response> {
    csrf::verify(&cookies, &headers, &form.csrf_token)?;

    match state.api.delete_post(id).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(ApiError::NotFound) => error_page(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        Err(e) => {
            tracing::warn!("Deleting post {} failed: {}", id, e);
            match state.api.get_post(id).await {
                Ok(post) => render(
                    StatusCode::BAD_GATEWAY,
                    &post_view(post, form.csrf_token, Some(DELETE_ERROR.to_string())),
                ),
                Err(_) => error_page(StatusCode::BAD_GATEWAY, DELETE_ERROR),
            }
        }
    }
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
