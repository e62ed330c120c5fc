use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    api::NOT_FOUND_MESSAGE,
    search::{BROWSE_ERROR, SEARCH_ERROR},
    testing::FakePostsApi,
    web::{app, AppState},
    Config,
};

const TOKEN: &str = "test-csrf-token";

fn test_app(api: &Arc<FakePostsApi>) -> Router {
    app(AppState::new(api.clone(), Config::default()))
}

async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn post_form(app: Router, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("csrf_token={}", token));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let api = FakePostsApi::new();
    let response = get(test_app(&api), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_index_lists_newest_first_with_pagination() {
    let api = FakePostsApi::with_count(20);
    let response = get(test_app(&api), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Post 20"));
    assert!(body.contains("Post 15"));
    assert!(!body.contains("Post 14"));
    assert!(body.contains("class=\"pagination\""));
    assert!(body.contains("aria-label=\"Page 4\""));
    assert_eq!(api.list_calls()[0].per_page, 6);
}

#[tokio::test]
async fn test_index_second_page() {
    let api = FakePostsApi::with_count(20);
    let body = body_text(get(test_app(&api), "/?page=2").await).await;

    assert!(body.contains("Post 14"));
    assert!(!body.contains("Post 15"));
    assert_eq!(api.list_calls()[0].page, 2);
}

#[tokio::test]
async fn test_index_bad_page_falls_back_to_first() {
    let api = FakePostsApi::with_count(3);
    get(test_app(&api), "/?page=zero").await;
    assert_eq!(api.list_calls()[0].page, 1);
}

#[tokio::test]
async fn test_index_search_filters() {
    let api = FakePostsApi::with_count(20);
    let body = body_text(get(test_app(&api), "/?search=post%2019").await).await;

    assert!(body.contains("Post 19"));
    assert!(!body.contains("Post 18"));
    assert!(!body.contains("class=\"pagination\""));
    assert_eq!(api.list_calls()[0].search, "post 19");
}

#[tokio::test]
async fn test_index_empty_states() {
    let api = FakePostsApi::new();
    let body = body_text(get(test_app(&api), "/").await).await;
    assert!(body.contains("There are no blog posts yet."));

    let body = body_text(get(test_app(&api), "/?search=nothing").await).await;
    assert!(body.contains("No results found for"));
}

#[tokio::test]
async fn test_index_reports_api_failure() {
    let api = FakePostsApi::with_count(3);
    api.fail_lists(true);

    let response = get(test_app(&api), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(BROWSE_ERROR));
}

#[tokio::test]
async fn test_search_without_query_skips_api() {
    let api = FakePostsApi::with_count(3);
    let body = body_text(get(test_app(&api), "/search?q=%20%20").await).await;

    assert!(body.contains("Type something to search"));
    assert!(api.list_calls().is_empty());
}

#[tokio::test]
async fn test_search_counts_results() {
    let api = FakePostsApi::with_titles(&["Rust ownership", "Go channels", "Rust async"]);
    let body = body_text(get(test_app(&api), "/search?q=rust").await).await;

    assert!(body.contains("Found 2 results"));
    assert!(body.contains("Rust ownership"));
    assert!(!body.contains("Go channels"));
    assert_eq!(api.list_calls()[0].per_page, 10);

    let body = body_text(get(test_app(&api), "/search?q=channels").await).await;
    assert!(body.contains("Found 1 result for"));
}

#[tokio::test]
async fn test_search_reports_api_failure() {
    let api = FakePostsApi::with_count(3);
    api.fail_lists(true);
    let body = body_text(get(test_app(&api), "/search?q=post").await).await;
    assert!(body.contains(SEARCH_ERROR));
}

#[tokio::test]
async fn test_show_post_renders_markdown() {
    let api = FakePostsApi::new();
    let post = api.insert("Markdown post", "# Heading\n\nSome **bold** text.");

    let response = get(test_app(&api), &format!("/posts/{}", post.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("<h1>Heading</h1>"));
    assert!(body.contains("<strong>bold</strong>"));
    assert!(!body.contains("Updated:"));
}

#[tokio::test]
async fn test_show_missing_post() {
    let api = FakePostsApi::new();
    let response = get(test_app(&api), "/posts/404").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains(NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn test_new_post_form_sets_csrf_cookie() {
    let api = FakePostsApi::new();
    let response = get(test_app(&api), "/posts/create").await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("csrf_token="));
    assert!(body_text(response).await.contains("name=\"csrf_token\""));
}

#[tokio::test]
async fn test_create_requires_csrf() {
    let api = FakePostsApi::new();
    let body = format!(
        "title=Hello+there&content=Long+enough+content&csrf_token={}",
        TOKEN
    );

    let response = post_form(test_app(&api), "/posts", &body, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_form(test_app(&api), "/posts", &body, Some("other")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!api.contains(1));
}

#[tokio::test]
async fn test_create_redirects_to_post() {
    let api = FakePostsApi::new();
    let body = format!(
        "title=Hello+there&content=Long+enough+content&excerpt=&published=on&csrf_token={}",
        TOKEN
    );

    let response = post_form(test_app(&api), "/posts", &body, Some(TOKEN)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/posts/1");

    let created = crate::api::PostsApi::get_post(api.as_ref(), 1).await.unwrap();
    assert_eq!(created.title, "Hello there");
    assert!(created.excerpt.is_none());
    assert!(created.published);
}

#[tokio::test]
async fn test_create_invalid_rerenders_form() {
    let api = FakePostsApi::new();
    let body = format!("title=Hi&content=short&csrf_token={}", TOKEN);

    let response = post_form(test_app(&api), "/posts", &body, Some(TOKEN)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let text = body_text(response).await;
    assert!(text.contains("Validation failed"));
    assert!(text.contains("Title must be at least 3 characters"));
    assert!(text.contains("Content must be at least 10 characters"));
    assert!(!api.contains(1));
}

#[tokio::test]
async fn test_edit_form_prefilled() {
    let api = FakePostsApi::new();
    let post = api.insert("Original title", "Original content body");

    let body = body_text(get(test_app(&api), &format!("/posts/{}/edit", post.id)).await).await;
    assert!(body.contains("Original title"));
    assert!(body.contains("Save Changes"));

    let response = get(test_app(&api), "/posts/99/edit").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_post() {
    let api = FakePostsApi::new();
    let post = api.insert("Original title", "Original content body");
    let body = format!(
        "title=Renamed+title&content=Updated+content+body&csrf_token={}",
        TOKEN
    );

    let response = post_form(
        test_app(&api),
        &format!("/posts/{}", post.id),
        &body,
        Some(TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let text = body_text(get(test_app(&api), &format!("/posts/{}", post.id)).await).await;
    assert!(text.contains("Renamed title"));

    let response = post_form(test_app(&api), "/posts/99", &body, Some(TOKEN)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_post_is_no_longer_reachable() {
    let api = FakePostsApi::new();
    let post = api.insert("Doomed post", "Content that will vanish");
    let uri = format!("/posts/{}", post.id);

    assert_eq!(get(test_app(&api), &uri).await.status(), StatusCode::OK);

    let response = post_form(
        test_app(&api),
        &format!("/posts/{}/delete", post.id),
        &format!("csrf_token={}", TOKEN),
        Some(TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = get(test_app(&api), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains(NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn test_page_past_the_end_redirects_to_last_page() {
    let api = FakePostsApi::with_count(20);

    let response = get(test_app(&api), "/?page=9").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?page=4");

    let pages: Vec<u32> = api.list_calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![9, 1]);

    let body = body_text(get(test_app(&api), "/?page=4").await).await;
    assert!(body.contains("Post 2"));
    assert!(!body.contains(BROWSE_ERROR));
}

#[tokio::test]
async fn test_search_page_past_the_end_redirects_to_last_page() {
    let api = FakePostsApi::with_count(20);

    let response = get(test_app(&api), "/search?q=post&page=9").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/search?q=post&page=2");
}

#[tokio::test]
async fn test_first_page_failure_is_not_redirected() {
    let api = FakePostsApi::with_count(20);
    api.fail_lists(true);

    let response = get(test_app(&api), "/?page=9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(BROWSE_ERROR));
}
