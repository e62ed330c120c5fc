use askama::Template;

use crate::{
    models::{Post, PostInput},
    pagination::{PageItem, PaginationControls},
};

pub struct PageLink {
    pub label: String,
    pub href: Option<String>,
    pub current: bool,
}

/// Rendered page navigation; absent when there is a single page.
pub struct Pager {
    pub previous: Option<String>,
    pub next: Option<String>,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn build(current: u32, total: u32, href: impl Fn(u32) -> String) -> Option<Self> {
        let controls = PaginationControls::build(current, total)?;

        let links = controls
            .items
            .iter()
            .map(|item| match item {
                PageItem::Page(n) => PageLink {
                    label: n.to_string(),
                    href: Some(href(*n)),
                    current: controls.is_current(n),
                },
                PageItem::Ellipsis => PageLink {
                    label: "...".to_string(),
                    href: None,
                    current: false,
                },
            })
            .collect();

        Some(Self {
            previous: controls.previous.map(&href),
            next: controls.next.map(&href),
            links,
        })
    }
}

/// `path?key=query&page=n`, leaving out an empty query.
pub fn listing_href(path: &str, key: &str, query: &str, page: u32) -> String {
    if query.is_empty() {
        format!("{}?page={}", path, page)
    } else {
        format!(
            "{}?{}={}&page={}",
            path,
            key,
            urlencoding::encode(query),
            page
        )
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub posts: Vec<Post>,
    pub search: String,
    pub error: Option<String>,
    pub pager: Option<Pager>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub query: String,
    pub posts: Vec<Post>,
    pub total: u64,
    pub error: Option<String>,
    pub pager: Option<Pager>,
}

impl SearchTemplate {
    pub fn result_noun(&self) -> &'static str {
        if self.total == 1 {
            "result"
        } else {
            "results"
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub post: Post,
    pub body_html: String,
    pub csrf_token: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub cancel_href: String,
    pub csrf_token: String,
    pub error: Option<String>,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: String,
    pub published: bool,
}

impl PostFormTemplate {
    pub fn create(csrf_token: String, input: &PostInput) -> Self {
        Self::with_input(
            "Create Post",
            "/posts".to_string(),
            "Create Post",
            "/".to_string(),
            csrf_token,
            input,
        )
    }

    pub fn edit(id: i64, csrf_token: String, input: &PostInput) -> Self {
        Self::with_input(
            "Edit Post",
            format!("/posts/{}", id),
            "Save Changes",
            format!("/posts/{}", id),
            csrf_token,
            input,
        )
    }

    fn with_input(
        heading: &'static str,
        action: String,
        submit_label: &'static str,
        cancel_href: String,
        csrf_token: String,
        input: &PostInput,
    ) -> Self {
        Self {
            heading,
            action,
            submit_label,
            cancel_href,
            csrf_token,
            error: None,
            title: input.title.clone(),
            content: input.content.clone(),
            excerpt: input.excerpt.clone().unwrap_or_default(),
            featured_image: input.featured_image.clone().unwrap_or_default(),
            published: input.published,
        }
    }

    pub fn with_error(mut self, message: String) -> Self {
        self.error = Some(message);
        self
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub message: String,
}
