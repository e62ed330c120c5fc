use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 255;
pub const CONTENT_MIN_CHARS: usize = 10;
pub const EXCERPT_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_published() -> bool {
    true
}

impl Post {
    /// Content preview cut at `length` characters.
    pub fn preview(&self, length: usize) -> String {
        let chars: String = self.content.chars().take(length).collect();
        if self.content.chars().count() > length {
            format!("{}...", chars)
        } else {
            chars
        }
    }

    /// The excerpt when one was written, otherwise a content preview.
    pub fn summary(&self, length: usize) -> String {
        match self.excerpt.as_deref().map(str::trim) {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
            _ => self.preview(length),
        }
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated(&self) -> Option<NaiveDateTime> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Whether the post carries an edit later than its creation.
    pub fn was_updated(&self) -> bool {
        match (self.created(), self.updated()) {
            (Some(created), Some(updated)) => updated > created,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    pub fn created_short(&self) -> String {
        format_date(self.created(), "%b %-d, %Y")
    }

    pub fn created_long(&self) -> String {
        format_date(self.created(), "%B %-d, %Y")
    }

    pub fn updated_long(&self) -> String {
        format_date(self.updated(), "%B %-d, %Y")
    }
}

/// Accepts both offset-qualified RFC 3339 and the naive ISO form the API emits.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn format_date(value: Option<NaiveDateTime>, pattern: &str) -> String {
    value
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_default()
}

/// One page of a server-paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let pages = total.div_ceil(u64::from(per_page.max(1))) as u32;
        Self {
            items,
            total,
            page,
            per_page,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    /// What a listing shows before there is anything to ask for.
    pub fn empty(per_page: u32) -> Self {
        Self::new(Vec::new(), 0, 1, per_page)
    }

    /// Page count as shown to the user; never below one.
    pub fn total_pages(&self) -> u32 {
        self.pages.max(1)
    }
}

/// Per-field validation messages, in the shape the posts API reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub published: bool,
}

impl PostInput {
    pub fn new(
        title: &str,
        content: &str,
        excerpt: Option<&str>,
        featured_image: Option<&str>,
        published: bool,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.to_string(),
            excerpt: non_blank(excerpt),
            featured_image: non_blank(featured_image),
            published,
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        let title_len = self.title.chars().count();
        if title_len == 0 {
            errors.add("title", "Title is required");
        } else if title_len < TITLE_MIN_CHARS {
            errors.add("title", "Title must be at least 3 characters");
        } else if title_len > TITLE_MAX_CHARS {
            errors.add("title", "Title must be at most 255 characters");
        }

        let content_len = self.content.trim().chars().count();
        if content_len == 0 {
            errors.add("content", "Content is required");
        } else if content_len < CONTENT_MIN_CHARS {
            errors.add("content", "Content must be at least 10 characters");
        }

        if let Some(excerpt) = &self.excerpt {
            if excerpt.chars().count() > EXCERPT_MAX_CHARS {
                errors.add("excerpt", "Excerpt must be at most 300 characters");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<&Post> for PostInput {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            featured_image: post.featured_image.clone(),
            published: post.published,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
