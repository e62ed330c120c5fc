//! Double-submit CSRF tokens for the HTML forms.

use axum::http::{header, HeaderMap};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

pub const CSRF_COOKIE: &str = "csrf_token";

/// Returns the visitor's token, minting and setting one if absent.
pub fn issue(cookies: &Cookies) -> String {
    if let Some(existing) = cookies.get(CSRF_COOKIE) {
        if !existing.value().is_empty() {
            return existing.value().to_string();
        }
    }

    let token = Uuid::new_v4().to_string();
    cookies.add(
        Cookie::build((CSRF_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .build(),
    );
    token
}

/// Checks a submitted form token against the cookie and the request origin.
pub fn verify(cookies: &Cookies, headers: &HeaderMap, submitted: &str) -> crate::Result<()> {
    let cookie_token = cookies.get(CSRF_COOKIE).map(|c| c.value().to_string());

    match cookie_token {
        Some(cookie) if !cookie.is_empty() && cookie == submitted && same_origin(headers) => {
            Ok(())
        }
        _ => Err(crate::Error::Forbidden),
    }
}

/// False only when the browser names an origin that is not this host.
fn same_origin(headers: &HeaderMap) -> bool {
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|h| h.to_str().ok());

    let Some(host) = header_str(header::HOST) else {
        return true;
    };

    match header_str(header::ORIGIN).or_else(|| header_str(header::REFERER)) {
        Some(source) => source
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .is_some_and(|authority| authority == host),
        None => true,
    }
}
