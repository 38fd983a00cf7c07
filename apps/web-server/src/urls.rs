//! Page URLs and redirects.

use actix_web::HttpResponse;
use actix_web::http::header;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

/// Left as is in paths and in `next`: unreserved characters, `/` and `@`.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b'@');

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", encode(username))
}

/// `/auth/login/?next=<url>`, with `next` percent-encoded.
pub fn login_url(next: &str) -> String {
    format!("/auth/login/?next={}", encode(next))
}

/// A `next` value that stays on this site.
///
/// Browsers drop tabs and newlines from URLs, so any control character could
/// turn `/\t/host` into `//host`.
pub fn safe_next(next: &str) -> Option<&str> {
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);
    local.then_some(next)
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, PATH_SAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_query() {
        assert_eq!(
            login_url("/posts/create/?a=1&b=2"),
            "/auth/login/?next=/posts/create/%3Fa%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_only_local_next_is_followed() {
        assert_eq!(safe_next("/posts/create/"), Some("/posts/create/"));
        assert_eq!(safe_next("//evil.example/"), None);
        assert_eq!(safe_next("https://evil.example/"), None);
        assert_eq!(safe_next(""), None);
        assert_eq!(safe_next("/\t/evil.example/"), None);
        assert_eq!(safe_next("/\r\n/evil.example/"), None);
        assert_eq!(safe_next("/\\evil.example/"), None);
    }

    #[test]
    fn test_profile_url_escapes_plus() {
        assert_eq!(profile_url("a+b@c.d"), "/profile/a%2Bb@c.d/");
        assert_eq!(profile_url("лев"), "/profile/%D0%BB%D0%B5%D0%B2/");
    }
}
