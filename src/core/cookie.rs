//! Session cookie helpers

use axum::http::{header, HeaderMap, HeaderValue};

use crate::core::models::ConfigError;

/// Reads a cookie value from every `Cookie` header of a request.
/// Empty values count as absent.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for raw in headers.get_all(header::COOKIE) {
        let Ok(raw) = raw.to_str() else {
            continue;
        };
        for part in raw.split(';') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            if key.trim() == name {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// RFC 6265 cookie-name token: visible ASCII minus separators.
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}

/// Attributes shared by every `Set-Cookie` the gateway emits for the admin
/// session, so that clearing always matches issuance.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    cleared: HeaderValue,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Result<Self, ConfigError> {
        let name = name.into();
        if !is_valid_cookie_name(&name) {
            return Err(ConfigError::InvalidCookieName(name));
        }

        let mut cookie = Self {
            name,
            secure,
            cleared: HeaderValue::from_static(""),
        };
        cookie.cleared = HeaderValue::from_str(&cookie.clear())
            .map_err(|_| ConfigError::InvalidCookieName(cookie.name.clone()))?;
        Ok(cookie)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn issue(&self, token: &str, max_age_secs: u64) -> String {
        self.render(token, max_age_secs.min(i64::MAX as u64) as i64)
    }

    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    pub fn clear_header(&self) -> HeaderValue {
        self.cleared.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; admin_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            extract_cookie(&headers, "admin_session").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_across_headers_and_empty_values() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("admin_session="));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(extract_cookie(&headers, "admin_session"), None);

        headers.append(header::COOKIE, HeaderValue::from_static("admin_session=tok"));
        assert_eq!(extract_cookie(&headers, "admin_session").as_deref(), Some("tok"));
    }

    #[test]
    fn test_clear_matches_issue_attributes() {
        let cookie = SessionCookie::new("admin_session", true).unwrap();
        let issued = cookie.issue("tok", 3600);
        let cleared = cookie.clear();

        assert_eq!(
            issued,
            "admin_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure"
        );
        assert_eq!(
            cleared,
            "admin_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
    }

    #[test]
    fn test_insecure_cookie_in_development() {
        let cookie = SessionCookie::new("admin_session", false).unwrap();
        assert!(!cookie.clear().contains("Secure"));
        assert_eq!(
            cookie.clear_header(),
            "admin_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn test_custom_name_is_cleared_by_that_name() {
        let cookie = SessionCookie::new("ops_session", false).unwrap();
        assert!(cookie.clear_header().to_str().unwrap().starts_with("ops_session=;"));
    }

    #[test]
    fn test_rejects_unusable_names() {
        for name in ["", "admin session", "admin;session", "sess=1", "caf\u{e9}", "a\nb"] {
            assert!(!is_valid_cookie_name(name), "{name:?}");
            assert!(matches!(
                SessionCookie::new(name, false),
                Err(ConfigError::InvalidCookieName(_))
            ));
        }
        assert!(is_valid_cookie_name("__Host-admin_session"));
    }
}
