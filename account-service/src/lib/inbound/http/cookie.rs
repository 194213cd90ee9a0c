use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;

/// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "authToken";

/// Attributes of the session cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the Secure flag (production only)
    pub secure: bool,
    /// Max-Age, matching the token lifetime
    pub max_age: chrono::Duration,
}

/// Create the HttpOnly session cookie carrying `token`.
///
/// Lax same-site, root path, and a max-age equal to the token lifetime, so the
/// browser drops the cookie when the embedded expiry passes.
pub fn session_cookie(token: String, config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::seconds(config.max_age.num_seconds()))
        .build()
}

/// Extract the session token from request cookies.
pub fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use axum::http::HeaderMap;
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = CookieConfig {
            secure: false,
            max_age: chrono::Duration::hours(24),
        };

        let session = session_cookie("token-value".to_string(), &config);

        assert_eq!(session.name(), AUTH_COOKIE_NAME);
        assert_eq!(session.value(), "token-value");
        assert_eq!(session.http_only(), Some(true));
        assert_eq!(session.secure(), Some(false));
        assert_eq!(session.same_site(), Some(SameSite::Lax));
        assert_eq!(session.path(), Some("/"));
        assert_eq!(
            session.max_age(),
            Some(cookie::time::Duration::seconds(86_400))
        );
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let config = CookieConfig {
            secure: true,
            max_age: chrono::Duration::hours(24),
        };

        let rendered = session_cookie("t".to_string(), &config).to_string();
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=86400"));
    }

    #[test]
    fn test_token_from_jar() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; authToken=abc123"),
        );

        let jar = CookieJar::from_headers(&headers);
        assert_eq!(token_from_jar(&jar), Some("abc123".to_string()));
    }

    #[test]
    fn test_token_from_jar_missing_or_empty() {
        let jar = CookieJar::from_headers(&HeaderMap::new());
        assert_eq!(token_from_jar(&jar), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("authToken="));
        assert_eq!(token_from_jar(&CookieJar::from_headers(&headers)), None);
    }
}
