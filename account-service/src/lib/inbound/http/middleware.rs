use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use super::cookie::token_from_jar;
use super::handlers::ApiError;
use super::handlers::UNAUTHORIZED_MESSAGE;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware that resolves the session token and adds the `Principal` to
/// request extensions.
///
/// The `Authorization: Bearer` header wins over the `authToken` cookie.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers()).ok_or_else(|| {
        tracing::debug!("No session token presented");
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()).into_response()
    })?;

    let principal = state
        .user_service
        .resume(&token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| token_from_jar(&CookieJar::from_headers(headers)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
