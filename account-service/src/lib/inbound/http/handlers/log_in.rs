use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LogInCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::cookie::session_cookie;
use crate::inbound::http::router::AppState;

pub async fn log_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LogInRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let session = state
        .user_service
        .log_in(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let jar = jar.add(session_cookie(session.token.clone(), &state.cookie_config));

    Ok((jar, ApiSuccess::new(StatusCode::OK, (&session).into())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogInRequest {
    email: Option<String>,
    password: Option<String>,
}

impl LogInRequest {
    fn try_into_command(self) -> Result<LogInCommand, ApiError> {
        let (Some(email), Some(password)) = (
            self.email.filter(|e| !e.trim().is_empty()),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ));
        };

        let email = EmailAddress::new(email)
            .map_err(|e| ApiError::BadRequest(format!("Invalid email: {}", e)))?;

        Ok(LogInCommand { email, password })
    }
}
