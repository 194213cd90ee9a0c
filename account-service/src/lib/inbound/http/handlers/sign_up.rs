use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignUpCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::cookie::session_cookie;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignUpRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let session = state
        .user_service
        .sign_up(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let jar = jar.add(session_cookie(session.token.clone(), &state.cookie_config));

    Ok((
        jar,
        ApiSuccess::new(StatusCode::CREATED, (&session).into()),
    ))
}

/// HTTP request body for signup (raw JSON)
///
/// Fields are optional so a missing field yields a 400 with a readable
/// message instead of an extractor rejection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpRequest {
    #[serde(alias = "firstName")]
    first_name: Option<String>,
    #[serde(alias = "lastName")]
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseSignUpRequestError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Weak password: {0}")]
    Password(#[from] PasswordPolicyError),
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

impl SignUpRequest {
    fn try_into_command(self) -> Result<SignUpCommand, ParseSignUpRequestError> {
        let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ParseSignUpRequestError::MissingFields);
        };

        let full_name = FullName::new(&first_name, &last_name)?;
        let email = EmailAddress::new(email)?;
        let password = Password::new(password)?;
        Ok(SignUpCommand::new(email, full_name, password)?)
    }
}

impl From<ParseSignUpRequestError> for ApiError {
    fn from(err: ParseSignUpRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
