use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Principal;

/// Return the account behind the presented session.
pub async fn me(Extension(principal): Extension<Principal>) -> ApiSuccess<MeResponseData> {
    ApiSuccess::new(StatusCode::OK, (&principal).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user: UserData,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Principal> for MeResponseData {
    fn from(principal: &Principal) -> Self {
        Self {
            user: (&principal.user).into(),
            expires_at: principal.claims.expires_at(),
        }
    }
}
