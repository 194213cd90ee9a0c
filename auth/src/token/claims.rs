use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity facts carried by a session token.
///
/// Field order is the canonical wire order: `userId`, `email`, `username`,
/// `exp`. The expiry is an absolute Unix timestamp in milliseconds, fixed at
/// issuance time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    user_id: String,
    email: String,
    username: String,
    exp: i64,
}

impl SessionClaims {
    /// Create claims for a user, expiring `lifetime` from now.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `email` - User email address
    /// * `username` - Username
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with the expiry computed once from the current time
    pub fn for_user(
        user_id: impl ToString,
        email: impl Into<String>,
        username: impl Into<String>,
        lifetime: Duration,
    ) -> Self {
        Self::issued_at(user_id, email, username, Utc::now(), lifetime)
    }

    /// Create claims issued at an explicit instant.
    ///
    /// An expiry past the last representable instant saturates there.
    pub fn issued_at(
        user_id: impl ToString,
        email: impl Into<String>,
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.into(),
            username: username.into(),
            exp: issued_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp_millis(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expiry as Unix timestamp in milliseconds.
    pub fn expires_at_millis(&self) -> i64 {
        self.exp
    }

    /// Expiry instant, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exp)
    }

    /// Check if the claims are expired at the given instant.
    ///
    /// A token is no longer valid from the expiry instant onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp
    }
}
