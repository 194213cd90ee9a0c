use chrono::Duration;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::SessionClaims;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Well-formed credential record that matches no password in practice.
///
/// Verified against when the identifier is unknown, so that a rejected login
/// costs one key derivation whether or not the account exists.
const DUMMY_RECORD: &str = "00000000000000000000000000000000:\
    00000000000000000000000000000000000000000000000000000000000000000000000000000000\
    000000000000000000000000000000000000000000000000";

/// Authentication coordinator combining password verification and session
/// token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    token_lifetime: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
    /// Claims embedded in the token
    pub claims: SessionClaims,
}

/// Why a login was rejected.
///
/// Kept for logging only; every reason surfaces as the same
/// `InvalidCredentials` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    UnknownAccount,
    PasswordMismatch,
    InactiveAccount,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::UnknownAccount => "unknown_account",
            RejectionReason::PasswordMismatch => "password_mismatch",
            RejectionReason::InactiveAccount => "inactive_account",
        }
    }
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials(RejectionReason),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `secret` - Secret key for token signing
    /// * `token_lifetime` - Time from issuance until a token expires
    pub fn new(secret: &[u8], token_lifetime: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(secret),
            token_lifetime,
        }
    }

    /// Lifetime applied to every issued token.
    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `InvalidInput` - Password is empty
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored credential record and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored credential record
    /// * `user_id` - Subject to embed in the token
    /// * `email` - Email to embed in the token
    /// * `username` - Username to embed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Token` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: &str,
        email: &str,
        username: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials(
                RejectionReason::PasswordMismatch,
            ));
        }

        self.issue(user_id, email, username)
    }

    /// Reject a login for an identifier with no stored record.
    ///
    /// Runs a full verification against a dummy record first so the
    /// rejection takes as long as a wrong password would.
    pub fn reject_unknown_account(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, DUMMY_RECORD);
        AuthenticationError::InvalidCredentials(RejectionReason::UnknownAccount)
    }

    /// Issue a token for an identity that is already authenticated,
    /// e.g. right after signup.
    ///
    /// # Errors
    /// * `Token` - Token generation failed
    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        username: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let claims = SessionClaims::for_user(user_id, email, username, self.token_lifetime);
        let access_token = self.token_codec.encode(&claims)?;

        Ok(AuthenticationResult {
            access_token,
            claims,
        })
    }

    /// Validate and decode a session token.
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be decoded
    /// * `InvalidSignature` - Token was not signed with this secret
    /// * `Expired` - Token is past its expiry
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.token_codec.decode(token)
    }
}
