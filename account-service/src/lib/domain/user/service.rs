use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::AuthenticationResult;
use auth::Authenticator;
use auth::TokenError;
use chrono::Utc;

use crate::domain::user::models::LogInCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::Session;
use crate::domain::user::models::SignUpCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account and session operations.
///
/// Password hashing and verification run on the blocking thread pool; token
/// validation is a single HMAC and stays on the async worker.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password and token handling
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_credentials(
        &self,
        user: Option<User>,
        password: String,
    ) -> Result<Result<(User, AuthenticationResult), AuthenticationError>, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || match user {
            None => Err(authenticator.reject_unknown_account(&password)),
            Some(user) => authenticator
                .authenticate(
                    &password,
                    &user.password_hash,
                    &user.id.to_string(),
                    user.email.as_str(),
                    user.username.as_str(),
                )
                .map(|result| (user, result)),
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Credential verification task failed: {}", e)))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn sign_up(&self, command: SignUpCommand) -> Result<Session, UserError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let user = self.repository.create(user).await?;

        let result = self
            .authenticator
            .issue(
                &user.id.to_string(),
                user.email.as_str(),
                user.username.as_str(),
            )
            .map_err(|e| UserError::TokenIssuance(e.to_string()))?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        Ok(Session {
            user,
            token: result.access_token,
            claims: result.claims,
        })
    }

    async fn log_in(&self, command: LogInCommand) -> Result<Session, UserError> {
        let user = self.repository.find_by_email(&command.email).await?;

        let (user, result) = match self.verify_credentials(user, command.password).await? {
            Ok(verified) => verified,
            Err(AuthenticationError::InvalidCredentials(reason)) => {
                tracing::warn!(reason = reason.as_str(), "Login rejected");
                return Err(UserError::InvalidCredentials);
            }
            Err(AuthenticationError::Password(e)) => return Err(UserError::Password(e)),
            Err(AuthenticationError::Token(e)) => {
                return Err(UserError::TokenIssuance(e.to_string()))
            }
        };

        // Checked after verification so an inactive account costs the same
        if !user.is_active {
            tracing::warn!(
                reason = auth::RejectionReason::InactiveAccount.as_str(),
                user_id = %user.id,
                "Login rejected"
            );
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user,
            token: result.access_token,
            claims: result.claims,
        })
    }

    async fn resume(&self, token: &str) -> Result<Principal, UserError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            match &e {
                TokenError::InvalidSignature => {
                    tracing::warn!(error = %e, "Token signature mismatch, possible forgery")
                }
                TokenError::Expired => tracing::info!(error = %e, "Expired token presented"),
                TokenError::Malformed(_) | TokenError::Encoding(_) => {
                    tracing::debug!(error = %e, "Malformed token presented")
                }
            }
            UserError::Unauthenticated(e)
        })?;

        let user_id = UserId::from_string(claims.user_id()).map_err(|e| {
            tracing::error!(error = %e, "Signed token carries an invalid subject");
            UserError::Unauthenticated(TokenError::Malformed(e.to_string()))
        })?;

        match self.repository.find_by_id(&user_id).await? {
            Some(user) if user.is_active => Ok(Principal { user, claims }),
            Some(_) => {
                tracing::info!(user_id = %user_id, "Token presented for inactive account");
                Err(UserError::InactiveAccount)
            }
            None => {
                tracing::info!(user_id = %user_id, "Token presented for unknown account");
                Err(UserError::InactiveAccount)
            }
        }
    }
}
