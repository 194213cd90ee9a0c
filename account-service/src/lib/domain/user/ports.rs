use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LogInCommand;
use crate::domain::user::models::Principal;
use crate::domain::user::models::Session;
use crate::domain::user::models::SignUpCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for account and session operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account and open a session for it.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, name and password
    ///
    /// # Returns
    /// Session with the created user and a signed token
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Derived username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn sign_up(&self, command: SignUpCommand) -> Result<Session, UserError>;

    /// Verify credentials and open a session.
    ///
    /// # Arguments
    /// * `command` - Email and plaintext password
    ///
    /// # Returns
    /// Session with the user and a signed token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password or inactive account
    /// * `DatabaseError` - Database operation failed
    async fn log_in(&self, command: LogInCommand) -> Result<Session, UserError>;

    /// Resolve a presented token to an active account.
    ///
    /// # Arguments
    /// * `token` - Session token from a header or cookie
    ///
    /// # Returns
    /// Principal for the token's subject
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is malformed, forged or expired
    /// * `InactiveAccount` - Subject is deactivated or deleted
    /// * `DatabaseError` - Database operation failed
    async fn resume(&self, token: &str) -> Result<Principal, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user by (normalized) email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
}
