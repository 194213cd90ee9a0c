use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Invalid password input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
