//! Authentication utilities library
//!
//! Provides the stateless authentication core of the dashboard:
//! - Password hashing (Argon2id, `saltHex:keyHex` credential records)
//! - Session token signing and validation (HMAC-SHA256)
//! - Authentication coordination
//!
//! Services define their own storage ports and adapt these implementations.
//! Nothing here holds mutable state; the signing key is fixed at construction.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let record = hasher.hash("Str0ngPass!").unwrap();
//! assert!(hasher.verify("Str0ngPass!", &record));
//! assert!(!hasher.verify("wrong", &record));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{SessionClaims, TokenCodec};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = SessionClaims::for_user("u1", "a@b.com", "a", Duration::hours(24));
//! let token = codec.encode(&claims).unwrap();
//! assert_eq!(codec.decode(&token).unwrap(), claims);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("Str0ngPass!").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth
//!     .authenticate("Str0ngPass!", &hash, "u1", "alice@example.com", "alice")
//!     .unwrap();
//!
//! // Resume: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.user_id(), "u1");
//! ```

pub mod authenticator;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::RejectionReason;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::SessionClaims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::MIN_SECRET_LENGTH;
