use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Separator between the salt and the derived key in a credential record.
pub const RECORD_DELIMITER: char = ':';

/// Random salt length in bytes (hex-encoded to 32 characters).
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes (hex-encoded to 128 characters).
pub const KEY_LENGTH: usize = 64;

/// Argon2id memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19_456;

/// Argon2id number of passes over memory.
pub const TIME_COST: u32 = 2;

/// Argon2id lanes.
pub const PARALLELISM: u32 = 1;

const MIN_SALT_LENGTH: usize = 8;

/// Password hashing implementation.
///
/// Produces credential records of the form `saltHex:keyHex`, where the key is
/// derived with Argon2id under the fixed parameters declared in this module.
/// Changing any of those parameters invalidates every stored record.
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Credential record `saltHex:keyHex` with a fresh random salt
    ///
    /// # Errors
    /// * `InvalidInput` - Password is empty
    /// * `HashingFailed` - Key derivation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);

        let key = derive_key(password.as_bytes(), &salt)?;

        Ok(format!(
            "{}{}{}",
            hex::encode(salt),
            RECORD_DELIMITER,
            hex::encode(key)
        ))
    }

    /// Verify a password against a stored credential record.
    ///
    /// Malformed records are reported as a mismatch so the caller cannot tell
    /// them apart from a wrong password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `record` - Stored credential record
    ///
    /// # Returns
    /// True if the password matches the record, false otherwise
    pub fn verify(&self, password: &str, record: &str) -> bool {
        let Some((salt_hex, key_hex)) = record.split_once(RECORD_DELIMITER) else {
            return false;
        };

        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(key_hex)) else {
            return false;
        };

        if salt.len() < MIN_SALT_LENGTH || expected.len() != KEY_LENGTH {
            return false;
        }

        match derive_key(password.as_bytes(), &salt) {
            Ok(actual) => constant_time_eq(&actual, &expected),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_key(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LENGTH], PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(KEY_LENGTH))
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(key)
}

/// Compare two byte slices without short-circuiting on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
