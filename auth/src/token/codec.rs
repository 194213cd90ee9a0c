use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use super::claims::SessionClaims;
use super::errors::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the serialized claims and the hex signature.
const SIGNATURE_DELIMITER: u8 = b'.';

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Session token codec.
///
/// A token is `base64(claimsJson "." hex(HMAC-SHA256(secret, claimsJson)))`.
/// Claims are readable by anyone holding the token; the MAC only prevents
/// forgery and tampering.
///
/// The signing key is fixed at construction and never mutated, so one codec
/// can be shared across threads behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes)
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            mac: HmacSha256::new_from_slice(secret).expect("HMAC can accept any key length"),
        }
    }

    /// Generate a random signing secret from the OS CSPRNG.
    ///
    /// Tokens signed with a generated secret die with the process that holds it.
    pub fn generate_secret() -> [u8; MIN_SECRET_LENGTH] {
        let mut secret = [0u8; MIN_SECRET_LENGTH];
        OsRng.fill_bytes(&mut secret);
        secret
    }

    /// Encode claims into a signed token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode, including their expiry
    ///
    /// # Returns
    /// Token string safe for headers and cookie values
    ///
    /// # Errors
    /// * `Encoding` - Claims could not be serialized
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let payload =
            serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let signature = hex::encode(self.sign(&payload));

        let mut message = payload;
        message.push(SIGNATURE_DELIMITER);
        message.extend_from_slice(signature.as_bytes());

        Ok(STANDARD.encode(message))
    }

    /// Decode and validate a token against the current time.
    ///
    /// # Errors
    /// * `Malformed` - Token structure or claims payload is invalid
    /// * `InvalidSignature` - Signature does not match the payload
    /// * `Expired` - Token is past its embedded expiry
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Decode and validate a token against an explicit instant.
    ///
    /// The signature is checked before the payload is parsed, so nothing in an
    /// unauthenticated payload is ever interpreted.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let message = STANDARD
            .decode(token.trim())
            .map_err(|e| TokenError::Malformed(format!("invalid base64: {}", e)))?;

        // The hex signature never contains the delimiter, the payload may
        let split = message
            .iter()
            .rposition(|&b| b == SIGNATURE_DELIMITER)
            .ok_or_else(|| TokenError::Malformed("missing signature delimiter".to_string()))?;
        let (payload, signature) = (&message[..split], &message[split + 1..]);

        // Only the lowercase form emitted by `encode` is accepted
        if !signature
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(TokenError::InvalidSignature);
        }
        let signature = hex::decode(signature).map_err(|_| TokenError::InvalidSignature)?;
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: SessionClaims = serde_json::from_slice(payload)
            .map_err(|e| TokenError::Malformed(format!("invalid claims: {}", e)))?;

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn claims() -> SessionClaims {
        SessionClaims::for_user("u1", "a@b.com", "a", Duration::hours(24))
    }

    #[test]
    fn test_encode_and_decode() {
        let codec = TokenCodec::new(SECRET);
        let claims = claims();

        let token = codec.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded = codec.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_token_layout() {
        let codec = TokenCodec::new(SECRET);
        let claims = claims();
        let token = codec.encode(&claims).unwrap();

        let message = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
        let (payload, signature) = message.rsplit_once('.').unwrap();

        assert_eq!(payload, serde_json::to_string(&claims).unwrap());
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1.encode(&claims()).expect("Failed to encode token");

        let result = codec2.decode(&token);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_decode_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let issued = Utc::now() - Duration::hours(25);
        let claims = SessionClaims::issued_at("u1", "a@b.com", "a", issued, Duration::hours(24));

        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_decode_at_expiry_boundary() {
        let codec = TokenCodec::new(SECRET);
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = SessionClaims::issued_at("u1", "a@b.com", "a", issued, Duration::hours(24));
        let token = codec.encode(&claims).unwrap();
        let exp = issued + Duration::hours(24);

        assert_eq!(
            codec.decode_at(&token, exp - Duration::milliseconds(1)),
            Ok(claims)
        );
        assert_eq!(codec.decode_at(&token, exp), Err(TokenError::Expired));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let codec = TokenCodec::new(SECRET);
        let result = codec.decode("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_missing_delimiter() {
        let codec = TokenCodec::new(SECRET);
        let token = STANDARD.encode(r#"{"userId":"u1"}"#);
        assert!(matches!(codec.decode(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_validly_signed_garbage() {
        let codec = TokenCodec::new(SECRET);
        let payload = b"not json at all";
        let mut message = payload.to_vec();
        message.push(b'.');
        message.extend_from_slice(hex::encode(codec.sign(payload)).as_bytes());

        let token = STANDARD.encode(message);
        assert!(matches!(codec.decode(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(&claims()).unwrap();

        let message = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
        let (payload, signature) = message.rsplit_once('.').unwrap();
        let shouted = format!("{}.{}", payload, signature.to_uppercase());

        let result = codec.decode(&STANDARD.encode(shouted));
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(&claims()).unwrap();

        let message = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
        let forged = message.replace(r#""userId":"u1""#, r#""userId":"u2""#);
        assert_ne!(forged, message);

        let result = codec.decode(&STANDARD.encode(forged));
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_single_byte_flips_never_decode() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(&claims()).unwrap();
        let bytes = token.as_bytes();

        for i in 0..bytes.len() {
            let mut flipped = bytes.to_vec();
            flipped[i] ^= 0x01;
            let flipped = String::from_utf8_lossy(&flipped).into_owned();

            match codec.decode(&flipped) {
                Err(TokenError::InvalidSignature) | Err(TokenError::Malformed(_)) => {}
                other => panic!("flip at byte {} produced {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_generated_secrets_differ() {
        let first = TokenCodec::generate_secret();
        let second = TokenCodec::generate_secret();
        assert_ne!(first, second);

        let token = TokenCodec::new(&first).encode(&claims()).unwrap();
        assert_eq!(
            TokenCodec::new(&second).decode(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let codec = TokenCodec::new(SECRET);
        let claims = claims();
        let token = codec.encode(&claims).unwrap();

        assert_eq!(codec.decode(&format!("  {}\n", token)), Ok(claims));
    }
}
