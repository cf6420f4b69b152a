/// Signed session principals
///
/// A session is a request-scoped [`Principal`] value carrying the
/// authenticated user's id, username, and role. The principal is serialized
/// and HMAC-SHA256-signed into an opaque token handed to the client as its
/// session cookie value; every request's token is verified and the decoded
/// principal is threaded explicitly into the handlers. No ambient global
/// session state exists anywhere.
///
/// Token format: `hex(json(principal)) . hex(hmac_sha256(payload_hex))`.
///
/// # Example
///
/// ```
/// use clubhouse_shared::auth::session::{Principal, SessionKey};
/// use clubhouse_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let key = SessionKey::new("a-secret-that-is-at-least-32-bytes!!")?;
/// let token = key.sign(&Principal::new(Uuid::new_v4(), "alice".into(), Role::Organizer))?;
/// assert_eq!(key.verify(&token)?.role, Role::Organizer);
/// # Ok(())
/// # }
/// ```

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::user::Role;

type HmacSha256 = Hmac<Sha256>;

/// Minimum length of the session signing secret, in bytes
const MIN_SECRET_LEN: usize = 32;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Signing secret is too short to be safe
    #[error("Session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,

    /// Token is not in the expected `payload.signature` shape
    #[error("Malformed session token")]
    Malformed,

    /// Signature did not verify; token was tampered with or signed elsewhere
    #[error("Invalid session token signature")]
    InvalidSignature,

    /// Principal could not be (de)serialized
    #[error("Session payload error: {0}")]
    Payload(String),
}

/// The authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user's id
    pub user_id: Uuid,

    /// Authenticated user's unique username
    pub username: String,

    /// Privilege role at login time
    pub role: Role,
}

impl Principal {
    /// Creates a new principal
    pub fn new(user_id: Uuid, username: String, role: Role) -> Self {
        Principal {
            user_id,
            username,
            role,
        }
    }
}

/// HMAC-SHA256 key for signing and verifying session tokens
#[derive(Clone)]
pub struct SessionKey {
    secret: Vec<u8>,
}

impl SessionKey {
    /// Creates a session key from the configured secret
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SecretTooShort` for secrets under 32 bytes.
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::SecretTooShort);
        }

        Ok(SessionKey {
            secret: secret.as_bytes().to_vec(),
        })
    }

    /// Signs a principal into a session token
    pub fn sign(&self, principal: &Principal) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(principal)
            .map_err(|e| SessionError::Payload(e.to_string()))?;
        let payload_hex = hex::encode(payload);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| SessionError::Payload(e.to_string()))?;
        mac.update(payload_hex.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload_hex, signature))
    }

    /// Verifies a session token and decodes its principal
    ///
    /// Signature comparison is constant-time via the Mac verifier.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for tokens without the `payload.signature` shape,
    /// `InvalidSignature` when the HMAC does not verify, and `Payload` when
    /// the payload is not a valid principal.
    pub fn verify(&self, token: &str) -> Result<Principal, SessionError> {
        let (payload_hex, signature_hex) =
            token.split_once('.').ok_or(SessionError::Malformed)?;

        let signature = hex::decode(signature_hex).map_err(|_| SessionError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| SessionError::Payload(e.to_string()))?;
        mac.update(payload_hex.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload = hex::decode(payload_hex).map_err(|_| SessionError::Malformed)?;
        let principal: Principal = serde_json::from_slice(&payload)
            .map_err(|e| SessionError::Payload(e.to_string()))?;

        Ok(principal)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret-at-least-32-bytes!";

    fn principal() -> Principal {
        Principal::new(Uuid::new_v4(), "alice".to_string(), Role::Admin)
    }

    #[test]
    fn test_secret_length_enforced() {
        assert!(matches!(
            SessionKey::new("short"),
            Err(SessionError::SecretTooShort)
        ));
        assert!(SessionKey::new(SECRET).is_ok());
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let key = SessionKey::new(SECRET).unwrap();
        let original = principal();

        let token = key.sign(&original).unwrap();
        let verified = key.verify(&token).unwrap();

        assert_eq!(verified, original);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let key = SessionKey::new(SECRET).unwrap();
        let token = key.sign(&principal()).unwrap();

        // Flip a character inside the payload half
        let mut chars: Vec<char> = token.chars().collect();
        chars[2] = if chars[2] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(
            key.verify(&tampered),
            Err(SessionError::InvalidSignature) | Err(SessionError::Malformed)
        ));
    }

    #[test]
    fn test_token_signed_with_other_key_rejected() {
        let key_a = SessionKey::new(SECRET).unwrap();
        let key_b = SessionKey::new("another-session-secret-of-32+-bytes!!").unwrap();

        let token = key_a.sign(&principal()).unwrap();
        assert!(matches!(
            key_b.verify(&token),
            Err(SessionError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let key = SessionKey::new(SECRET).unwrap();

        assert!(matches!(key.verify(""), Err(SessionError::Malformed)));
        assert!(matches!(key.verify("nodot"), Err(SessionError::Malformed)));
        assert!(matches!(
            key.verify("zz.not-hex"),
            Err(SessionError::Malformed)
        ));
    }
}
