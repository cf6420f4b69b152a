/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: HMAC-signed session principals carrying {user, role}
/// - [`authorization`]: role guards over the [`Role`](crate::models::user::Role) enum
///
/// Authentication is deliberately simple: username + hashed-password lookup
/// producing a signed session token. The role enum on the user row is the
/// only source of privilege; there are no special-cased accounts.
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::auth::password::{hash_password, verify_password};
/// use clubhouse_shared::auth::session::{Principal, SessionKey};
/// use clubhouse_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("member_password")?;
/// assert!(verify_password("member_password", &hash)?);
///
/// let key = SessionKey::new("a-secret-that-is-at-least-32-bytes!!")?;
/// let principal = Principal::new(Uuid::new_v4(), "alice".to_string(), Role::User);
/// let token = key.sign(&principal)?;
/// let verified = key.verify(&token)?;
/// assert_eq!(verified.username, "alice");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod password;
pub mod session;
