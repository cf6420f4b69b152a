/// Role guards for the access control gate
///
/// Every mutating operation runs behind one of three guard predicates over
/// the request's [`Principal`]:
///
/// - `require_authenticated`: any logged-in member
/// - `require_organizer`: organizer or admin
/// - `require_admin`: admin only
///
/// Roles are ordered user < organizer < admin; an admin implicitly passes
/// the organizer and user checks. The checks consult only the role enum,
/// never the username.
///
/// # Example
///
/// ```
/// use clubhouse_shared::auth::authorization::{require_admin, require_organizer};
/// use clubhouse_shared::auth::session::Principal;
/// use clubhouse_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let organizer = Principal::new(Uuid::new_v4(), "olaf".into(), Role::Organizer);
/// assert!(require_organizer(Some(&organizer)).is_ok());
/// assert!(require_admin(Some(&organizer)).is_err());
/// ```

use crate::auth::session::Principal;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No principal on the request; caller must authenticate first
    #[error("Authentication required")]
    NotAuthenticated,

    /// Principal's role does not meet the requirement
    #[error("Insufficient role: requires {required:?}, has {actual:?}")]
    InsufficientRole { required: Role, actual: Role },
}

/// Requires any authenticated principal
pub fn require_authenticated(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    principal.ok_or(AuthzError::NotAuthenticated)
}

/// Requires a principal whose role satisfies `required`
pub fn require_role(
    principal: Option<&Principal>,
    required: Role,
) -> Result<&Principal, AuthzError> {
    let principal = require_authenticated(principal)?;

    if !principal.role.satisfies(required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: principal.role,
        });
    }

    Ok(principal)
}

/// Requires an organizer or admin
pub fn require_organizer(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    require_role(principal, Role::Organizer)
}

/// Requires an admin
pub fn require_admin(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    require_role(principal, Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), "tester".to_string(), role)
    }

    #[test]
    fn test_unauthenticated_rejected_everywhere() {
        assert!(matches!(
            require_authenticated(None),
            Err(AuthzError::NotAuthenticated)
        ));
        assert!(matches!(
            require_organizer(None),
            Err(AuthzError::NotAuthenticated)
        ));
        assert!(matches!(
            require_admin(None),
            Err(AuthzError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_admin_satisfies_all_guards() {
        let admin = principal(Role::Admin);
        assert!(require_authenticated(Some(&admin)).is_ok());
        assert!(require_organizer(Some(&admin)).is_ok());
        assert!(require_admin(Some(&admin)).is_ok());
    }

    #[test]
    fn test_organizer_cannot_pass_admin_guard() {
        let organizer = principal(Role::Organizer);
        assert!(require_organizer(Some(&organizer)).is_ok());
        assert!(matches!(
            require_admin(Some(&organizer)),
            Err(AuthzError::InsufficientRole {
                required: Role::Admin,
                actual: Role::Organizer
            })
        ));
    }

    #[test]
    fn test_member_only_passes_authentication() {
        let member = principal(Role::User);
        assert!(require_authenticated(Some(&member)).is_ok());
        assert!(require_organizer(Some(&member)).is_err());
        assert!(require_admin(Some(&member)).is_err());
    }
}
