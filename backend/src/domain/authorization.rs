//! Single authorization predicate shared by every mutating operation.

use super::{Caller, UserId};

/// Minimum role an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any authenticated user. When the target has an owner, only that owner
    /// (or an admin) passes.
    Member,
    /// Administrators only.
    Admin,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `caller` may act on a resource owned by `owner`.
///
/// Admins pass every check. Members pass when the resource has no owner, or
/// when they own it.
///
/// # Examples
/// ```
/// use qanda::domain::{authorize, AccessDecision, Caller, Role, UserId};
///
/// let caller = Caller {
///     user_id: UserId::random(),
///     firstname: "A".into(),
///     lastname: "B".into(),
///     email: "a@b.com".into(),
///     is_admin: false,
/// };
/// assert_eq!(authorize(&caller, None, Role::Member), AccessDecision::Allow);
/// assert_eq!(authorize(&caller, Some(&UserId::random()), Role::Member), AccessDecision::Deny);
/// assert_eq!(authorize(&caller, None, Role::Admin), AccessDecision::Deny);
/// ```
pub fn authorize(caller: &Caller, owner: Option<&UserId>, required: Role) -> AccessDecision {
    let allowed = caller.is_admin
        || match required {
            Role::Admin => false,
            Role::Member => owner.is_none_or(|owner| *owner == caller.user_id),
        };
    if allowed {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny
    }
}
