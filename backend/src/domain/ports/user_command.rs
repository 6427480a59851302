//! Driving port for account mutations: registration, login, profile edits,
//! and both password flows.
//!
//! Inbound adapters validate request shape, build the request types below,
//! and hand them to this port. Ownership checks, hashing, and duplicate
//! detection happen behind it.

use async_trait::async_trait;

use crate::domain::{AuthToken, Caller, Error, LoginCredentials, Password, User, UserId, UserProfile};

/// New account details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    pub profile: UserProfile,
    pub password: Password,
}

/// Old/new password triple submitted when changing a password.
///
/// All three are held unchecked; the service applies the policy to the new
/// password after confirming the pair matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub old_password: Password,
    pub new_password: Password,
    pub confirm_new_password: Password,
}

/// Profile edit, optionally carrying a password change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub user_id: UserId,
    pub profile: UserProfile,
    pub password_change: Option<PasswordChange>,
}

/// Completion of the forgot-password flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    /// Raw email from the reset link.
    pub email: String,
    pub password: Password,
    pub confirm_password: Password,
}

/// Successful login: the account and its freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub token: AuthToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Create an account. Duplicate emails are rejected with
    /// `invalid_request` ("User already exists").
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error>;

    /// Check credentials and sign a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Enqueue a reset mail when `email` belongs to an account.
    ///
    /// Succeeds whether or not the account exists.
    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<User, Error>;

    /// Owner or admin only.
    async fn update_user(&self, caller: &Caller, request: UpdateUserRequest)
    -> Result<User, Error>;

    /// Owner or admin only.
    async fn change_password(
        &self,
        caller: &Caller,
        user_id: &UserId,
        change: PasswordChange,
    ) -> Result<User, Error>;
}
