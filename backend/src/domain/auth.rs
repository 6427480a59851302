//! Authentication primitives: passwords, login credentials, and the
//! authenticated caller identity carried by session tokens.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{EmailAddress, User, UserId, UserValidationError};

/// Raised when a plaintext password breaks the password policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    Empty,
    Insecure,
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "password must not be empty"),
            Self::Insecure => write!(f, "Password is not secure enough"),
        }
    }
}

impl std::error::Error for PasswordValidationError {}

static PASSWORD_RE: OnceLock<Regex> = OnceLock::new();

fn password_regex() -> &'static Regex {
    PASSWORD_RE.get_or_init(|| {
        Regex::new("^[a-zA-Z0-9]{3,30}$")
            .unwrap_or_else(|error| panic!("password regex failed to compile: {error}"))
    })
}

/// Plaintext password held in zeroising memory.
///
/// ## Invariants
/// - 3 to 30 ASCII letters or digits.
///
/// # Examples
/// ```
/// use qanda::domain::Password;
///
/// assert!(Password::new("abc123").is_ok());
/// assert!(Password::new("ab").is_err());
/// assert!(Password::new("has space").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(raw: &str) -> Result<Self, PasswordValidationError> {
        if raw.is_empty() {
            return Err(PasswordValidationError::Empty);
        }
        if !password_regex().is_match(raw) {
            return Err(PasswordValidationError::Insecure);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Wrap a submitted password without applying the policy.
    ///
    /// Used for credentials being checked against an existing hash, where
    /// policy failures must look identical to a wrong password.
    pub fn unchecked(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::unchecked(password),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Identity of an authenticated caller, as carried in the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub user_id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            firstname: user.firstname.as_ref().to_owned(),
            lastname: user.lastname.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            is_admin: user.is_admin,
        }
    }
}

/// Signed session token handed to clients after login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}
