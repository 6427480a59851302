//! Port for issuing and verifying session tokens.
use chrono::{DateTime, Utc};

use crate::domain::{AuthToken, Caller};

use super::define_port_error;

define_port_error! {
    /// Token failures.
    pub enum TokenError {
        /// The token is not in the expected shape.
        Malformed => "token is malformed",
        /// The signature does not match the claims.
        InvalidSignature => "token signature is invalid",
        /// The token is past its expiry.
        Expired => "token has expired",
        /// Claims could not be encoded.
        Encoding { message: String } => "token could not be encoded: {message}",
    }
}

/// Signs caller claims and verifies presented tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<AuthToken, TokenError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, TokenError>;
}
