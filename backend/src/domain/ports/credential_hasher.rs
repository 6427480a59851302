//! Port for password hashing.
use crate::domain::{Password, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Hashing failures unrelated to a password mismatch.
    pub enum CredentialHashError {
        /// Hash computation failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored digest could not be parsed.
        CorruptDigest { message: String } => "stored password digest is unreadable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<PasswordDigest, CredentialHashError>;

    /// `Ok(false)` on mismatch.
    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, CredentialHashError>;
}
