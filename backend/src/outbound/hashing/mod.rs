//! Argon2id password hashing.

use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
    SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::ports::{CredentialHashError, CredentialHasher};
use crate::domain::{Password, PasswordDigest};

/// Stores passwords as Argon2id PHC strings.
///
/// Verification reads the parameters embedded in each digest, so digests
/// produced with older settings keep verifying after a parameter change.
#[derive(Clone, Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    /// Hasher using the crate's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters, e.g. cheap ones for tests.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &Password) -> Result<PasswordDigest, CredentialHashError> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let hash = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(PasswordDigest::new(hash.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, CredentialHashError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|err| CredentialHashError::corrupt_digest(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(CredentialHashError::hashing(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2CredentialHasher {
        Argon2CredentialHasher::with_params(8, 1, 1).expect("valid params")
    }

    #[rstest]
    fn digests_verify_only_the_original_password(hasher: Argon2CredentialHasher) {
        let digest = hasher
            .hash(&Password::new("abc123").expect("valid"))
            .expect("hashed");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(
            hasher
                .verify(&Password::unchecked("abc123"), &digest)
                .expect("verified")
        );
        assert!(
            !hasher
                .verify(&Password::unchecked("abc124"), &digest)
                .expect("verified")
        );
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2CredentialHasher) {
        let password = Password::new("abc123").expect("valid");
        let first = hasher.hash(&password).expect("hashed");
        let second = hasher.hash(&password).expect("hashed");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn unreadable_digests_are_reported(hasher: Argon2CredentialHasher) {
        let err = hasher
            .verify(&Password::unchecked("abc123"), &PasswordDigest::new("plaintext"))
            .expect_err("corrupt");
        assert!(matches!(err, CredentialHashError::CorruptDigest { .. }));
    }

    #[rstest]
    fn zero_iterations_are_rejected() {
        assert!(Argon2CredentialHasher::with_params(8, 0, 1).is_err());
    }
}
