//! Account use-cases: registration, login, profile and password changes, and
//! the forgot/reset password flow.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{Instrument, debug, warn};
use url::Url;

use super::ports::{
    CredentialHashError, CredentialHasher, LoginOutcome, MessageQueue, PasswordChange,
    RegisterUserRequest, ResetPasswordRequest, TokenService, UpdateUserRequest, UserCommand,
    UserQuery, UserRepository,
};
use super::store_errors::user_store;
use super::{
    Caller, EmailAddress, Error, LoginCredentials, PASSWORD_RESET_QUEUE, Password,
    PasswordDigest, Role, SearchMirror, User, UserId, UserProfile, authorize,
};

const BAD_CREDENTIALS: &str = "Email or Password is Incorrect";
const USER_NOT_FOUND: &str = "User does not exist";
const PASSWORDS_DIFFER: &str = "Passwords do not match";
const DUMMY_PASSWORD: &str = "timingequaliser0";

/// Publishes password reset mails without holding up the request.
#[derive(Clone)]
pub struct PasswordResetMailer {
    queue: Arc<dyn MessageQueue>,
    reset_endpoint: Url,
}

impl PasswordResetMailer {
    /// Build a mailer whose links point at `app_url`.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use qanda::outbound::queue::LoggingQueue;
    /// use qanda::domain::PasswordResetMailer;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://forum.example.com").unwrap();
    /// let mailer = PasswordResetMailer::new(Arc::new(LoggingQueue), &base).unwrap();
    /// assert_eq!(
    ///     mailer.reset_link("a@b.com"),
    ///     "https://forum.example.com/api/v1/users/reset-password?email=a%40b.com"
    /// );
    /// ```
    pub fn new(queue: Arc<dyn MessageQueue>, app_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            queue,
            reset_endpoint: app_url.join("api/v1/users/reset-password")?,
        })
    }

    pub fn reset_link(&self, email: &str) -> String {
        let mut link = self.reset_endpoint.clone();
        link.query_pairs_mut().append_pair("email", email);
        link.into()
    }

    /// Queue the mail on a detached task. Failures are logged and dropped.
    pub fn send(&self, email: &EmailAddress) {
        let queue = Arc::clone(&self.queue);
        let payload = json!({
            "email": email.as_ref(),
            "resetLink": self.reset_link(email.as_ref()),
        });
        tokio::spawn(
            async move {
                if let Err(error) = queue.publish(PASSWORD_RESET_QUEUE, &payload).await {
                    warn!(%error, "password reset mail could not be queued");
                }
            }
            .in_current_span(),
        );
    }
}

/// User service implementing [`UserCommand`] and [`UserQuery`].
#[derive(Clone)]
pub struct UserService<U> {
    users: Arc<U>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    mailer: PasswordResetMailer,
    search: SearchMirror,
    clock: Arc<dyn Clock>,
    dummy_digest: Arc<OnceLock<PasswordDigest>>,
}

impl<U> UserService<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        mailer: PasswordResetMailer,
        search: SearchMirror,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            mailer,
            search,
            clock,
            dummy_digest: Arc::new(OnceLock::new()),
        }
    }
}

impl<U: UserRepository> UserService<U> {
    async fn existing(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(user_store)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    /// Run `work` on the blocking pool; Argon2 must not stall the worker.
    async fn off_worker<T, F>(&self, work: F) -> Result<Result<T, CredentialHashError>, Error>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CredentialHasher) -> Result<T, CredentialHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(hasher.as_ref()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))
    }

    async fn hash(&self, password: &Password) -> Result<PasswordDigest, Error> {
        let password = password.clone();
        self.off_worker(move |hasher| hasher.hash(&password))
            .await?
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    async fn verify(&self, password: &Password, digest: &PasswordDigest) -> Result<bool, Error> {
        let (password, digest) = (password.clone(), digest.clone());
        self.off_worker(move |hasher| hasher.verify(&password, &digest))
            .await?
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))
    }

    /// Spend the same hashing effort as a real check for unknown accounts.
    async fn verify_against_dummy(&self, password: &Password) {
        let password = password.clone();
        let dummy = Arc::clone(&self.dummy_digest);
        let outcome = self
            .off_worker(move |hasher| {
                let digest = match dummy.get() {
                    Some(digest) => digest,
                    None => {
                        let digest = hasher.hash(&Password::unchecked(DUMMY_PASSWORD))?;
                        dummy.get_or_init(|| digest)
                    }
                };
                hasher.verify(&password, digest)
            })
            .await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(error)) => debug!(%error, "dummy digest unavailable"),
            Err(error) => debug!(%error, "dummy verification did not run"),
        }
    }

    /// Validate a change request against `user` and hash the new password.
    async fn apply_password_change(
        &self,
        user: &User,
        change: &PasswordChange,
    ) -> Result<PasswordDigest, Error> {
        let new_password = Self::confirmed_password(
            &change.new_password,
            &change.confirm_new_password,
            "newPassword",
        )?;
        if !self.verify(&change.old_password, &user.password).await? {
            return Err(Error::invalid_request("Old password is incorrect")
                .with_details(json!({ "field": "oldPassword", "code": "incorrect" })));
        }
        self.hash(&new_password).await
    }

    fn confirmed_password(
        password: &Password,
        confirmation: &Password,
        field: &str,
    ) -> Result<Password, Error> {
        if password.expose() != confirmation.expose() {
            return Err(Error::invalid_request(PASSWORDS_DIFFER)
                .with_details(json!({ "field": field, "code": "mismatch" })));
        }
        Password::new(password.expose()).map_err(|err| {
            Error::invalid_request("Password is not secure enough")
                .with_details(json!({ "field": field, "code": "insecure", "reason": err.to_string() }))
        })
    }

    async fn ensure_email_free(&self, email: &EmailAddress, owner: &UserId) -> Result<(), Error> {
        let holder = self.users.find_by_email(email).await.map_err(user_store)?;
        match holder {
            Some(other) if other.id != *owner => Err(Error::invalid_request("User already exists")),
            _ => Ok(()),
        }
    }

    fn with_profile(mut user: User, profile: UserProfile) -> User {
        user.firstname = profile.firstname;
        user.lastname = profile.lastname;
        user.email = profile.email;
        user
    }
}

#[async_trait]
impl<U: UserRepository> UserCommand for UserService<U> {
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error> {
        let RegisterUserRequest { profile, password } = request;
        let taken = self
            .users
            .find_by_email(&profile.email)
            .await
            .map_err(user_store)?;
        if taken.is_some() {
            return Err(Error::invalid_request("User already exists"));
        }

        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            firstname: profile.firstname,
            lastname: profile.lastname,
            email: profile.email,
            password: self.hash(&password).await?,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await.map_err(user_store)?;
        self.search.user(&user).await;
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(user_store)?;
        let Some(user) = found else {
            self.verify_against_dummy(credentials.password()).await;
            return Err(Error::invalid_request(BAD_CREDENTIALS));
        };
        if !self.verify(credentials.password(), &user.password).await? {
            return Err(Error::invalid_request(BAD_CREDENTIALS));
        }
        let token = self
            .tokens
            .issue(&Caller::from(&user), self.clock.utc())
            .map_err(|err| Error::internal(format!("token issue failed: {err}")))?;
        Ok(LoginOutcome { user, token })
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        if email.trim().is_empty() {
            return Err(Error::invalid_request("Email is required")
                .with_details(json!({ "field": "email", "code": "required" })));
        }
        let Ok(email) = EmailAddress::new(email) else {
            return Ok(());
        };
        if let Some(user) = self.users.find_by_email(&email).await.map_err(user_store)? {
            self.mailer.send(&user.email);
        }
        Ok(())
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<User, Error> {
        let password =
            Self::confirmed_password(&request.password, &request.confirm_password, "password")?;
        let email =
            EmailAddress::new(&request.email).map_err(|_| Error::not_found(USER_NOT_FOUND))?;
        let mut user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(user_store)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;

        user.password = self.hash(&password).await?;
        user.updated_at = self.clock.utc();
        self.users.update(&user).await.map_err(user_store)?;
        Ok(user)
    }

    async fn update_user(
        &self,
        caller: &Caller,
        request: UpdateUserRequest,
    ) -> Result<User, Error> {
        let UpdateUserRequest {
            user_id,
            profile,
            password_change,
        } = request;
        let current = self.existing(&user_id).await?;
        if !authorize(caller, Some(&current.id), Role::Member).is_allowed() {
            return Err(Error::unauthorized(
                "You do not have required permission to update this user",
            ));
        }
        self.ensure_email_free(&profile.email, &current.id).await?;

        let digest = match &password_change {
            Some(change) => Some(self.apply_password_change(&current, change).await?),
            None => None,
        };
        let mut user = Self::with_profile(current, profile);
        if let Some(digest) = digest {
            user.password = digest;
        }
        user.updated_at = self.clock.utc();
        self.users.update(&user).await.map_err(user_store)?;
        self.search.user(&user).await;
        Ok(user)
    }

    async fn change_password(
        &self,
        caller: &Caller,
        user_id: &UserId,
        change: PasswordChange,
    ) -> Result<User, Error> {
        let mut user = self.existing(user_id).await?;
        if !authorize(caller, Some(&user.id), Role::Member).is_allowed() {
            return Err(Error::unauthorized(
                "You do not have required permission to change this password",
            ));
        }
        user.password = self.apply_password_change(&user, &change).await?;
        user.updated_at = self.clock.utc();
        self.users.update(&user).await.map_err(user_store)?;
        Ok(user)
    }
}

#[async_trait]
impl<U: UserRepository> UserQuery for UserService<U> {
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(user_store)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.existing(id).await
    }
}
