//! Driving port for reading user accounts.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Fails with `not_found` ("User does not exist").
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;
}
