//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories here are thin: they translate between Diesel rows and domain
//! entities and map driver failures to port errors. Row structs and the
//! schema stay private to this module.
//!
//! ```no_run
//! use qanda::outbound::persistence::{
//!     DbPool, DieselUserRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn wire() -> Result<(), qanda::outbound::persistence::PoolError> {
//! let url = "postgres://forum@localhost/forum";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_answer_repository;
mod diesel_notification_outbox;
mod diesel_question_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_answer_repository::DieselAnswerRepository;
pub use diesel_notification_outbox::DieselNotificationOutbox;
pub use diesel_question_repository::DieselQuestionRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
