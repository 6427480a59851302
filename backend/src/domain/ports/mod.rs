//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, queue, search, token signing, hashing) are
//! implemented in `outbound`; driving ports (`*Command`/`*Query`) are
//! implemented by the domain services and consumed by `inbound::http`.

mod macros;
pub(crate) use macros::define_port_error;

mod answer_command;
mod answer_query;
mod answer_repository;
mod credential_hasher;
mod message_queue;
mod notification_outbox;
mod question_command;
mod question_query;
mod question_repository;
mod search_index;
mod search_query;
mod subscription_command;
mod subscription_repository;
mod token_service;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use answer_command::MockAnswerCommand;
pub use answer_command::AnswerCommand;
#[cfg(test)]
pub use answer_query::MockAnswerQuery;
pub use answer_query::AnswerQuery;
#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
pub use answer_repository::{AnswerPersistenceError, AnswerRepository};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
#[cfg(test)]
pub use message_queue::MockMessageQueue;
pub use message_queue::{MessageQueue, MessageQueueError};
#[cfg(test)]
pub use notification_outbox::MockNotificationOutbox;
pub use notification_outbox::{NotificationOutbox, OutboxError};
#[cfg(test)]
pub use question_command::MockQuestionCommand;
pub use question_command::QuestionCommand;
#[cfg(test)]
pub use question_query::MockQuestionQuery;
pub use question_query::QuestionQuery;
#[cfg(test)]
pub use question_repository::MockQuestionRepository;
pub use question_repository::{QuestionPersistenceError, QuestionRepository};
#[cfg(test)]
pub use search_index::MockSearchIndex;
pub use search_index::{SearchIndex, SearchIndexError, SearchKind};
#[cfg(test)]
pub use search_query::MockSearchQuery;
pub use search_query::SearchQuery;
#[cfg(test)]
pub use subscription_command::MockSubscriptionCommand;
pub use subscription_command::SubscriptionCommand;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{SubscriptionPersistenceError, SubscriptionRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{
    LoginOutcome, PasswordChange, RegisterUserRequest, ResetPasswordRequest, UpdateUserRequest,
    UserCommand,
};
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::UserQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
