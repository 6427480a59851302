//! Domain primitives, policy, services, and ports.
//!
//! Purpose: keep the forum's rules (ownership checks, vote counting, answer
//! back-references, notification scheduling) independent of HTTP and
//! storage. Inbound adapters call the driving ports in [`ports`]; the
//! services below implement them on top of the driven ports.
//!
//! Public surface:
//! - Entities: [`User`], [`Question`], [`Answer`], [`Subscription`],
//!   [`OutboxEvent`].
//! - Policy: [`authorize`] with [`Role`] and [`AccessDecision`].
//! - Errors: [`Error`] and [`ErrorCode`].
//! - Services: [`UserService`], [`QuestionService`], [`AnswerService`],
//!   [`SubscriptionService`], [`SearchService`], [`NotificationDispatcher`].

pub mod answer;
pub mod answer_service;
pub mod auth;
pub mod authorization;
pub mod error;
pub mod ids;
pub mod notification;
pub mod notification_dispatcher;
pub mod ports;
pub mod question;
pub mod question_service;
pub mod search_service;
mod store_errors;
pub mod subscription;
pub mod subscription_service;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod vote;

pub use self::answer::Answer;
pub use self::answer_service::AnswerService;
pub use self::auth::{
    AuthToken, Caller, LoginCredentials, Password, PasswordValidationError,
};
pub use self::authorization::{AccessDecision, Role, authorize};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{AnswerId, IdParseError, OutboxEventId, QuestionId, SubscriptionId, UserId};
pub use self::notification::{
    DeliveryFailure, OutboxEvent, PASSWORD_RESET_QUEUE, QUESTION_ANSWERED_QUEUE,
};
pub use self::notification_dispatcher::{
    DispatchReport, DispatcherConfig, NotificationDispatcher,
};
pub use self::question::{EmptyPostText, PostText, Question};
pub use self::question_service::QuestionService;
pub use self::search_service::{SearchMirror, SearchService};
pub use self::subscription::Subscription;
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PasswordDigest, PersonName, User, UserProfile, UserValidationError,
};
pub use self::user_service::{PasswordResetMailer, UserService};
pub use self::vote::{VoteDirection, VoteDirectionError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use qanda::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("Question not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
