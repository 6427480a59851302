//! HTTP inbound adapter exposing the forum's REST endpoints.
//!
//! Every route except the health probes is mounted under `/api/v1` by
//! [`configure`]. Responses use the `{message, body}` envelope from
//! [`envelope`]; failures go through the [`error`] mapping.

pub mod answers;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod health;
pub mod questions;
pub mod schemas;
pub mod search;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use qanda::inbound::http::configure;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .service(users::register)
        .service(users::login)
        .service(users::forgot_password)
        .service(users::reset_password)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::change_password)
        .service(questions::create_question)
        .service(questions::list_questions)
        .service(questions::get_question)
        .service(questions::update_question)
        .service(questions::vote_question)
        .service(answers::create_answer)
        .service(answers::list_answers)
        .service(answers::answers_for_question)
        .service(answers::get_answer)
        .service(answers::update_answer)
        .service(answers::vote_answer)
        .service(subscriptions::subscribe)
        .service(subscriptions::list_subscribers)
        .service(search::search_users)
        .service(search::search_questions)
        .service(search::search_answers);
}
