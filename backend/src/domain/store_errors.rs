//! Translation of driven-port failures into domain errors.
//!
//! Connection failures surface as `service_unavailable`; everything else the
//! caller cannot act on becomes `internal`.

use super::Error;
use super::ports::{
    AnswerPersistenceError, QuestionPersistenceError, SearchIndexError,
    SubscriptionPersistenceError, UserPersistenceError,
};

pub(crate) fn user_store(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::invalid_request("User already exists"),
        UserPersistenceError::Missing => Error::not_found("User does not exist"),
    }
}

pub(crate) fn question_store(error: QuestionPersistenceError) -> Error {
    match error {
        QuestionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("question repository unavailable: {message}"))
        }
        QuestionPersistenceError::Query { message } => {
            Error::internal(format!("question repository error: {message}"))
        }
    }
}

pub(crate) fn answer_store(error: AnswerPersistenceError) -> Error {
    match error {
        AnswerPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("answer repository unavailable: {message}"))
        }
        AnswerPersistenceError::Query { message } => {
            Error::internal(format!("answer repository error: {message}"))
        }
        AnswerPersistenceError::QuestionMissing { .. } => Error::not_found("Question not found"),
    }
}

pub(crate) fn subscription_store(error: SubscriptionPersistenceError) -> Error {
    match error {
        SubscriptionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        SubscriptionPersistenceError::Query { message } => {
            Error::internal(format!("subscription repository error: {message}"))
        }
    }
}

pub(crate) fn search_backend(error: SearchIndexError) -> Error {
    match error {
        SearchIndexError::Unavailable { message } | SearchIndexError::Query { message } => {
            Error::service_unavailable(format!("search engine unavailable: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate_email(), ErrorCode::InvalidRequest)]
    #[case(UserPersistenceError::missing(), ErrorCode::NotFound)]
    fn user_errors_map_to_codes(#[case] error: UserPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(user_store(error).code(), code);
    }

    #[test]
    fn missing_question_during_answer_is_not_found() {
        let err = answer_store(AnswerPersistenceError::question_missing("q"));
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Question not found");
    }

    #[rstest]
    #[case(SearchIndexError::unavailable("down"))]
    #[case(SearchIndexError::query("bad index"))]
    fn search_failures_are_unavailable(#[case] error: SearchIndexError) {
        assert_eq!(search_backend(error).code(), ErrorCode::ServiceUnavailable);
    }
}
