//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain constructors decide what is valid; these helpers only turn their
//! rejections into 400 responses with `details: {field, code}`.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{
    EmptyPostText, Error, IdParseError, PasswordValidationError, PostText, UserValidationError,
    VoteDirection, VoteDirectionError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidEmail,
    InsecurePassword,
    InvalidUuid,
    InvalidVoteFlag,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InsecurePassword => "insecure_password",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidVoteFlag => "invalid_vote_flag",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse a required identifier from a request body.
pub(crate) fn parse_body_id<T>(value: Option<String>, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    let value = value.ok_or_else(|| missing_field_error(field))?;
    value.parse().map_err(|_| invalid_uuid_error(field, &value))
}

/// Parse an identifier from the URL path.
///
/// Malformed ids cannot name an existing entity, so they are reported as
/// 404 rather than 400.
pub(crate) fn parse_path_id<T>(value: &str) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    value.parse().map_err(|_| {
        Error::not_found("Invalid id passed").with_details(json!({
            "field": "id",
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::InvalidEmail => ErrorCode::InvalidEmail,
        UserValidationError::EmptyFirstname
        | UserValidationError::EmptyLastname
        | UserValidationError::EmptyEmail => ErrorCode::EmptyField,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

pub(crate) fn password_validation_error(field: FieldName, err: PasswordValidationError) -> Error {
    let code = match err {
        PasswordValidationError::Empty => ErrorCode::EmptyField,
        PasswordValidationError::Insecure => ErrorCode::InsecurePassword,
    };
    ValidationError::new(field.as_str(), err.to_string()).with_code(code)
}

/// Validate a question or answer body submitted under `field`.
pub(crate) fn parse_post_text(raw: &str, field: FieldName) -> Result<PostText, Error> {
    PostText::new(raw).map_err(|EmptyPostText| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must not be empty"))
            .with_code(ErrorCode::EmptyField)
    })
}

/// Interpret the `up` query flag of the vote endpoints.
pub(crate) fn parse_vote_flag(flag: Option<&str>) -> Result<VoteDirection, Error> {
    VoteDirection::from_flag(flag).map_err(|err: VoteDirectionError| {
        ValidationError::new("up", err.to_string())
            .with_value(ErrorCode::InvalidVoteFlag, flag.unwrap_or_default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, QuestionId};
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(err: &'a Error, key: &str) -> Option<&'a str> {
        err.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    fn malformed_path_ids_are_not_found() {
        let err = parse_path_id::<QuestionId>("not-a-uuid").expect_err("rejected");
        assert_eq!(err.code(), DomainCode::NotFound);
        assert_eq!(err.message(), "Invalid id passed");
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));
    }

    #[rstest]
    fn body_ids_report_missing_and_malformed_values() {
        let field = FieldName::new("question");

        let missing = parse_body_id::<QuestionId>(None, field).expect_err("missing");
        assert_eq!(detail(&missing, "code"), Some("missing_field"));

        let malformed =
            parse_body_id::<QuestionId>(Some("42".into()), field).expect_err("malformed");
        assert_eq!(malformed.code(), DomainCode::InvalidRequest);
        assert_eq!(malformed.message(), "question must be a valid UUID");
        assert_eq!(detail(&malformed, "value"), Some("42"));
    }

    #[rstest]
    #[case(UserValidationError::EmptyFirstname, "firstname", "empty_field")]
    #[case(UserValidationError::InvalidEmail, "email", "invalid_email")]
    fn user_errors_name_the_field(
        #[case] err: UserValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = user_validation_error(err);
        assert_eq!(detail(&mapped, "field"), Some(field));
        assert_eq!(detail(&mapped, "code"), Some(code));
    }

    #[rstest]
    fn insecure_passwords_keep_the_policy_message() {
        let err = password_validation_error(
            FieldName::new("password"),
            PasswordValidationError::Insecure,
        );
        assert_eq!(err.message(), "Password is not secure enough");
        assert_eq!(detail(&err, "code"), Some("insecure_password"));
    }

    #[rstest]
    fn blank_post_text_names_the_payload_field() {
        let err = parse_post_text("   ", FieldName::new("answer")).expect_err("blank");
        assert_eq!(err.message(), "answer must not be empty");
        assert_eq!(detail(&err, "field"), Some("answer"));
    }

    #[rstest]
    #[case(None, VoteDirection::Up)]
    #[case(Some("0"), VoteDirection::Down)]
    #[case(Some("true"), VoteDirection::Up)]
    fn vote_flags_parse(#[case] flag: Option<&str>, #[case] expected: VoteDirection) {
        assert_eq!(parse_vote_flag(flag).expect("valid"), expected);
    }

    #[rstest]
    fn unknown_vote_flags_are_bad_requests() {
        let err = parse_vote_flag(Some("sideways")).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&err, "field"), Some("up"));
        assert_eq!(detail(&err, "value"), Some("sideways"));
    }
}
