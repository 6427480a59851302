//! Strongly typed entity identifiers.
//!
//! Every aggregate is keyed by a UUIDv4 minted in the domain. Separate
//! newtypes keep a question id from being passed where an answer id is
//! expected.

use uuid::Uuid;

/// Raised when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdParseError {
    kind: &'static str,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its hyphenated string form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdParseError> {
                Uuid::parse_str(raw.as_ref().trim())
                    .map(Self)
                    .map_err(|_| IdParseError { kind: $kind })
            }

            /// Mint a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user.
    UserId,
    "user id"
);
entity_id!(
    /// Identifier of a question.
    QuestionId,
    "question id"
);
entity_id!(
    /// Identifier of an answer.
    AnswerId,
    "answer id"
);
entity_id!(
    /// Identifier of a subscription.
    SubscriptionId,
    "subscription id"
);
entity_id!(
    /// Identifier of a pending notification in the outbox.
    OutboxEventId,
    "outbox event id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ")]
    fn parses_uuid_strings(#[case] raw: &str) {
        let id = QuestionId::new(raw).expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn rejection_names_the_identifier_kind() {
        let err = AnswerId::new("5e8f1c").expect_err("not a uuid");
        assert_eq!(err.to_string(), "answer id must be a valid UUID");
    }

    #[test]
    fn serialises_as_a_plain_string() {
        let id = UserId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
