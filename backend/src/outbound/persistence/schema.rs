//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lowercased.
    users (id) {
        id -> Uuid,
        firstname -> Text,
        lastname -> Text,
        email -> Text,
        /// Argon2 PHC string.
        password_hash -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    questions (id) {
        id -> Uuid,
        text -> Text,
        author_id -> Uuid,
        views -> Int8,
        up_votes -> Int8,
        down_votes -> Int8,
        /// Answer ids with set semantics; maintained by `array_append`
        /// guarded by `ANY`.
        answer_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    answers (id) {
        id -> Uuid,
        text -> Text,
        author_id -> Uuid,
        question_id -> Uuid,
        up_votes -> Int8,
        down_votes -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Unique on `(user_id, question_id)`.
    subscriptions (id) {
        id -> Uuid,
        user_id -> Uuid,
        question_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Events written alongside the state change that produced them.
    notification_outbox (id) {
        id -> Uuid,
        topic -> Text,
        payload -> Jsonb,
        attempts -> Int4,
        last_error -> Nullable<Text>,
        next_attempt_at -> Timestamptz,
        dispatched_at -> Nullable<Timestamptz>,
        failed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(questions -> users (author_id));
diesel::joinable!(answers -> questions (question_id));
diesel::joinable!(subscriptions -> questions (question_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    questions,
    answers,
    subscriptions,
    notification_outbox,
);
