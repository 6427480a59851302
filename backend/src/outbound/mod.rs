//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories and outbox using Diesel
//! - **memory**: process-local store implementing the same ports
//! - **token**: HMAC-signed session tokens
//! - **hashing**: Argon2id password digests
//! - **queue**: RabbitMQ publisher and a logging fallback
//! - **search**: Meilisearch index and an in-memory fallback
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod hashing;
pub mod memory;
pub mod persistence;
pub mod queue;
pub mod search;
pub mod token;
