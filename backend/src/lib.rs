//! Question-and-answer forum backend.
//!
//! Layout follows a hexagonal split: [`domain`] owns entities, authorization
//! policy, services, and ports; [`inbound`] adapts HTTP requests onto the
//! driving ports; [`outbound`] implements the driven ports against
//! PostgreSQL, the message broker, and the search engine.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::Trace;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
