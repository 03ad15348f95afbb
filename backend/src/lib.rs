//! edUmeetup backend library.
//!
//! The crate follows a hexagonal layout: `domain` owns entities, services and
//! the driven ports; `inbound::http` adapts actix-web requests onto the
//! services; `outbound` implements the ports against PostgreSQL, the email
//! provider and the upload store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
