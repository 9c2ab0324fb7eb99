//! Lampi web backend library modules.
//!
//! Hexagonal layout: `domain` holds the device model and ports, `inbound`
//! exposes the HTTP surface, `outbound` implements the ports against
//! PostgreSQL and Redis, and `middleware` carries cross-cutting Actix
//! middleware.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
