//! Per-user JSON preference documents over HTTP.
//!
//! The [`domain`] holds normalisation and insert-or-update policy; [`inbound`]
//! exposes it over Actix, and [`outbound`] persists it with Diesel.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
