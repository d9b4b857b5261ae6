//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

#[cfg(test)]
pub mod test_support;

/// Public OpenAPI surface used by docs endpoints and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
