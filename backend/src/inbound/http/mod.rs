//! HTTP inbound adapter exposing REST endpoints.

pub mod animals;
pub mod auth;
pub mod error;
pub mod events;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
