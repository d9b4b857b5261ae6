//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic;
//! the lifecycle preconditions they re-verify under row locks mirror checks
//! the domain service has already made against a possibly stale read.

pub mod persistence;
