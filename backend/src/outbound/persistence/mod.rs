//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain ports backed
//! by PostgreSQL via the Diesel ORM with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Lifecycle preconditions are re-verified
//!   under row locks, but policy decisions live in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Atomic audit**: Audit entries produced by a state change are inserted
//!   inside the same transaction as the change itself.
//! - **Strongly typed errors**: All database errors are mapped to the port
//!   error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselAnimalRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/mydb");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselAnimalRepository::new(pool);
//! ```

mod diesel_actor_directory;
mod diesel_animal_repository;
mod diesel_audit_log;
mod diesel_scheduling_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_actor_directory::DieselActorDirectory;
pub use diesel_animal_repository::DieselAnimalRepository;
pub use diesel_audit_log::DieselAuditLog;
pub use diesel_scheduling_repository::DieselSchedulingRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
