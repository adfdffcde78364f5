// ============================================================================
// Infrastructure Layer - Concrete Adapters
// ============================================================================
//
// Implementations of the ports the core consumes: PostgreSQL persistence for
// the aggregate, the event log and the read model.
//
// ============================================================================

pub mod postgres;
pub mod read_model;

pub use postgres::{PostgresEventStore, PostgresUserReadModelStore, PostgresUserRepository};
pub use read_model::{UserReadModel, UserReadModelStore};
