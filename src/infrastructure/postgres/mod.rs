// ============================================================================
// PostgreSQL Adapters
// ============================================================================
//
// Concrete implementations of the persistence ports: aggregate repository,
// event store and read-model store, all sharing one PgPool.
//
// ============================================================================

pub mod event_store;
pub mod read_model;
pub mod repository;

pub use event_store::PostgresEventStore;
pub use read_model::PostgresUserReadModelStore;
pub use repository::PostgresUserRepository;

/// True when `err` is a violation of the named unique constraint.
pub(crate) fn violates_constraint(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|name| name == constraint)
}
