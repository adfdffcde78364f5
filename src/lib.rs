// ============================================================================
// User Management - Event-Sourcing-Flavored CQRS Bounded Context
// ============================================================================
//
// Layer map:
// - domain/          aggregates, value objects, events, domain services
// - event_sourcing/  generic event store port, dispatcher, event contract
// - application/     command/query handlers and read-model projections
// - infrastructure/  PostgreSQL adapters for the ports
// - api/             actix-web HTTP surface
// - metrics/         Prometheus registry
//
// The binary in src/main.rs wires the graph together and runs the server.
//
// ============================================================================

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod infrastructure;
pub mod metrics;

#[cfg(test)]
pub(crate) mod testing;
