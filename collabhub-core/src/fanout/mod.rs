/// Event fanout: domain events and the engine that reacts to them
///
/// Mutations in the operations layer construct a [`DomainEvent`] and hand it
/// to [`engine::dispatch`] inside their own transaction. The engine is the
/// only writer of activity and notification rows.

pub mod engine;
pub mod event;

pub use event::DomainEvent;
