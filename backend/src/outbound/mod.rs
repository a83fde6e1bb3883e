//! Outbound adapters implementing domain ports.
//!
//! - **bus**: bounded tokio-channel `MessageBus` with an explicit subscription
//! - **snapshots**: in-memory `SnapshotLoader` indexed from a JSON fixture
//!
//! Adapters translate between domain types and their backing store. They
//! contain no pipeline logic.

pub mod bus;
pub mod snapshots;
