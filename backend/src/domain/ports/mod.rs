//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod change_notifications;
mod message_bus;
mod snapshot_loader;

#[cfg(test)]
pub use change_notifications::MockChangeNotificationCommand;
pub use change_notifications::{ChangeNotificationCommand, ScheduleUpdateOutcome};
#[cfg(test)]
pub use message_bus::MockMessageBus;
pub use message_bus::{EncodedMessage, MessageBus, MessageBusError};
#[cfg(test)]
pub use snapshot_loader::MockSnapshotLoader;
pub use snapshot_loader::{SnapshotLoader, SnapshotLoaderError};
