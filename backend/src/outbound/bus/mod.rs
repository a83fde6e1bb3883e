//! In-process message bus backed by a bounded tokio channel.
//!
//! `ChannelBus` implements the `MessageBus` port for the replay binary and
//! integration tests. Sends never wait for capacity: a full channel reports
//! `Busy` and a dropped subscription reports `Unavailable`, so the gateway
//! classifies both as transient.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

use crate::domain::ports::{EncodedMessage, MessageBus, MessageBusError};

/// Publishing half of the in-process bus.
#[derive(Debug, Clone)]
pub struct ChannelBus {
    sender: mpsc::Sender<EncodedMessage>,
}

/// Consuming half of the in-process bus.
#[derive(Debug)]
pub struct BusSubscription {
    receiver: mpsc::Receiver<EncodedMessage>,
}

impl ChannelBus {
    /// Open a bus holding at most `capacity` undelivered messages.
    pub fn open(capacity: usize) -> (Self, BusSubscription) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, BusSubscription { receiver })
    }
}

#[async_trait]
impl MessageBus for ChannelBus {
    async fn publish(&self, message: &EncodedMessage) -> Result<(), MessageBusError> {
        match self.sender.try_send(message.clone()) {
            Ok(()) => {
                trace!(message_id = %message.message_id, topic = message.topic, "queued on channel bus");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(MessageBusError::busy(format!(
                "channel bus at capacity {}",
                self.sender.max_capacity()
            ))),
            Err(TrySendError::Closed(_)) => {
                Err(MessageBusError::unavailable("channel bus subscription closed"))
            }
        }
    }
}

impl BusSubscription {
    /// Wait for the next message; `None` once every `ChannelBus` is dropped.
    pub async fn recv(&mut self) -> Option<EncodedMessage> {
        self.receiver.recv().await
    }

    /// Take every message currently queued without waiting.
    pub fn drain(&mut self) -> Vec<EncodedMessage> {
        let mut drained = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            drained.push(message);
        }
        drained
    }

    /// Stop accepting messages; later publishes fail as unavailable.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
