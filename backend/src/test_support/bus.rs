//! In-memory bus double that records traffic and fails on demand.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{EncodedMessage, MessageBus, MessageBusError};

#[derive(Default)]
pub struct RecordingBus {
    published: Mutex<Vec<EncodedMessage>>,
    failures: Mutex<Vec<(String, MessageBusError)>>,
    attempts: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingBus {
    /// Bus that holds each publish for `delay` so overlap is observable.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Fail every publish whose payload contains `needle`.
    pub fn fail_when_payload_contains(&self, needle: impl Into<String>, error: MessageBusError) {
        self.failures
            .lock()
            .expect("failures mutex")
            .push((needle.into(), error));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().expect("failures mutex").clear();
    }

    pub fn published(&self) -> Vec<EncodedMessage> {
        self.published.lock().expect("published mutex").clone()
    }

    pub fn published_topics(&self) -> Vec<&'static str> {
        self.published().iter().map(|message| message.topic).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self, message: &EncodedMessage) -> Option<MessageBusError> {
        let payload = String::from_utf8_lossy(&message.payload);
        self.failures
            .lock()
            .expect("failures mutex")
            .iter()
            .find(|(needle, _)| payload.contains(needle.as_str()))
            .map(|(_, error)| error.clone())
    }
}

#[async_trait]
impl MessageBus for RecordingBus {
    async fn publish(&self, message: &EncodedMessage) -> Result<(), MessageBusError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.scripted_failure(message) {
            return Err(error);
        }
        self.published
            .lock()
            .expect("published mutex")
            .push(message.clone());
        Ok(())
    }
}
