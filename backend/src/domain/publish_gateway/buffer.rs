//! Bounded FIFO of envelopes awaiting another publish attempt.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use uuid::Uuid;

use crate::domain::messages::Envelope;

pub(super) struct RetryBuffer {
    capacity: NonZeroUsize,
    pending: VecDeque<Envelope>,
}

impl RetryBuffer {
    pub(super) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            pending: VecDeque::new(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Queue `envelope`, returning the oldest entry if it had to be evicted.
    /// An envelope already queued under the same message id is not duplicated.
    pub(super) fn push(&mut self, envelope: Envelope) -> Option<Envelope> {
        if self
            .pending
            .iter()
            .any(|queued| queued.message_id() == envelope.message_id())
        {
            return None;
        }
        let evicted = if self.pending.len() >= self.capacity.get() {
            self.pending.pop_front()
        } else {
            None
        };
        self.pending.push_back(envelope);
        evicted
    }

    /// Forget the envelope queued under `message_id`, if any.
    pub(super) fn remove(&mut self, message_id: Uuid) -> Option<Envelope> {
        let position = self
            .pending
            .iter()
            .position(|queued| queued.message_id() == message_id)?;
        self.pending.remove(position)
    }

    pub(super) fn drain(&mut self) -> Vec<Envelope> {
        self.pending.drain(..).collect()
    }
}
