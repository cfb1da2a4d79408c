//! Control messages and the lock-free queue that carries them to the audio
//! thread.
//!
//! A control message names one parameter and a normalized value. Producers
//! (a MIDI callback, a CLI thread, a test) push messages into a
//! single-producer single-consumer ring buffer; the consumer side is drained
//! by the [`CallbackDispatcher`](crate::CallbackDispatcher) at the start of
//! each block, or by a poller thread when no audio stream is running.

use ringbuf::{HeapCons, HeapProd, HeapRb, traits::*};

use crate::params::ParameterStore;

/// Default number of queued control messages.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Parameter addressed by a [`ControlMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlTarget {
    /// Normalized delay target.
    Delay,
    /// Feedback amount.
    Feedback,
    /// Filter coefficient.
    Filter,
}

impl ControlTarget {
    /// Lowercase parameter name used in logs and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Feedback => "feedback",
            Self::Filter => "filter",
        }
    }
}

impl core::fmt::Display for ControlTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A request to set one parameter.
///
/// `value` is not validated here; the [`ParameterStore`] clamps it on apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMessage {
    /// Parameter to update.
    pub target: ControlTarget,
    /// Requested value, nominally in `[0, 1]`.
    pub value: f32,
}

impl ControlMessage {
    /// Create a message for `target`.
    pub const fn new(target: ControlTarget, value: f32) -> Self {
        Self { target, value }
    }
}

/// Producer half of the control queue.
pub struct ControlSender {
    producer: HeapProd<ControlMessage>,
}

impl ControlSender {
    /// Queue a message.
    ///
    /// Returns false if the queue is full; the message is dropped.
    #[inline]
    pub fn send(&mut self, msg: ControlMessage) -> bool {
        self.producer.try_push(msg).is_ok()
    }

    /// Number of free slots.
    pub fn free_slots(&self) -> usize {
        self.producer.vacant_len()
    }
}

impl core::fmt::Debug for ControlSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlSender")
            .field("free_slots", &self.free_slots())
            .finish()
    }
}

/// Consumer half of the control queue.
pub struct ControlReceiver {
    consumer: HeapCons<ControlMessage>,
}

impl ControlReceiver {
    /// Pop a single message.
    #[inline]
    pub fn try_recv(&mut self) -> Option<ControlMessage> {
        self.consumer.try_pop()
    }

    /// Apply every message queued at entry to `params`, oldest first.
    ///
    /// Messages pushed while draining wait for the next call, which bounds
    /// the work done per block. Returns the number applied.
    #[inline]
    pub fn drain_into(&mut self, params: &ParameterStore) -> usize {
        let pending = self.consumer.occupied_len();
        let mut applied = 0;
        while applied < pending {
            let Some(msg) = self.consumer.try_pop() else {
                break;
            };
            params.apply(msg);
            applied += 1;
        }
        applied
    }

    /// Number of queued messages.
    #[inline]
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }
}

impl core::fmt::Debug for ControlReceiver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlReceiver")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Create a control queue holding up to `capacity` messages.
///
/// # Panics
///
/// Panics if `capacity` is 0.
pub fn control_queue(capacity: usize) -> (ControlSender, ControlReceiver) {
    assert!(capacity > 0, "control queue capacity must be > 0");
    let (producer, consumer) = HeapRb::new(capacity).split();
    (ControlSender { producer }, ControlReceiver { consumer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_arrive_in_order() {
        let (mut tx, mut rx) = control_queue(8);
        assert!(tx.send(ControlMessage::new(ControlTarget::Delay, 0.1)));
        assert!(tx.send(ControlMessage::new(ControlTarget::Delay, 0.2)));
        assert_eq!(rx.try_recv().map(|m| m.value), Some(0.1));
        assert_eq!(rx.try_recv().map(|m| m.value), Some(0.2));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn full_queue_rejects_newest() {
        let (mut tx, mut rx) = control_queue(2);
        assert!(tx.send(ControlMessage::new(ControlTarget::Feedback, 0.1)));
        assert!(tx.send(ControlMessage::new(ControlTarget::Feedback, 0.2)));
        assert!(!tx.send(ControlMessage::new(ControlTarget::Feedback, 0.3)));
        assert_eq!(tx.free_slots(), 0);

        let params = ParameterStore::default();
        assert_eq!(rx.drain_into(&params), 2);
        assert_eq!(params.snapshot().feedback, 0.2);
    }

    #[test]
    fn drain_applies_last_value_per_target() {
        let (mut tx, mut rx) = control_queue(16);
        tx.send(ControlMessage::new(ControlTarget::Filter, 0.9));
        tx.send(ControlMessage::new(ControlTarget::Delay, 0.4));
        tx.send(ControlMessage::new(ControlTarget::Filter, 0.3));

        let params = ParameterStore::default();
        assert_eq!(rx.drain_into(&params), 3);
        let s = params.snapshot();
        assert_eq!(s.coefficient, 0.3);
        assert_eq!(s.delay, 0.4);
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn target_names() {
        assert_eq!(ControlTarget::Delay.to_string(), "delay");
        assert_eq!(ControlTarget::Filter.name(), "filter");
    }
}
