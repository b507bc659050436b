//! Coalescing notification hub.
//!
//! Membership changes only mark the hub pending. A flush turns any number of
//! pending changes into exactly one [`MediaEvent`], pushed to every stream and
//! handed back to the caller together with a snapshot of the callbacks.
//! Callbacks are invoked by the caller after releasing its borrow of the hub.

use std::rc::Rc;

use crossbeam_channel::{bounded, Sender, TrySendError};

use super::events::{MediaEvent, SubscriptionId};
use super::stream::MediaStream;

/// Callback invoked on every delivered notification.
pub type ChangeCallback = Rc<dyn Fn(&MediaEvent)>;

pub(crate) struct NotificationHub {
    callbacks: Vec<(SubscriptionId, ChangeCallback)>,
    streams: Vec<(SubscriptionId, Sender<MediaEvent>)>,
    stream_capacity: usize,
    pending: bool,
    sequence: u64,
    dropped_events: u64,
}

impl NotificationHub {
    pub(crate) fn new(stream_capacity: usize) -> Self {
        Self {
            callbacks: Vec::new(),
            streams: Vec::new(),
            stream_capacity: stream_capacity.max(1),
            pending: false,
            sequence: 0,
            dropped_events: 0,
        }
    }

    pub(crate) fn add_callback(&mut self, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove_callback(&mut self, id: SubscriptionId) -> Option<ChangeCallback> {
        let pos = self.callbacks.iter().position(|(cid, _)| *cid == id)?;
        Some(self.callbacks.remove(pos).1)
    }

    pub(crate) fn open_stream(&mut self) -> MediaStream {
        let id = SubscriptionId::new();
        let (tx, rx) = bounded(self.stream_capacity);
        self.streams.push((id, tx));
        MediaStream::new(id, rx)
    }

    pub(crate) fn mark_pending(&mut self) {
        self.pending = true;
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.callbacks.len() + self.streams.len()
    }

    pub(crate) const fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Consumes the pending flag. Streams receive the event here; callbacks
    /// are returned for the caller to run.
    pub(crate) fn take_pending(&mut self) -> Option<(MediaEvent, Vec<ChangeCallback>)> {
        if !std::mem::replace(&mut self.pending, false) {
            return None;
        }

        self.sequence += 1;
        let event = MediaEvent::new(self.sequence);

        let mut dropped = 0u64;
        self.streams.retain(|(_, tx)| match tx.try_send(event.clone()) {
            Ok(()) => true,
            // Never block delivery on a slow subscriber.
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        self.dropped_events += dropped;

        let callbacks = self.callbacks.iter().map(|(_, cb)| Rc::clone(cb)).collect();
        Some((event, callbacks))
    }

    /// Drops pending state and every subscriber. Returned callbacks must be
    /// dropped by the caller outside any borrow of the hub.
    pub(crate) fn close(&mut self) -> Vec<ChangeCallback> {
        self.pending = false;
        self.streams.clear();
        std::mem::take(&mut self.callbacks)
            .into_iter()
            .map(|(_, cb)| cb)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn take_pending_coalesces() {
        let mut hub = NotificationHub::new(8);
        assert!(hub.take_pending().is_none());

        hub.mark_pending();
        hub.mark_pending();
        hub.mark_pending();
        let (event, _) = hub.take_pending().unwrap();
        assert_eq!(event.sequence, 1);
        assert!(hub.take_pending().is_none());
    }

    #[test]
    fn streams_receive_and_full_streams_count_drops() {
        let mut hub = NotificationHub::new(1);
        let stream = hub.open_stream();

        hub.mark_pending();
        hub.take_pending().unwrap();
        hub.mark_pending();
        hub.take_pending().unwrap();

        assert_eq!(stream.len(), 1);
        assert_eq!(hub.dropped_events(), 1);
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn disconnected_streams_are_pruned() {
        let mut hub = NotificationHub::new(4);
        drop(hub.open_stream());
        assert_eq!(hub.subscriber_count(), 1);

        hub.mark_pending();
        hub.take_pending().unwrap();
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.dropped_events(), 0);
    }

    #[test]
    fn callbacks_are_snapshotted_and_removable() {
        let mut hub = NotificationHub::new(4);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = hub.add_callback(Rc::new(move |_| h.set(h.get() + 1)));

        hub.mark_pending();
        let (event, callbacks) = hub.take_pending().unwrap();
        for cb in &callbacks {
            cb(&event);
        }
        assert_eq!(hits.get(), 1);

        assert!(hub.remove_callback(id).is_some());
        assert!(hub.remove_callback(id).is_none());
    }

    #[test]
    fn close_clears_everything() {
        let mut hub = NotificationHub::new(4);
        let stream = hub.open_stream();
        hub.add_callback(Rc::new(|_| {}));
        hub.mark_pending();

        let callbacks = hub.close();
        assert_eq!(callbacks.len(), 1);
        assert!(!hub.is_pending());
        assert_eq!(hub.subscriber_count(), 0);
        assert!(stream.recv().is_err());
    }
}
