//! Change notification for store mutations.
//!
//! # Responsibility
//! - Fan out one `StoreEvent` per successful mutation to every subscriber.
//!
//! # Invariants
//! - Events are sent synchronously, before the mutating call returns.
//! - Receivers that were dropped are pruned on the next publish.

use crate::model::appointment::AppointmentId;
use crate::model::doctor::DoctorId;
use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender};

/// A committed change to the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    AppointmentCreated(AppointmentId),
    AppointmentUpdated(AppointmentId),
    AppointmentDeleted(AppointmentId),
    DoctorCreated(DoctorId),
    DoctorDeleted(DoctorId),
}

/// Subscriber registry backed by `mpsc` channels.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: RefCell<Vec<Sender<StoreEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn publish(&self, event: StoreEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
