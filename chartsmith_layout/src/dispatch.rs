// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small publish/subscribe hub for chart interaction events.
//!
//! Handlers run synchronously in subscription order. Events a handler emits while handling
//! another event are queued and delivered after the current event has reached every subscriber.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use crate::crosshair::{CrosshairGeometry, HoverEvent};

/// Upper bound on deliveries per [`Dispatcher::publish`] call.
const MAX_DELIVERIES: usize = 1024;

/// Event topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The pointer moved over data points.
    HoverShape,
    /// Crosshair lines changed.
    Crosshair,
}

/// An event with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// See [`Topic::HoverShape`].
    HoverShape(HoverEvent),
    /// See [`Topic::Crosshair`].
    Crosshair(CrosshairGeometry),
}

impl Event {
    /// The topic this event is published on.
    pub fn topic(&self) -> Topic {
        match self {
            Self::HoverShape(_) => Topic::HoverShape,
            Self::Crosshair(_) => Topic::Crosshair,
        }
    }
}

/// Handle returned by [`Dispatcher::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Collects events emitted by a handler.
#[derive(Debug, Default)]
pub struct Emitter {
    queued: Vec<Event>,
}

impl Emitter {
    /// Queues `event` for delivery after the current one.
    pub fn emit(&mut self, event: Event) {
        self.queued.push(event);
    }
}

/// An event handler.
pub type Handler = Box<dyn FnMut(&Event, &mut Emitter)>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Routes events to subscribers.
#[derive(Default)]
pub struct Dispatcher {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events on `topic`.
    pub fn subscribe(&mut self, topic: Topic, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, topic, handler });
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscriptions.iter().filter(|s| s.topic == topic).count()
    }

    /// Delivers `event` and everything emitted in response to it.
    ///
    /// Returns the number of handler invocations.
    pub fn publish(&mut self, event: Event) -> usize {
        let mut queue = VecDeque::from([event]);
        let mut deliveries = 0;
        while let Some(event) = queue.pop_front() {
            let topic = event.topic();
            let mut emitter = Emitter::default();
            for sub in self.subscriptions.iter_mut().filter(|s| s.topic == topic) {
                if deliveries == MAX_DELIVERIES {
                    log::warn!(
                        "event delivery limit reached; dropping {topic:?} and queued events"
                    );
                    return deliveries;
                }
                (sub.handler)(&event, &mut emitter);
                deliveries += 1;
            }
            queue.extend(emitter.queued);
        }
        deliveries
    }
}
