//! Simulation events and the bus that delivers them.
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │  Movement  │──►│            │──►│ Subscriber │ (HUD, audio, camera)
//! ├────────────┤   │  EventBus  │   ├────────────┤
//! │   World    │──►│  (queue)   │──►│ Subscriber │
//! └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! Systems never hold the bus. They append typed events to per-tick buffers;
//! the simulation publishes them in tick order and dispatches once at the end
//! of the tick.

use std::fmt;

use glam::Vec3;
use parkour_physics::MovementEvent;
use parkour_world::WorldEvent;
use serde::{Deserialize, Serialize};

/// Every event the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // =========================================================================
    // Movement
    // =========================================================================
    /// Jump, land, sprint/crouch/slide/wall-run edges, bounces.
    Movement(MovementEvent),

    // =========================================================================
    // World
    // =========================================================================
    /// Chunk generation and disposal, checkpoint activation.
    World(WorldEvent),

    // =========================================================================
    // Lifecycle
    // =========================================================================
    /// The traveler fell below the death height.
    Death { position: Vec3 },

    /// The traveler reappeared.
    Respawn { position: Vec3 },
}

impl GameEvent {
    /// Stable event name for external observers.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Movement(event) => event.name(),
            GameEvent::World(event) => event.name(),
            GameEvent::Death { .. } => "death",
            GameEvent::Respawn { .. } => "respawn",
        }
    }
}

impl From<MovementEvent> for GameEvent {
    fn from(event: MovementEvent) -> Self {
        GameEvent::Movement(event)
    }
}

impl From<WorldEvent> for GameEvent {
    fn from(event: WorldEvent) -> Self {
        GameEvent::World(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Ordered publish/subscribe queue owned by the simulation.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Handler)>,
    queue: Vec<GameEvent>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler called for every dispatched event.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber, _)| *subscriber != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queue an event for the next dispatch.
    pub fn publish(&mut self, event: impl Into<GameEvent>) {
        self.queue.push(event.into());
    }

    /// Queue several events, keeping their order.
    pub fn publish_all<E: Into<GameEvent>>(&mut self, events: impl IntoIterator<Item = E>) {
        self.queue.extend(events.into_iter().map(Into::into));
    }

    /// Events waiting for dispatch.
    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    /// Deliver queued events in publish order to every subscriber.
    ///
    /// Returns the delivered events and leaves the queue empty.
    pub fn dispatch(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            for (_, handler) in &mut self.subscribers {
                handler(event);
            }
        }
        events
    }

    /// Take queued events without delivering them to subscribers.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("queue", &self.queue)
            .finish()
    }
}
