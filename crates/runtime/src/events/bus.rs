//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::{ActionCommand, CombatEvent, EncounterOutcome, GameError, UnitId};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Attacks, abilities, items, effects and defeats
    Combat,
    /// Turn start/end and the final outcome
    Turn,
    /// Commands the encounter refused
    Command,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Combat, Topic::Turn, Topic::Command];
}

/// Event wrapper that carries the topic and typed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Combat(CombatEvent),

    /// A command was refused; the encounter is unchanged.
    CommandRejected {
        unit: UnitId,
        command: ActionCommand,
        code: String,
        message: String,
    },

    /// Published once, when the encounter stops being `Ongoing`.
    Finished(EncounterOutcome),
}

impl Event {
    pub fn rejected(unit: UnitId, command: ActionCommand, error: &impl GameError) -> Self {
        Event::CommandRejected {
            unit,
            command,
            code: error.error_code().to_owned(),
            message: error.to_string(),
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(event) if event.is_turn_event() => Topic::Turn,
            Event::Combat(_) => Topic::Combat,
            Event::CommandRejected { .. } => Topic::Command,
            Event::Finished(_) => Topic::Turn,
        }
    }
}

impl From<CombatEvent> for Event {
    fn from(event: CombatEvent) -> Self {
        Event::Combat(event)
    }
}

/// Topic-based event bus
///
/// Every topic gets its own broadcast channel up front, so publishing never
/// contends on a lock and subscribing never fails.
#[derive(Clone)]
pub struct EventBus {
    combat: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    command: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            combat: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
            command: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Turn => &self.turn,
            Topic::Command => &self.command,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = CombatEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActionError, Tick};

    #[tokio::test]
    async fn events_are_routed_by_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turns = bus.subscribe(Topic::Turn);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(CombatEvent::TurnStarted {
            unit: UnitId(1),
            tick: Tick(3),
        });
        bus.publish(CombatEvent::UnitDefeated { unit: UnitId(2) });

        assert_eq!(
            turns.recv().await.expect("turn event"),
            Event::Combat(CombatEvent::TurnStarted {
                unit: UnitId(1),
                tick: Tick(3),
            })
        );
        assert_eq!(
            combat.recv().await.expect("combat event"),
            Event::Combat(CombatEvent::UnitDefeated { unit: UnitId(2) })
        );
        assert!(turns.try_recv().is_err());
    }

    #[test]
    fn rejections_carry_the_error_code() {
        let error = ActionError::UnitDead(UnitId(4));
        let event = Event::rejected(UnitId(4), ActionCommand::Wait, &error);

        assert_eq!(event.topic(), Topic::Command);
        match event {
            Event::CommandRejected { code, .. } => assert_eq!(code, error.error_code()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(Event::Finished(EncounterOutcome::Draw));
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }
}
