use cx_core::region::RegionId;
use uuid::Uuid;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Drill
    /// A depth milestone (every 1000 m) was passed.
    DepthReached {
        /// Milestone in metres.
        depth: u64,
    },
    /// Heat hit 100.
    Overheated,
    /// The drill cooled down enough to run again.
    Recovered,
    /// Integrity reached zero.
    Broken,
    /// The player gained a level.
    LevelUp {
        /// New level.
        level: u32,
    },
    /// A timed effect started.
    EffectApplied {
        /// Effect id.
        id: String,
    },
    /// A timed effect ran out.
    EffectExpired {
        /// Effect id.
        id: String,
    },
    /// An environmental hazard struck.
    Hazard {
        /// Hazard id.
        kind: String,
    },
    /// An ability fired.
    AbilityActivated {
        /// Ability id.
        id: String,
    },

    // Events
    /// A random event triggered.
    EventTriggered {
        /// Catalog id.
        id: String,
    },
    /// The player answered a choice event.
    EventResolved {
        /// Catalog id.
        id: String,
        /// Chosen action id.
        action: String,
    },
    /// An artifact was added to the inventory.
    ArtifactFound {
        /// Catalog id.
        def_id: String,
    },
    /// The analyzer identified an artifact.
    ArtifactIdentified {
        /// Catalog id.
        def_id: String,
    },

    // Combat
    /// A boss appeared.
    BossSpawned {
        /// Boss id.
        id: String,
    },
    /// A phase minigame started.
    MinigameStarted {
        /// Minigame id.
        kind: String,
    },
    /// The boss died.
    BossDefeated {
        /// Boss id.
        id: String,
    },

    // Map and economy
    /// The player left for another region.
    Departed {
        /// Destination.
        to: RegionId,
    },
    /// The player arrived in a region.
    Arrived {
        /// Region reached.
        at: RegionId,
    },
    /// A base finished construction.
    BaseCompleted {
        /// Region of the base.
        region: RegionId,
    },
    /// Raiders hit a base.
    BaseRaided {
        /// Region of the base.
        region: RegionId,
        /// The raid was fought off.
        defended: bool,
    },
    /// A caravan arrived.
    CaravanDelivered {
        /// Caravan id.
        id: Uuid,
    },
    /// A caravan was lost.
    CaravanLost {
        /// Caravan id.
        id: Uuid,
    },
    /// A caravan was held up.
    CaravanDelayed {
        /// Caravan id.
        id: Uuid,
        /// Added delay.
        ms: u64,
    },
    /// An expedition's timer ran out.
    ExpeditionReturned {
        /// Expedition id.
        id: Uuid,
        /// Some drones came back with a haul.
        success: bool,
    },
    /// All objectives of a quest are met.
    QuestReady {
        /// Quest id.
        id: String,
    },
    /// A quest was handed in.
    QuestCompleted {
        /// Quest id.
        id: String,
    },

    // Player
    /// A player command succeeded.
    Action {
        /// Command label.
        label: String,
    },
}

impl SimEventKind {
    /// Short label for filtering and tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DepthReached { .. } => "depth",
            Self::Overheated => "overheat",
            Self::Recovered => "recovered",
            Self::Broken => "broken",
            Self::LevelUp { .. } => "level",
            Self::EffectApplied { .. } => "effect",
            Self::EffectExpired { .. } => "effect_end",
            Self::Hazard { .. } => "hazard",
            Self::AbilityActivated { .. } => "ability",
            Self::EventTriggered { .. } => "event",
            Self::EventResolved { .. } => "choice",
            Self::ArtifactFound { .. } => "artifact",
            Self::ArtifactIdentified { .. } => "analysis",
            Self::BossSpawned { .. } => "boss",
            Self::MinigameStarted { .. } => "minigame",
            Self::BossDefeated { .. } => "victory",
            Self::Departed { .. } => "depart",
            Self::Arrived { .. } => "arrive",
            Self::BaseCompleted { .. } => "base",
            Self::BaseRaided { .. } => "raid",
            Self::CaravanDelivered { .. } => "delivery",
            Self::CaravanLost { .. } => "loss",
            Self::CaravanDelayed { .. } => "delay",
            Self::ExpeditionReturned { .. } => "expedition",
            Self::QuestReady { .. } => "quest_ready",
            Self::QuestCompleted { .. } => "quest",
            Self::Action { .. } => "action",
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events with the given label.
    pub fn with_label(&self, label: &str) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.label() == label).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overheat(tick: u64) -> SimEvent {
        SimEvent::new(tick, SimEventKind::Overheated, "test")
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(overheat(1));
        log.push(SimEvent::new(
            1,
            SimEventKind::Arrived { at: RegionId::IronGates },
            "arrived",
        ));
        assert_eq!(log.len(), 2);
        assert_eq!(log.events_at_tick(1).len(), 2);
        assert_eq!(log.with_label("arrive").len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(overheat(i));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(overheat(1));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn event_log_unlimited_capacity() {
        let mut log = EventLog::new(0);
        for i in 0..1000 {
            log.push(overheat(i));
        }
        assert_eq!(log.len(), 1000);
    }

    #[test]
    fn labels_are_distinct_per_family() {
        let a = SimEventKind::CaravanLost { id: Uuid::nil() };
        let b = SimEventKind::CaravanDelivered { id: Uuid::nil() };
        assert_ne!(a.label(), b.label());
        assert_eq!(SimEventKind::LevelUp { level: 2 }.label(), "level");
    }
}
