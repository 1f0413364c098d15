use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::state::GameState;

/// Everything a system or player action may touch during one step.
pub struct SimContext<'a> {
    pub state: &'a mut GameState,
    pub clock: &'a SimClock,
    pub events: &'a mut EventLog,
    /// The run's only RNG.
    pub rng: &'a mut StdRng,
}

impl SimContext<'_> {
    /// Log `kind` at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        let tick = self.clock.tick();
        self.events.push(SimEvent::new(tick, kind, description));
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Game time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Seconds covered by one tick.
    pub fn dt_secs(&self) -> f64 {
        self.clock.dt_secs()
    }
}
