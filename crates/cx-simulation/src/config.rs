/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Game milliseconds per simulation tick.
    pub ms_per_tick: u64,
    /// Game clock value when the simulation begins.
    pub start_ms: u64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ms_per_tick: 100,
            start_ms: 0,
            max_events: 0,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the length of one tick in game milliseconds.
    pub fn with_ms_per_tick(mut self, ms: u64) -> Self {
        self.ms_per_tick = ms.max(1);
        self
    }

    /// Set the game clock value at tick 0.
    pub fn with_start_ms(mut self, ms: u64) -> Self {
        self.start_ms = ms;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}
