use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::actions::{PlayerAction, apply_action};
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::EventLog;
use crate::save::export_save;
use crate::state::GameState;
use crate::system::System;
use crate::systems::default_systems;

/// The top-level simulation orchestrator.
///
/// Owns the game state, clock, RNG, event log, and registered systems.
/// Drives the tick loop and routes player actions through the same context
/// the systems see.
pub struct Simulation {
    state: GameState,
    seed: u64,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("seed", &self.seed)
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation with no systems registered.
    pub fn new(state: GameState, config: SimConfig) -> Self {
        let clock = SimClock::new(config.start_ms, config.ms_per_tick);
        let rng = StdRng::seed_from_u64(config.seed);
        let events = EventLog::new(config.max_events);
        Self {
            state,
            seed: config.seed,
            clock,
            rng,
            events,
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Create a simulation with every built-in system.
    pub fn with_default_systems(state: GameState, config: SimConfig) -> Self {
        let mut sim = Self::new(state, config);
        sim.systems = default_systems();
        sim
    }

    /// Continue a saved game at `tick`. The RNG stream is reseeded from the
    /// seed and the tick, so a resumed run is deterministic too.
    pub fn resume(state: GameState, config: SimConfig, tick: u64) -> Self {
        let mut sim = Self::with_default_systems(state, config.clone());
        sim.clock = SimClock::resume(config.start_ms, config.ms_per_tick, tick);
        sim.rng = StdRng::seed_from_u64(config.seed.wrapping_add(tick));
        sim
    }

    /// Register a system. Systems are ticked in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Initialize all registered systems.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                state: &mut self.state,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            system.init(&mut ctx)?;
            self.systems[i] = system;
        }
        self.initialized = true;
        Ok(())
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) -> SimResult<()> {
        if !self.initialized {
            self.init()?;
        }

        self.clock.advance();

        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                state: &mut self.state,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            let result = system.tick(&mut ctx);
            self.systems[i] = system;
            result?;
        }

        self.state.enforce_bounds();
        self.state.ticks += 1;
        Ok(())
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        debug!(ticks = n, now = self.clock.tick(), "run finished");
        Ok(())
    }

    /// Apply a player action at the current tick.
    pub fn act(&mut self, action: &PlayerAction) -> SimResult<String> {
        let mut ctx = SimContext {
            state: &mut self.state,
            clock: &self.clock,
            events: &mut self.events,
            rng: &mut self.rng,
        };
        apply_action(&mut ctx, action)
    }

    /// Parse and apply a command line.
    pub fn command(&mut self, line: &str) -> SimResult<String> {
        let action = PlayerAction::parse(line)?;
        self.act(&action)
    }

    /// Base64 save of the current game.
    pub fn export(&self) -> SimResult<String> {
        export_save(&self.state, self.seed, self.clock.tick())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Extract the state, consuming the simulation.
    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::import_save;
    use crate::systems::DrillingSystem;
    use cx_core::resource::ResourceKind;

    fn drilling_sim(seed: u64) -> Simulation {
        let mut sim = Simulation::with_default_systems(GameState::new(), SimConfig::default().with_seed(seed));
        sim.command("drill start").unwrap();
        sim
    }

    fn labels(sim: &Simulation) -> Vec<(u64, &'static str)> {
        sim.events()
            .events()
            .iter()
            .map(|e| (e.tick, e.kind.label()))
            .collect()
    }

    #[test]
    fn full_tick_integration() {
        let mut sim = drilling_sim(1);
        sim.run(600).unwrap();

        assert_eq!(sim.current_tick(), 600);
        assert_eq!(sim.state().ticks, 600);
        assert!(sim.state().depth > 0.0);
        assert!(sim.state().resources.get(ResourceKind::Rubies) > 0.0);
        assert!(!sim.events().is_empty());
    }

    #[test]
    fn same_seed_same_story() {
        let mut a = drilling_sim(7);
        let mut b = drilling_sim(7);
        a.run(5_000).unwrap();
        b.run(5_000).unwrap();
        assert_eq!(a.state(), b.state());
        assert_eq!(labels(&a), labels(&b));
    }

    #[test]
    fn resumed_runs_are_deterministic() {
        let mut sim = drilling_sim(3);
        sim.run(500).unwrap();
        let save = import_save(&sim.export().unwrap()).unwrap();

        let mut a = Simulation::resume(save.state.clone(), SimConfig::default().with_seed(save.seed), save.tick);
        let mut b = Simulation::resume(save.state, SimConfig::default().with_seed(save.seed), save.tick);
        a.run(1_000).unwrap();
        b.run(1_000).unwrap();
        assert_eq!(a.current_tick(), 1_500);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn rejected_command_is_reported() {
        let mut sim = drilling_sim(1);
        assert!(sim.command("travel void_chasm").is_err());
        assert!(sim.command("warp home").is_err());
        assert!(sim.state().drilling);
    }

    #[test]
    fn custom_system_registration() {
        #[derive(Debug)]
        struct CustomSystem {
            ticked: bool,
        }
        impl System for CustomSystem {
            fn name(&self) -> &str {
                "custom"
            }
            fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
                self.ticked = true;
                Ok(())
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }

        let mut sim = Simulation::new(GameState::new(), SimConfig::default());
        sim.add_system(CustomSystem { ticked: false });
        sim.tick().unwrap();
        assert!(sim.get_system::<CustomSystem>().unwrap().ticked);
        assert!(sim.get_system::<DrillingSystem>().is_none());
    }

    #[test]
    fn default_systems_are_downcastable() {
        let mut sim = Simulation::with_default_systems(GameState::new(), SimConfig::default());
        assert!(sim.get_system_mut::<DrillingSystem>().is_some());
    }

    mod invariants {
        use super::*;
        use proptest::prelude::*;

        const COMMANDS: &[&str] = &[
            "drill start",
            "drill stop",
            "cool start",
            "vent",
            "cool stop",
            "ability emp_burst",
            "ability thermal_strike",
            "buy iron 20",
            "sell rubies 50",
            "repair",
            "heal",
            "buff bar_oil_stout",
            "gamble rubies 10",
            "choose tunnel_risky",
            "choose tectonic_hold",
            "dismiss",
            "minigame win",
            "minigame lose",
            "travel iron_gates",
            "travel rust_valley",
            "build base outpost",
            "drone cooler",
            "quest refresh",
            "expedition launch low 1 iron",
        ];

        fn script() -> impl Strategy<Value = Vec<(usize, u64)>> {
            prop::collection::vec((0..COMMANDS.len(), 1u64..400), 1..25)
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn vitals_stay_in_range(seed in any::<u64>(), steps in script()) {
                let mut state = GameState::new();
                state.resources.add(ResourceKind::Rubies, 5_000.0);
                state.resources.add(ResourceKind::NanoSwarm, 100.0);
                let mut sim = Simulation::with_default_systems(state, SimConfig::default().with_seed(seed));
                for (cmd, ticks) in steps {
                    let _ = sim.command(COMMANDS[cmd]);
                    sim.run(ticks).unwrap();

                    let s = sim.state();
                    prop_assert!((0.0..=100.0).contains(&s.vitals.heat));
                    prop_assert!(s.vitals.integrity >= 0.0 && s.vitals.integrity <= s.max_integrity());
                    prop_assert!((0.0..=100.0).contains(&s.shield_charge));
                    prop_assert!(s.depth >= 0.0 && s.depth <= s.max_depth);
                    prop_assert!(s.resources.iter().all(|(_, v)| v >= 0.0));
                    prop_assert_eq!(s.impossible_value(), None);
                }
            }
        }
    }
}
