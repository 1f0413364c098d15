use std::any::Any;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::system::System;

/// Charge gained per second while drilling.
pub const CHARGE_PER_SEC: f64 = 5.0;

/// Charge spent per second while the shield is up.
pub const DRAIN_PER_SEC: f64 = 20.0;

/// Charge lost per second otherwise.
pub const LEAK_PER_SEC: f64 = 1.0;

/// Charges the shield while drilling and spends it while idle.
#[derive(Debug, Default)]
pub struct ShieldSystem;

impl ShieldSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for ShieldSystem {
    fn name(&self) -> &str {
        "shield"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let dt = ctx.dt_secs();
        let state = &mut *ctx.state;
        let overheated = state.vitals.overheated;

        if state.drilling && !overheated {
            state.shield_charge = (state.shield_charge + CHARGE_PER_SEC * dt).min(100.0);
            state.shielding = false;
        } else if !state.drilling
            && !overheated
            && state.shield_charge > 0.0
            && !state.vitals.cooling_game
        {
            state.shield_charge = (state.shield_charge - DRAIN_PER_SEC * dt).max(0.0);
            state.shielding = state.shield_charge > 0.0;
        } else {
            state.shield_charge = (state.shield_charge - LEAK_PER_SEC * dt).max(0.0);
            state.shielding = false;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;
    use crate::systems::testing::run_system;

    #[test]
    fn drilling_charges_up_to_full() {
        let mut state = GameState::new();
        state.drilling = true;
        run_system(&mut ShieldSystem::new(), &mut state, 10).unwrap();
        assert!((state.shield_charge - 5.0).abs() < 1e-9);
        run_system(&mut ShieldSystem::new(), &mut state, 500).unwrap();
        assert_eq!(state.shield_charge, 100.0);
        assert!(!state.shielding);
    }

    #[test]
    fn idle_drill_raises_the_shield() {
        let mut state = GameState::new();
        state.shield_charge = 10.0;
        run_system(&mut ShieldSystem::new(), &mut state, 1).unwrap();
        assert!(state.shielding);
        assert!((state.shield_charge - 8.0).abs() < 1e-9);
        run_system(&mut ShieldSystem::new(), &mut state, 10).unwrap();
        assert_eq!(state.shield_charge, 0.0);
    }

    #[test]
    fn shield_drops_when_the_drain_empties_it() {
        let mut state = GameState::new();
        state.shield_charge = 1.0;
        run_system(&mut ShieldSystem::new(), &mut state, 5).unwrap();
        assert_eq!(state.shield_charge, 0.0);
        assert!(!state.shielding);
    }

    #[test]
    fn overheated_drill_leaks_charge() {
        let mut state = GameState::new();
        state.shield_charge = 10.0;
        state.vitals.overheated = true;
        run_system(&mut ShieldSystem::new(), &mut state, 10).unwrap();
        assert!(!state.shielding);
        assert!((state.shield_charge - 9.0).abs() < 1e-9);
    }
}
