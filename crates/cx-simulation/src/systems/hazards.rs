use std::any::Any;

use cx_core::faction::Perk;
use cx_mechanics::HazardContext;
use cx_mechanics::hazard::roll_hazard;
use tracing::info;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Rolls cave-ins, gas pockets and magma flows while drilling deep.
#[derive(Debug, Default)]
pub struct HazardSystem;

impl HazardSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for HazardSystem {
    fn name(&self) -> &str {
        "hazards"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let state = &*ctx.state;
        let stats = state.stats();
        let hazard_ctx = HazardContext {
            depth: state.depth,
            heat: state.vitals.heat,
            integrity: state.vitals.integrity,
            hazard_resist: stats.hazard_resist,
            drilling: state.drilling
                && !state.vitals.overheated
                && !state.vitals.is_broken()
                && state.travel.is_none()
                && !state.stuck,
            busy: state.is_busy(),
            stabilized: state.has_perk(Perk::QuantumStability),
        };

        let dt = ctx.dt_secs();
        let Some(outcome) = roll_hazard(ctx.rng, &hazard_ctx, dt) else {
            return Ok(());
        };

        let vitals = &mut ctx.state.vitals;
        vitals.integrity = (vitals.integrity - outcome.damage).max(0.0);
        vitals.heat = (vitals.heat + outcome.heat_delta).clamp(0.0, 100.0);
        info!(
            hazard = outcome.kind.id(),
            damage = outcome.damage,
            heat = outcome.heat_delta,
            "hazard"
        );
        ctx.emit(
            SimEventKind::Hazard {
                kind: outcome.kind.id().to_string(),
            },
            format!(
                "{} (-{:.0} hull, +{:.0} heat)",
                outcome.kind.id(),
                outcome.damage,
                outcome.heat_delta
            ),
        );
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
    use cx_mechanics::combat::spawn_boss;

    fn deep_drill() -> GameState {
        let mut state = GameState::new();
        state.depth = 20_000.0;
        state.drilling = true;
        state
    }

    #[test]
    fn shallow_drilling_is_safe() {
        let mut state = GameState::new();
        state.drilling = true;
        let log = run_system(&mut HazardSystem::new(), &mut state, 20_000).unwrap();
        assert!(log.with_label("hazard").is_empty());
    }

    #[test]
    fn deep_drilling_meets_hazards() {
        let mut state = deep_drill();
        let log = run_system(&mut HazardSystem::new(), &mut state, 20_000).unwrap();
        assert!(!log.with_label("hazard").is_empty());
        assert!(state.vitals.heat <= 100.0);
        assert!(state.vitals.integrity >= 0.0);
    }

    #[test]
    fn boss_fight_suppresses_hazards() {
        let mut state = deep_drill();
        state.boss = Some(spawn_boss(state.depth));
        let log = run_system(&mut HazardSystem::new(), &mut state, 20_000).unwrap();
        assert!(log.is_empty());
    }
}
