use std::any::Any;

use cx_mechanics::AbilityKind;
use cx_mechanics::combat::thermal_strike_damage;
use tracing::debug;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Advances ability timers and fires queued activations.
#[derive(Debug, Default)]
pub struct AbilitySystem;

impl AbilitySystem {
    pub fn new() -> Self {
        Self
    }

    fn fire(ctx: &mut SimContext<'_>, kind: AbilityKind) {
        let heat = ctx.state.vitals.heat;
        if let Err(e) = ctx.state.abilities.check(kind, heat, ctx.state.level) {
            debug!(ability = kind.id(), error = %e, "queued ability dropped");
            return;
        }
        let delta = ctx.state.abilities.activate(kind);
        ctx.state.vitals.heat = (heat + delta).clamp(0.0, 100.0);

        let total_damage = ctx.state.stats().total_damage;
        if let Some(boss) = ctx.state.boss.as_mut() {
            match kind {
                AbilityKind::EmpBurst => boss.stun(),
                AbilityKind::ThermalStrike => {
                    boss.strike(thermal_strike_damage(heat, total_damage));
                }
                AbilityKind::Barrier | AbilityKind::Overload => {}
            }
        }
        ctx.emit(
            SimEventKind::AbilityActivated {
                id: kind.id().to_string(),
            },
            format!("{} activated", kind.def().name),
        );
    }
}

impl System for AbilitySystem {
    fn name(&self) -> &str {
        "abilities"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        ctx.state.abilities.update(ctx.dt_secs());
        for kind in ctx.state.abilities.drain_queue() {
            Self::fire(ctx, kind);
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
    use cx_mechanics::combat::spawn_boss;

    #[test]
    fn queued_ability_fires_next_tick() {
        let mut state = GameState::new();
        state.level = 5;
        state.vitals.heat = 50.0;
        state.boss = Some(spawn_boss(5000.0));
        state.abilities.enqueue(AbilityKind::ThermalStrike);

        let log = run_system(&mut AbilitySystem::new(), &mut state, 1).unwrap();

        assert_eq!(log.with_label("ability").len(), 1);
        assert_eq!(state.vitals.heat, 25.0);
        let boss = state.boss.unwrap();
        assert!(boss.hp < boss.max_hp);
    }

    #[test]
    fn locked_ability_is_dropped() {
        let mut state = GameState::new();
        state.abilities.enqueue(AbilityKind::Overload);
        let log = run_system(&mut AbilitySystem::new(), &mut state, 1).unwrap();
        assert!(log.is_empty());
        assert!(!state.abilities.is_active(AbilityKind::Overload));
    }
}
