use std::any::Any;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Counts effect durations down and removes expired effects.
#[derive(Debug, Default)]
pub struct EffectSystem;

impl EffectSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for EffectSystem {
    fn name(&self) -> &str {
        "effects"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let mut expired = Vec::new();
        for effect in &mut ctx.state.effects {
            effect.duration = effect.duration.saturating_sub(1);
            if effect.duration == 0 {
                expired.push((effect.id.clone(), effect.name.clone()));
            }
        }
        for (id, name) in expired {
            ctx.state.end_effect(&id);
            ctx.emit(SimEventKind::EffectExpired { id }, format!("{name} wore off"));
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
    use crate::state::{GameState, PRICE_SPIKE_EFFECT};
    use crate::systems::testing::run_system;
    use cx_core::effect::create_effect;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn effects_expire_after_their_duration() {
        let mut state = GameState::new();
        let mut fx = create_effect("GOLD_RUSH_EFFECT").unwrap();
        fx.duration = 3;
        state.effects.push(fx);

        let log = run_system(&mut EffectSystem::new(), &mut state, 2).unwrap();
        assert_eq!(state.effects.len(), 1);
        assert!(log.is_empty());

        let log = run_system(&mut EffectSystem::new(), &mut state, 1).unwrap();
        assert!(state.effects.is_empty());
        assert_eq!(log.with_label("effect_end").len(), 1);
    }

    #[test]
    fn spike_clears_with_its_effect() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = GameState::new();
        let mut fx = create_effect(PRICE_SPIKE_EFFECT).unwrap();
        fx.duration = 1;
        state.start_effect(&mut rng, fx);
        assert!(state.price_spike.is_some());

        run_system(&mut EffectSystem::new(), &mut state, 1).unwrap();
        assert!(state.price_spike.is_none());
    }
}
