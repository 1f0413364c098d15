use std::any::Any;

use cx_economy::ExpeditionStatus;
use cx_economy::expedition::settle;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Brings expeditions home once their timer runs out. Rewards wait on the
/// board until the player collects them.
#[derive(Debug, Default)]
pub struct ExpeditionSystem;

impl ExpeditionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for ExpeditionSystem {
    fn name(&self) -> &str {
        "expeditions"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let returned = settle(ctx.rng, &mut ctx.state.expeditions, now);
        for (id, status) in returned {
            let summary = ctx
                .state
                .expeditions
                .iter()
                .find(|e| e.id == id)
                .and_then(|e| e.log.last().cloned())
                .unwrap_or_default();
            let success = status == ExpeditionStatus::Completed;
            ctx.emit(
                SimEventKind::ExpeditionReturned { id, success },
                format!("expedition returned: {summary}"),
            );
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
    use cx_core::resource::ResourceKind;
    use cx_economy::ExpeditionDifficulty;
    use cx_economy::expedition::launch;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn expedition_returns_after_its_duration() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = GameState::new();
        state.resources.add(ResourceKind::NanoSwarm, 100.0);
        let exp = launch(
            &mut rng,
            &mut state.resources,
            &state.expeditions,
            ExpeditionDifficulty::Low,
            10,
            ResourceKind::Iron,
            0,
        )
        .unwrap();
        state.expeditions.push(exp);

        // five minutes at 100 ms per tick
        let mut early = state.clone();
        let log = run_system(&mut ExpeditionSystem::new(), &mut early, 2_999).unwrap();
        assert!(log.is_empty());
        assert!(early.expeditions[0].is_active());

        let log = run_system(&mut ExpeditionSystem::new(), &mut state, 3_000).unwrap();
        assert_eq!(log.with_label("expedition").len(), 1);
        assert!(!state.expeditions[0].is_active());
    }
}
