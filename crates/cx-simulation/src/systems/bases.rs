use std::any::Any;

use cx_mechanics::event::{event_by_id, is_on_cooldown};
use rand::Rng;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;
use crate::systems::events::{event_context, trigger_event, windowed_chance};

/// Event raised when raiders hit a base.
pub const BASE_RAID_EVENT: &str = "DEFEND_THE_BASE";

/// Finishes construction and rolls raids on exposed bases.
#[derive(Debug, Default)]
pub struct BaseSystem;

impl BaseSystem {
    pub fn new() -> Self {
        Self
    }

    fn roll_raid(ctx: &mut SimContext<'_>) {
        let Some(event) = event_by_id(BASE_RAID_EVENT) else {
            return;
        };
        let state = &*ctx.state;
        let now = ctx.now_ms();
        if state.is_busy()
            || is_on_cooldown(state.event_cooldowns.get(event.id).copied(), now, event.cooldown_secs)
        {
            return;
        }
        let dt = ctx.dt_secs();
        let targets: Vec<_> = state
            .bases
            .iter()
            .filter(|b| b.is_active())
            .map(|b| {
                let chance = windowed_chance(event, &event_context(state, event, Some(b.id)), dt);
                (b.id, chance)
            })
            .filter(|(_, chance)| *chance > 0.0)
            .collect();
        for (id, chance) in targets {
            if ctx.rng.random::<f64>() < chance {
                trigger_event(ctx, event, Some(id));
                return;
            }
        }
    }
}

impl System for BaseSystem {
    fn name(&self) -> &str {
        "bases"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        for id in ctx.state.bases.complete_construction(now) {
            if let Some(base) = ctx.state.bases.get(id) {
                let region = base.region;
                let kind = base.base_type;
                ctx.emit(
                    SimEventKind::BaseCompleted { region },
                    format!("{kind} in {region} is operational"),
                );
            }
        }
        Self::roll_raid(ctx);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
