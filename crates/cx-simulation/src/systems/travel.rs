use std::any::Any;

use tracing::info;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Completes trips and tracks whether the player is stranded.
#[derive(Debug, Default)]
pub struct TravelSystem;

impl TravelSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for TravelSystem {
    fn name(&self) -> &str {
        "travel"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        if let Some(travel) = ctx.state.travel.filter(|t| t.arrived(now)) {
            let state = &mut *ctx.state;
            state.travel = None;
            state.region = travel.to;
            state.visited_regions.insert(travel.to);
            state.bases.visit(travel.to, now);
            info!(from = %travel.from, to = %travel.to, "arrived");
            ctx.emit(
                SimEventKind::Arrived { at: travel.to },
                format!("arrived in {}", travel.to.info().name),
            );
        }

        let state = &mut *ctx.state;
        state.stuck = state.travel.is_none() && !state.licenses.has_active_permit(state.region, now);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
