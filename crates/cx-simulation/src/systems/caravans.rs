use std::any::Any;

use cx_economy::caravan::{CaravanCheck, settle};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Settles caravans that reached their arrival time.
#[derive(Debug, Default)]
pub struct CaravanSystem;

impl CaravanSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for CaravanSystem {
    fn name(&self) -> &str {
        "caravans"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let state = &mut *ctx.state;
        let changed: Vec<_> = settle(ctx.rng, &mut state.caravans, &mut state.bases, now)
            .into_iter()
            .map(|(id, check)| {
                let route = state
                    .caravans
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| format!("{} -> {}", c.from_region, c.to_region))
                    .unwrap_or_default();
                (id, check, route)
            })
            .collect();
        for (id, check, route) in changed {
            match check {
                CaravanCheck::Delivered => {
                    ctx.emit(SimEventKind::CaravanDelivered { id }, format!("caravan {route} delivered"));
                }
                CaravanCheck::Lost => {
                    ctx.emit(SimEventKind::CaravanLost { id }, format!("caravan {route} lost"));
                }
                CaravanCheck::Pending => {}
            }
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
