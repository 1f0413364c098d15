use std::any::Any;

use crate::context::SimContext;
use crate::drone::DroneKind;
use crate::error::SimResult;
use crate::system::System;

/// Hull repaired per tick per repair drone level.
pub const REPAIR_PER_LEVEL: f64 = 0.05;

/// Heat removed per tick per cooler drone level.
pub const COOLING_PER_LEVEL: f64 = 0.1;

/// Share of the drill's regen stat applied per second.
pub const REGEN_FACTOR: f64 = 0.4;

/// Support drones and passive hull regeneration.
#[derive(Debug, Default)]
pub struct DroneSystem;

impl DroneSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for DroneSystem {
    fn name(&self) -> &str {
        "drones"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let stats = ctx.state.stats();
        let max = stats.integrity;
        let state = &mut *ctx.state;

        if !state.effect_totals().auto_disabled {
            let eff = stats.drone_efficiency;
            let repair = state.drones.level(DroneKind::Repair);
            if repair > 0 {
                let amount = REPAIR_PER_LEVEL * f64::from(repair) * eff;
                state.vitals.integrity = (state.vitals.integrity + amount).min(max);
            }
            let cooler = state.drones.level(DroneKind::Cooler);
            if cooler > 0 && state.vitals.heat > stats.ambient_heat {
                let amount = COOLING_PER_LEVEL * f64::from(cooler) * eff;
                state.vitals.heat = (state.vitals.heat - amount).max(stats.ambient_heat);
            }
        }

        if !state.vitals.is_broken() {
            let regen = stats.regen * REGEN_FACTOR * ctx.clock.dt_secs();
            state.vitals.integrity = (state.vitals.integrity + regen).min(max);
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
