use std::any::Any;

use cx_core::drill::tier_material;
use cx_core::faction::Perk;
use cx_core::resource::ResourceKind;
use cx_core::stats::required_tier;
use rand::Rng;
use tracing::debug;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Heat per second from the bit, before multipliers.
pub const BASE_HEAT_PER_SEC: f64 = 3.0;

/// Heat the drill must fall under to restart after an overheat.
pub const RECOVERY_HEAT: f64 = 50.0;

/// Speed factor when the weakest part is below the depth's tier.
pub const UNDER_TIER_PENALTY: f64 = 0.1;

/// Primary material per metre.
pub const YIELD_PER_METRE: f64 = 1.0;

/// Rubies per metre.
pub const RUBIES_PER_METRE: f64 = 0.1;

/// Experience per metre.
pub const XP_PER_METRE: f64 = 0.1;

/// Depth between milestone events.
pub const MILESTONE_METRES: f64 = 1000.0;

/// Primary material dug at `depth`.
pub fn primary_material(depth: f64) -> ResourceKind {
    match required_tier(depth) {
        1 if depth < 1000.0 => ResourceKind::Clay,
        1 => ResourceKind::Stone,
        tier => tier_material(tier),
    }
}

/// Moves the drill down, heats it and fills the hold.
#[derive(Debug, Default)]
pub struct DrillingSystem;

impl DrillingSystem {
    pub fn new() -> Self {
        Self
    }

    fn can_dig(ctx: &SimContext<'_>) -> bool {
        let s = &*ctx.state;
        s.drilling
            && !s.vitals.overheated
            && !s.vitals.is_broken()
            && s.boss.is_none()
            && s.minigame.is_none()
            && s.travel.is_none()
            && !s.stuck
    }

    fn dig(ctx: &mut SimContext<'_>, dt: f64) {
        let stats = ctx.state.stats();
        let totals = ctx.state.effect_totals();

        let mut speed = stats.total_speed * totals.drill_speed * stats.drilling_efficiency;
        if ctx.state.drill.min_tier() < stats.required_tier {
            speed *= UNDER_TIER_PENALTY;
        }
        let metres = (speed * dt).max(0.0);
        if metres <= 0.0 {
            return;
        }

        let before = ctx.state.depth;
        let after = before + metres;
        ctx.state.depth = after;
        ctx.state.total_drilled += metres;
        ctx.state.max_depth = ctx.state.max_depth.max(after);

        let kind = primary_material(after);
        let yield_mult = stats.resource_mult * totals.resource;
        let region_bonus = ctx.state.region.info().resource_bonus(kind);
        ctx.state
            .resources
            .add(kind, metres * YIELD_PER_METRE * yield_mult * region_bonus);
        let mut rubies = metres * RUBIES_PER_METRE * yield_mult;
        if ctx.state.has_perk(Perk::Executive) {
            rubies *= 2.0;
        }
        ctx.state.resources.add(ResourceKind::Rubies, rubies);

        let crossed = (after / MILESTONE_METRES).floor() > (before / MILESTONE_METRES).floor();
        if crossed {
            let mark = (after / MILESTONE_METRES).floor() * MILESTONE_METRES;
            ctx.emit(
                SimEventKind::DepthReached { depth: mark as u64 },
                format!("passed {mark} m"),
            );
        }
        if let Some(level) = ctx.state.add_xp(metres * XP_PER_METRE) {
            ctx.emit(SimEventKind::LevelUp { level }, format!("reached level {level}"));
        }
    }
}

impl System for DrillingSystem {
    fn name(&self) -> &str {
        "drilling"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let dt = ctx.dt_secs();
        let stats = ctx.state.stats();
        let totals = ctx.state.effect_totals();
        let running = Self::can_dig(ctx);

        if running {
            Self::dig(ctx, dt);
        }

        let cooling = if totals.cooling_disabled {
            0.0
        } else {
            stats.total_cooling * dt
        };
        let heat = ctx.state.vitals.heat;
        let mut next = if running {
            let gen_heat = BASE_HEAT_PER_SEC * stats.heat_gen_mult * totals.heat_gen * dt;
            (heat + gen_heat - cooling).max(stats.ambient_heat)
        } else {
            (heat - cooling).max(stats.ambient_heat.min(heat))
        };
        if totals.heat_instability {
            next += (ctx.rng.random::<f64>() - 0.5) * 10.0 * dt;
        }
        ctx.state.vitals.heat = next.clamp(0.0, 100.0);

        if ctx.state.vitals.heat >= 100.0 && !ctx.state.vitals.overheated {
            ctx.state.vitals.trigger_overheat(stats.integrity);
            ctx.emit(SimEventKind::Overheated, "drill overheated");
        } else if ctx.state.vitals.overheated && ctx.state.vitals.heat < RECOVERY_HEAT {
            ctx.state.vitals.overheated = false;
            ctx.emit(SimEventKind::Recovered, "drill cooled down");
        }

        if ctx.state.drilling && ctx.state.vitals.is_broken() {
            ctx.state.drilling = false;
            ctx.emit(SimEventKind::Broken, "hull breached, drilling stopped");
        }

        debug!(
            depth = ctx.state.depth,
            heat = ctx.state.vitals.heat,
            running,
            "drilling tick"
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
