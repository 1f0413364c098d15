use std::any::Any;

use cx_mechanics::DuelContext;
use cx_mechanics::combat::{BOSS_INTERVAL, roll_loot, should_spawn, spawn_boss};
use tracing::{debug, info};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Spawns bosses every few kilometres and runs the duel.
#[derive(Debug, Default)]
pub struct CombatSystem;

impl CombatSystem {
    pub fn new() -> Self {
        Self
    }

    fn spawn(ctx: &mut SimContext<'_>) {
        let depth = ctx.state.depth;
        let boss = spawn_boss(depth);
        ctx.state.last_boss_depth = (depth / BOSS_INTERVAL).floor() * BOSS_INTERVAL;
        info!(boss = %boss.id, tier = boss.tier, "boss appeared");
        ctx.emit(
            SimEventKind::BossSpawned {
                id: boss.id.clone(),
            },
            format!("{} blocks the shaft", boss.name),
        );
        ctx.state.boss = Some(boss);
    }

    fn finish(ctx: &mut SimContext<'_>) {
        let Some(boss) = ctx.state.boss.take() else {
            return;
        };
        let luck = ctx.state.stats().luck;
        let loot = roll_loot(ctx.rng, &boss, ctx.state.depth, luck);
        for (kind, amount) in &loot.resources {
            ctx.state.resources.add(*kind, *amount);
        }
        ctx.state.bosses_defeated += 1;
        ctx.state.minigame = None;
        info!(boss = %boss.id, xp = loot.xp, "boss defeated");
        ctx.emit(
            SimEventKind::BossDefeated {
                id: boss.id.clone(),
            },
            format!("{} destroyed", boss.name),
        );
        if let Some(def) = loot.artifact {
            let now = ctx.now_ms();
            ctx.state.grant_artifact(ctx.rng, def, now);
            ctx.emit(
                SimEventKind::ArtifactFound {
                    def_id: def.id.to_string(),
                },
                format!("{} dropped {}", boss.name, def.name),
            );
        }
        if let Some(level) = ctx.state.add_xp(loot.xp) {
            ctx.emit(SimEventKind::LevelUp { level }, format!("reached level {level}"));
        }
    }
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let Some(boss) = ctx.state.boss.as_ref() else {
            if should_spawn(ctx.state.depth, ctx.state.last_boss_depth) {
                Self::spawn(ctx);
            }
            return Ok(());
        };
        if boss.is_defeated() {
            Self::finish(ctx);
            return Ok(());
        }
        // the fight waits on the phase minigame and on a wrecked hull
        if ctx.state.minigame.is_some() || ctx.state.vitals.is_broken() {
            return Ok(());
        }

        let stats = ctx.state.stats();
        let duel = DuelContext {
            total_damage: stats.total_damage,
            defense: stats.defense,
            damage_multiplier: ctx.state.abilities.damage_multiplier(),
            invulnerable: ctx.state.abilities.invulnerable(),
            crit_chance: stats.crit_chance,
            evasion: stats.evasion,
        };
        let dt = ctx.dt_secs();
        let Some(boss) = ctx.state.boss.as_mut() else {
            return Ok(());
        };
        let outcome = boss.duel_tick(&duel, dt, &mut *ctx.rng);
        let vitals = &mut ctx.state.vitals;
        vitals.integrity = (vitals.integrity - outcome.damage_taken).max(0.0);
        debug!(
            dealt = outcome.damage_dealt,
            taken = outcome.damage_taken,
            crit = outcome.crit,
            evaded = outcome.evaded,
            "duel tick"
        );

        if let Some(kind) = outcome.minigame {
            ctx.state.minigame = Some(kind);
            ctx.emit(
                SimEventKind::MinigameStarted {
                    kind: kind.id().to_string(),
                },
                format!("phase shift: {}", kind.id()),
            );
        }
        if outcome.defeated {
            Self::finish(ctx);
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
