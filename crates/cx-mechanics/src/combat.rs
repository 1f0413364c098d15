//! Boss encounters: spawning, the per-second duel, phase minigames and loot.
//!
//! A boss appears every [`BOSS_INTERVAL`] metres. It loses hp to the drill's
//! damage each tick and strikes back on its own attack timer. Crossing a phase
//! threshold makes it invulnerable until the player finishes the minigame it
//! is weak to.

use std::fmt;
use std::str::FromStr;

use cx_core::artifact::{ArtifactDefinition, roll_artifact};
use cx_core::drill::tier_material;
use cx_core::resource::ResourceKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Metres between boss encounters.
pub const BOSS_INTERVAL: f64 = 5000.0;

/// Fraction of max hp removed by a won minigame.
pub const MINIGAME_HIT: f64 = 0.25;

/// Integrity lost on a failed minigame.
pub const MINIGAME_FAIL_DAMAGE: f64 = 20.0;

/// Damage multiplier of a critical hit.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Seconds an EMP burst stops the boss from attacking.
pub const EMP_STUN_SECS: f64 = 3.0;

/// Boss family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BossKind {
    /// Tunnel-carving worm.
    Worm,
    /// Nano-drone hive.
    Swarm,
    /// Magma guardian.
    Core,
    /// Ancient defense machine.
    Construct,
}

/// Combat minigame, each boss family is weak to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinigameKind {
    /// Rapid tapping.
    Mash,
    /// Line up moving targets.
    Align,
    /// Hit a moving window.
    Timing,
    /// Repeat a sequence.
    Memory,
}

impl BossKind {
    /// Spawn rotation by depth tier.
    pub const ROTATION: [BossKind; 4] = [Self::Worm, Self::Swarm, Self::Core, Self::Construct];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Worm => "WORM",
            Self::Swarm => "SWARM",
            Self::Core => "CORE",
            Self::Construct => "CONSTRUCT",
        }
    }

    /// Minigame that breaks this boss's guard.
    pub fn weakness(self) -> MinigameKind {
        match self {
            Self::Worm => MinigameKind::Mash,
            Self::Swarm => MinigameKind::Align,
            Self::Core => MinigameKind::Timing,
            Self::Construct => MinigameKind::Memory,
        }
    }

    fn names(self) -> (&'static str, &'static str) {
        match self {
            Self::Worm => ("Deep Devourer", "Titanium Worm"),
            Self::Swarm => ("Hive Queen", "Collective Mind"),
            Self::Core => ("Core Guardian", "Singularity-1"),
            Self::Construct => ("Geometric Horror", "Monolith"),
        }
    }
}

impl fmt::Display for BossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl MinigameKind {
    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Mash => "MASH",
            Self::Align => "ALIGN",
            Self::Timing => "TIMING",
            Self::Memory => "MEMORY",
        }
    }
}

impl fmt::Display for MinigameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MinigameKind {
    type Err = MechError;

    fn from_str(s: &str) -> MechResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MASH" => Ok(Self::Mash),
            "ALIGN" => Ok(Self::Align),
            "TIMING" => Ok(Self::Timing),
            "MEMORY" => Ok(Self::Memory),
            _ => Err(MechError::UnknownMinigame(s.to_string())),
        }
    }
}

/// What a boss drops on defeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossReward {
    /// Experience.
    pub xp: f64,
    /// Guaranteed resources.
    pub resources: Vec<(ResourceKind, f64)>,
    /// Chance of an artifact drop.
    pub artifact_chance: f64,
}

/// A live boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    /// Codex id, e.g. `worm_basic`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Family.
    pub kind: BossKind,
    /// Depth tier it was spawned at.
    pub tier: u32,
    /// Full hp.
    pub max_hp: f64,
    /// Remaining hp.
    pub hp: f64,
    /// Damage per attack before defense.
    pub damage: f64,
    /// Seconds between attacks.
    pub attack_interval_secs: f64,
    /// Seconds since the last attack.
    pub attack_timer: f64,
    /// Seconds of stun left.
    pub stun_secs: f64,
    /// Guard raised while its phase minigame runs.
    pub invulnerable: bool,
    /// Remaining hp fractions that trigger a minigame, descending.
    pub phases: Vec<f64>,
    /// Drop table.
    pub reward: BossReward,
}

/// Depth tier used for boss scaling, at least 1.
pub fn boss_tier(depth: f64) -> u32 {
    ((depth.max(0.0) / BOSS_INTERVAL).floor() as u32).max(1)
}

/// Whether a boss is due at `depth`.
pub fn should_spawn(depth: f64, last_boss_depth: f64) -> bool {
    depth >= last_boss_depth + BOSS_INTERVAL
}

/// Build the boss for `depth`.
pub fn spawn_boss(depth: f64) -> Boss {
    let tier = boss_tier(depth);
    let step = (tier - 1) as f64;
    let kind = BossKind::ROTATION[((tier - 1) % 4) as usize];
    let advanced = tier > 4;
    let (basic_name, advanced_name) = kind.names();
    let max_hp = (500.0 * 1.5_f64.powf(step)).round();

    Boss {
        id: format!(
            "{}_{}",
            kind.id().to_ascii_lowercase(),
            if advanced { "advanced" } else { "basic" }
        ),
        name: if advanced { advanced_name } else { basic_name }.to_string(),
        kind,
        tier,
        max_hp,
        hp: max_hp,
        damage: (5.0 * 1.3_f64.powf(step)).round(),
        attack_interval_secs: (3.0 - 0.25 * step).max(1.0),
        attack_timer: 0.0,
        stun_secs: 0.0,
        invulnerable: false,
        phases: vec![0.75, 0.5, 0.25],
        reward: BossReward {
            xp: 250.0 * tier as f64,
            resources: vec![
                (tier_material(tier + 1), 100.0 * tier as f64),
                (ResourceKind::Rubies, 20.0 * tier as f64),
            ],
            artifact_chance: (0.2 + 0.1 * tier as f64).min(1.0),
        },
    }
}

/// The drill side of a duel tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuelContext {
    /// Drill damage per second.
    pub total_damage: f64,
    /// Flat damage reduction.
    pub defense: f64,
    /// Multiplier from active abilities.
    pub damage_multiplier: f64,
    /// Barrier up.
    pub invulnerable: bool,
    /// Chance per tick that the drill's damage crits.
    pub crit_chance: f64,
    /// Chance that a boss attack misses.
    pub evasion: f64,
}

/// Result of one duel tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DuelOutcome {
    /// Damage the boss took.
    pub damage_dealt: f64,
    /// Integrity the drill lost.
    pub damage_taken: f64,
    /// The drill's damage critted.
    pub crit: bool,
    /// A boss attack was dodged.
    pub evaded: bool,
    /// A phase threshold was crossed; this minigame starts.
    pub minigame: Option<MinigameKind>,
    /// The boss died this tick.
    pub defeated: bool,
}

impl Boss {
    /// Remaining hp as a fraction.
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp <= 0.0 { 0.0 } else { self.hp / self.max_hp }
    }

    /// Deal `amount` unless guarded. Returns damage actually dealt.
    pub fn strike(&mut self, amount: f64) -> f64 {
        if self.invulnerable || amount <= 0.0 {
            return 0.0;
        }
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Stop attacks for [`EMP_STUN_SECS`].
    pub fn stun(&mut self) {
        self.stun_secs = self.stun_secs.max(EMP_STUN_SECS);
        self.attack_timer = 0.0;
    }

    /// Advance the duel by `dt_secs`.
    pub fn duel_tick(
        &mut self,
        ctx: &DuelContext,
        dt_secs: f64,
        rng: &mut impl Rng,
    ) -> DuelOutcome {
        let crit = rng.random::<f64>() < ctx.crit_chance;
        let multiplier = if crit {
            ctx.damage_multiplier * CRIT_MULTIPLIER
        } else {
            ctx.damage_multiplier
        };
        let mut out = DuelOutcome {
            damage_dealt: self.strike(ctx.total_damage * multiplier * dt_secs),
            crit,
            ..DuelOutcome::default()
        };

        if self.hp <= 0.0 {
            out.defeated = true;
            return out;
        }

        if let Some(&threshold) = self.phases.first()
            && self.hp_fraction() <= threshold
        {
            self.phases.remove(0);
            self.invulnerable = true;
            out.minigame = Some(self.kind.weakness());
        }

        if self.stun_secs > 0.0 {
            self.stun_secs = (self.stun_secs - dt_secs).max(0.0);
            return out;
        }
        self.attack_timer += dt_secs;
        if self.attack_timer >= self.attack_interval_secs {
            self.attack_timer -= self.attack_interval_secs;
            if !ctx.invulnerable {
                if rng.random::<f64>() < ctx.evasion {
                    out.evaded = true;
                } else {
                    out.damage_taken = (self.damage - ctx.defense).max(1.0);
                }
            }
        }
        out
    }

    /// Settle a phase minigame. Returns the integrity the drill loses.
    pub fn complete_minigame(&mut self, success: bool) -> f64 {
        self.invulnerable = false;
        if success {
            self.hp = (self.hp - self.max_hp * MINIGAME_HIT).max(0.0);
            0.0
        } else {
            MINIGAME_FAIL_DAMAGE
        }
    }

    /// Whether the boss is dead.
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Damage of a thermal strike at the given heat.
pub fn thermal_strike_damage(heat: f64, total_damage: f64) -> f64 {
    total_damage * (1.0 + heat.max(0.0) / 10.0)
}

/// Rolled loot for a defeated boss.
#[derive(Debug, Clone, PartialEq)]
pub struct BossLoot {
    /// Experience.
    pub xp: f64,
    /// Resources.
    pub resources: Vec<(ResourceKind, f64)>,
    /// Artifact, if one dropped.
    pub artifact: Option<&'static ArtifactDefinition>,
}

/// Roll the drops for `boss`.
pub fn roll_loot(rng: &mut impl Rng, boss: &Boss, depth: f64, luck: f64) -> BossLoot {
    let artifact = (rng.random::<f64>() < boss.reward.artifact_chance)
        .then(|| roll_artifact(rng, depth, luck));
    BossLoot {
        xp: boss.reward.xp,
        resources: boss.reward.resources.clone(),
        artifact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx(damage: f64) -> DuelContext {
        DuelContext {
            total_damage: damage,
            defense: 0.0,
            damage_multiplier: 1.0,
            invulnerable: false,
            crit_chance: 0.0,
            evasion: 0.0,
        }
    }

    #[test]
    fn spawn_cadence() {
        assert!(!should_spawn(4999.0, 0.0));
        assert!(should_spawn(5000.0, 0.0));
        assert!(!should_spawn(9000.0, 5000.0));
    }

    #[test]
    fn bosses_rotate_and_scale() {
        let first = spawn_boss(5000.0);
        assert_eq!(first.kind, BossKind::Worm);
        assert_eq!(first.id, "worm_basic");
        assert_eq!(first.max_hp, 500.0);

        let second = spawn_boss(10_000.0);
        assert_eq!(second.kind, BossKind::Swarm);
        assert!(second.max_hp > first.max_hp);
        assert!(second.damage >= first.damage);
        assert!(second.attack_interval_secs < first.attack_interval_secs);

        let fifth = spawn_boss(25_000.0);
        assert_eq!(fifth.kind, BossKind::Worm);
        assert_eq!(fifth.id, "worm_advanced");
    }

    #[test]
    fn weaknesses() {
        assert_eq!(BossKind::Worm.weakness(), MinigameKind::Mash);
        assert_eq!(BossKind::Swarm.weakness(), MinigameKind::Align);
        assert_eq!(BossKind::Core.weakness(), MinigameKind::Timing);
        assert_eq!(BossKind::Construct.weakness(), MinigameKind::Memory);
    }

    #[test]
    fn phase_threshold_raises_guard() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        let out = boss.duel_tick(&ctx(130.0), 1.0, &mut rng);
        assert_eq!(out.minigame, Some(MinigameKind::Mash));
        assert!(boss.invulnerable);

        // guarded: no damage lands
        let out = boss.duel_tick(&ctx(130.0), 1.0, &mut rng);
        assert_eq!(out.damage_dealt, 0.0);

        assert_eq!(boss.complete_minigame(true), 0.0);
        assert!(!boss.invulnerable);
        assert_eq!(boss.hp, 500.0 - 130.0 - 125.0);
    }

    #[test]
    fn failed_minigame_hurts_drill() {
        let mut boss = spawn_boss(5000.0);
        boss.invulnerable = true;
        assert_eq!(boss.complete_minigame(false), MINIGAME_FAIL_DAMAGE);
        assert!(!boss.invulnerable);
        assert_eq!(boss.hp, boss.max_hp);
    }

    #[test]
    fn boss_attacks_on_interval_with_minimum_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        let armored = DuelContext { defense: 1000.0, ..ctx(0.0) };
        let mut taken = 0.0;
        for _ in 0..6 {
            taken += boss.duel_tick(&armored, 1.0, &mut rng).damage_taken;
        }
        // interval 3 s over 6 s: two hits floored at 1
        assert_eq!(taken, 2.0);
    }

    #[test]
    fn barrier_and_stun_block_attacks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        let shielded = DuelContext { invulnerable: true, ..ctx(0.0) };
        for _ in 0..10 {
            assert_eq!(boss.duel_tick(&shielded, 1.0, &mut rng).damage_taken, 0.0);
        }
        boss.stun();
        for _ in 0..3 {
            assert_eq!(boss.duel_tick(&ctx(0.0), 1.0, &mut rng).damage_taken, 0.0);
        }
    }

    #[test]
    fn defeat_and_loot() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        boss.phases.clear();
        let out = boss.duel_tick(&ctx(10_000.0), 1.0, &mut rng);
        assert!(out.defeated);
        assert!(boss.is_defeated());

        let loot = roll_loot(&mut rng, &boss, 5000.0, 0.0);
        assert_eq!(loot.xp, 250.0);
        assert!(loot.resources.iter().any(|(k, _)| *k == ResourceKind::Rubies));
    }

    #[test]
    fn crits_double_damage() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        boss.phases.clear();
        let lucky = DuelContext { crit_chance: 1.0, ..ctx(50.0) };
        let out = boss.duel_tick(&lucky, 1.0, &mut rng);
        assert!(out.crit);
        assert_eq!(out.damage_dealt, 100.0);
    }

    #[test]
    fn evasion_dodges_attacks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = spawn_boss(5000.0);
        let nimble = DuelContext { evasion: 1.0, ..ctx(0.0) };
        let mut dodged = 0;
        for _ in 0..6 {
            let out = boss.duel_tick(&nimble, 1.0, &mut rng);
            assert_eq!(out.damage_taken, 0.0);
            dodged += usize::from(out.evaded);
        }
        assert_eq!(dodged, 2);
    }

    #[test]
    fn thermal_strike_scales_with_heat() {
        assert_eq!(thermal_strike_damage(0.0, 10.0), 10.0);
        assert_eq!(thermal_strike_damage(50.0, 10.0), 60.0);
    }
}
