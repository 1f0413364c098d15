//! Side tunnels: optional detours with a risk roll and a loot table.

use cx_core::artifact::{ArtifactDefinition, roll_artifact};
use cx_core::resource::ResourceKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::EventAction;

/// Kind of side tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TunnelKind {
    /// Stable, no risk.
    Safe,
    /// Unstable passage.
    Risky,
    /// Crystal cave, from 2000 m.
    Crystal,
    /// Abandoned mine, from 1000 m.
    Mine,
    /// Alien nest, from 3000 m.
    Nest,
}

impl TunnelKind {
    /// Option that enters this tunnel.
    pub fn action(self) -> EventAction {
        match self {
            Self::Safe => EventAction::TunnelSafe,
            Self::Risky => EventAction::TunnelRisky,
            Self::Crystal => EventAction::TunnelCrystal,
            Self::Mine => EventAction::TunnelMine,
            Self::Nest => EventAction::TunnelNest,
        }
    }

    /// Tunnel entered by an option, if any.
    pub fn from_action(action: EventAction) -> Option<Self> {
        match action {
            EventAction::TunnelSafe => Some(Self::Safe),
            EventAction::TunnelRisky => Some(Self::Risky),
            EventAction::TunnelCrystal => Some(Self::Crystal),
            EventAction::TunnelMine => Some(Self::Mine),
            EventAction::TunnelNest => Some(Self::Nest),
            _ => None,
        }
    }

    /// Static definition.
    pub fn def(self) -> &'static TunnelDef {
        match self {
            Self::Safe => &TUNNELS[0],
            Self::Risky => &TUNNELS[1],
            Self::Crystal => &TUNNELS[2],
            Self::Mine => &TUNNELS[3],
            Self::Nest => &TUNNELS[4],
        }
    }
}

/// A resource drop range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceRange {
    /// Resource dropped.
    pub kind: ResourceKind,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Static tunnel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelDef {
    /// Kind.
    pub kind: TunnelKind,
    /// Display name.
    pub name: &'static str,
    /// Flavour text.
    pub description: &'static str,
    /// Vague text shown without a scanner.
    pub hint: &'static str,
    /// Shallowest depth.
    pub min_depth: f64,
    /// Failure chance before luck.
    pub base_risk: f64,
    /// Resource drops.
    pub resources: &'static [ResourceRange],
    /// Chance of an artifact.
    pub artifact_chance: f64,
    /// Chance of ancient tech.
    pub tech_chance: f64,
    /// Base ancient tech amount.
    pub tech_amount: f64,
    /// Fraction of max integrity lost on failure.
    pub failure_damage: f64,
}

const fn range(kind: ResourceKind, min: f64, max: f64) -> ResourceRange {
    ResourceRange { kind, min, max }
}

/// Tunnel table.
pub static TUNNELS: [TunnelDef; 5] = [
    TunnelDef {
        kind: TunnelKind::Safe,
        name: "Stable Tunnel",
        description: "A seismically stable passage with visible ore veins.",
        hint: "A seismically stable passage with visible ore veins.",
        min_depth: 0.0,
        base_risk: 0.0,
        resources: &[
            range(ResourceKind::Copper, 20.0, 50.0),
            range(ResourceKind::Iron, 10.0, 30.0),
        ],
        artifact_chance: 0.05,
        tech_chance: 0.1,
        tech_amount: 5.0,
        failure_damage: 0.0,
    },
    TunnelDef {
        kind: TunnelKind::Risky,
        name: "Unstable Passage",
        description: "The walls tremble. Cave-ins are likely but the scanners show anomalies.",
        hint: "The walls tremble.",
        min_depth: 0.0,
        base_risk: 0.4,
        resources: &[],
        artifact_chance: 0.3,
        tech_chance: 0.5,
        tech_amount: 15.0,
        failure_damage: 0.3,
    },
    TunnelDef {
        kind: TunnelKind::Crystal,
        name: "Crystal Cave",
        description: "Resonating crystals cover every wall. Valuable and sharp.",
        hint: "A strange glow from a side passage.",
        min_depth: 2000.0,
        base_risk: 0.2,
        resources: &[
            range(ResourceKind::Rubies, 5.0, 15.0),
            range(ResourceKind::Emeralds, 2.0, 8.0),
            range(ResourceKind::Diamonds, 1.0, 3.0),
        ],
        artifact_chance: 0.4,
        tech_chance: 0.2,
        tech_amount: 20.0,
        failure_damage: 0.15,
    },
    TunnelDef {
        kind: TunnelKind::Mine,
        name: "Abandoned Mine",
        description: "Remains of ancient mining. Machinery collapses are common.",
        hint: "Traces of something artificial.",
        min_depth: 1000.0,
        base_risk: 0.6,
        resources: &[
            range(ResourceKind::Coal, 100.0, 300.0),
            range(ResourceKind::Iron, 50.0, 150.0),
            range(ResourceKind::Gold, 10.0, 30.0),
        ],
        artifact_chance: 0.2,
        tech_chance: 0.8,
        tech_amount: 40.0,
        failure_damage: 0.3,
    },
    TunnelDef {
        kind: TunnelKind::Nest,
        name: "Alien Nest",
        description: "Bio-scanners are off the chart. Extreme danger.",
        hint: "Strange sounds from the depths.",
        min_depth: 3000.0,
        base_risk: 0.8,
        resources: &[range(ResourceKind::NanoSwarm, 50.0, 200.0)],
        artifact_chance: 0.6,
        tech_chance: 0.4,
        tech_amount: 30.0,
        failure_damage: 0.5,
    },
];

/// A discovered tunnel waiting for the player's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideTunnel {
    /// Kind.
    pub kind: TunnelKind,
    /// Title shown to the player.
    pub title: String,
    /// Description shown to the player.
    pub description: String,
}

/// Discover a tunnel at `depth`.
///
/// 40% of discoveries are risky passages. Otherwise a special tunnel appears
/// with chance `min(0.5, depth/10000)`, falling back to a safe one. The
/// anomaly scanner reveals the name and risk.
pub fn generate(rng: &mut impl Rng, depth: f64, scanner: bool) -> SideTunnel {
    let special_chance = (depth / 10_000.0).min(0.5);
    let kind = if rng.random::<f64>() < 0.4 {
        TunnelKind::Risky
    } else if rng.random::<f64>() < special_chance {
        let eligible: Vec<TunnelKind> = [TunnelKind::Crystal, TunnelKind::Mine, TunnelKind::Nest]
            .into_iter()
            .filter(|k| depth >= k.def().min_depth)
            .collect();
        if eligible.is_empty() {
            TunnelKind::Safe
        } else {
            eligible[rng.random_range(0..eligible.len())]
        }
    } else {
        TunnelKind::Safe
    };

    let def = kind.def();
    let (title, description) = if scanner {
        (
            format!("[SCAN] {}", def.name),
            format!("{} (risk {}%)", def.description, (def.base_risk * 100.0).round()),
        )
    } else {
        ("Side Tunnel".to_string(), def.hint.to_string())
    };
    SideTunnel {
        kind,
        title,
        description,
    }
}

/// Player and drill facts that shape a tunnel attempt.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TunnelContext {
    /// Drill luck; each point cuts risk by 1%.
    pub luck: f64,
    /// Current depth.
    pub depth: f64,
    /// The SABOTAGE perk is active.
    pub sabotage: bool,
    /// Max hull integrity.
    pub max_integrity: f64,
    /// Flat damage reduction.
    pub defense: f64,
}

/// Result of entering a tunnel.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelOutcome {
    /// Kind entered.
    pub kind: TunnelKind,
    /// The risk roll passed.
    pub success: bool,
    /// Resources found.
    pub resources: Vec<(ResourceKind, f64)>,
    /// Ancient tech found.
    pub tech: f64,
    /// Artifact found.
    pub artifact: Option<&'static ArtifactDefinition>,
    /// Integrity lost.
    pub damage: f64,
}

/// Failure chance after luck and perks.
pub fn effective_risk(def: &TunnelDef, luck: f64, sabotage: bool) -> f64 {
    let mut risk = (def.base_risk - luck * 0.01).max(0.0);
    if sabotage {
        risk = (risk - 0.1).max(0.0);
    }
    risk
}

/// Roll a tunnel attempt.
pub fn resolve(rng: &mut impl Rng, kind: TunnelKind, ctx: &TunnelContext) -> TunnelOutcome {
    let def = kind.def();
    let risk = effective_risk(def, ctx.luck, ctx.sabotage);
    let success = rng.random::<f64>() >= risk;
    debug!(kind = ?kind, risk, success, "side tunnel attempt");

    let mut outcome = TunnelOutcome {
        kind,
        success,
        resources: Vec::new(),
        tech: 0.0,
        artifact: None,
        damage: 0.0,
    };

    if success {
        let depth_mult = 1.0 + ctx.depth.max(0.0) / 5000.0;
        for r in def.resources {
            let base = (r.min + rng.random::<f64>() * (r.max - r.min)).floor();
            let total = (base * depth_mult).floor();
            if total > 0.0 {
                outcome.resources.push((r.kind, total));
            }
        }
        if rng.random::<f64>() < def.tech_chance {
            outcome.tech = (def.tech_amount * (1.0 + rng.random::<f64>())).floor();
        }
        if rng.random::<f64>() < def.artifact_chance {
            outcome.artifact = Some(roll_artifact(rng, ctx.depth, ctx.luck));
        }
    } else {
        let raw = (ctx.max_integrity * def.failure_damage).floor();
        outcome.damage = (raw - ctx.defense).max(0.0);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx(depth: f64) -> TunnelContext {
        TunnelContext {
            luck: 0.0,
            depth,
            sabotage: false,
            max_integrity: 100.0,
            defense: 0.0,
        }
    }

    #[test]
    fn safe_tunnel_always_succeeds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let out = resolve(&mut rng, TunnelKind::Safe, &ctx(0.0));
            assert!(out.success);
            assert_eq!(out.damage, 0.0);
            assert_eq!(out.resources.len(), 2);
        }
    }

    #[test]
    fn depth_scales_resources() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve(&mut rng, TunnelKind::Safe, &ctx(10_000.0));
        let copper = out.resources.iter().find(|(k, _)| *k == ResourceKind::Copper).unwrap().1;
        assert!((60.0..=150.0).contains(&copper));
    }

    #[test]
    fn luck_and_sabotage_reduce_risk() {
        let risky = TunnelKind::Risky.def();
        assert_eq!(effective_risk(risky, 0.0, false), 0.4);
        assert!((effective_risk(risky, 10.0, false) - 0.3).abs() < 1e-12);
        assert!((effective_risk(risky, 10.0, true) - 0.2).abs() < 1e-12);
        assert_eq!(effective_risk(risky, 100.0, true), 0.0);
    }

    #[test]
    fn failure_damage_respects_defense() {
        let mut rng = StdRng::seed_from_u64(3);
        let c = TunnelContext {
            defense: 10.0,
            ..ctx(5000.0)
        };
        let failed = (0..200)
            .map(|_| resolve(&mut rng, TunnelKind::Nest, &c))
            .find(|o| !o.success)
            .unwrap();
        assert_eq!(failed.damage, 40.0);
    }

    #[test]
    fn generate_picks_eligible_kinds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let t = generate(&mut rng, 500.0, false);
            assert!(matches!(t.kind, TunnelKind::Safe | TunnelKind::Risky));
        }
        let mut seen_special = false;
        for _ in 0..500 {
            let t = generate(&mut rng, 10_000.0, true);
            assert!(t.title.starts_with("[SCAN]"));
            seen_special |= matches!(t.kind, TunnelKind::Crystal | TunnelKind::Mine | TunnelKind::Nest);
        }
        assert!(seen_special);
    }

    #[test]
    fn action_mapping_round_trips() {
        for def in &TUNNELS {
            assert_eq!(TunnelKind::from_action(def.kind.action()), Some(def.kind));
            assert_eq!(def.kind.def().kind, def.kind);
        }
        assert_eq!(TunnelKind::from_action(EventAction::PodHack), None);
    }
}
