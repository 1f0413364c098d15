//! Faction reputation, tiers, and the perks they unlock.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Reputation ceiling for every faction.
pub const MAX_REPUTATION: i64 = 10_000;

/// Fraction of a gain taken from the rival faction.
pub const RIVALRY_PENALTY: f64 = 0.5;

/// One of the three factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactionId {
    /// Void Industries.
    Corporate,
    /// Aegis Collegium.
    Science,
    /// Free Miners.
    Rebels,
}

impl FactionId {
    /// All factions.
    pub const ALL: [FactionId; 3] = [Self::Corporate, Self::Science, Self::Rebels];

    /// Display name of the faction.
    pub fn name(self) -> &'static str {
        match self {
            Self::Corporate => "Void Industries",
            Self::Science => "Aegis Collegium",
            Self::Rebels => "Free Miners",
        }
    }

    /// The faction that loses standing when this one gains it.
    pub fn rival(self) -> Option<FactionId> {
        match self {
            Self::Corporate => Some(Self::Rebels),
            Self::Rebels => Some(Self::Corporate),
            Self::Science => None,
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Corporate => "CORPORATE",
            Self::Science => "SCIENCE",
            Self::Rebels => "REBELS",
        })
    }
}

impl FromStr for FactionId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CORPORATE" | "CORP" => Ok(Self::Corporate),
            "SCIENCE" => Ok(Self::Science),
            "REBELS" | "REBEL" => Ok(Self::Rebels),
            _ => Err(CoreError::UnknownFaction(s.to_string())),
        }
    }
}

/// `(level, minimum reputation, title)` rows.
pub const REPUTATION_TIERS: [(u32, i64, &str); 10] = [
    (1, 0, "Neutral"),
    (2, 100, "Associate"),
    (3, 300, "Contractor"),
    (4, 600, "Partner"),
    (5, 1000, "Ally"),
    (6, 1500, "Insider"),
    (7, 2500, "Executive"),
    (8, 4000, "Council"),
    (9, 6000, "Leader"),
    (10, 10_000, "Legend"),
];

/// Tier level for a raw reputation value.
pub fn reputation_level(value: i64) -> u32 {
    REPUTATION_TIERS
        .iter()
        .rev()
        .find(|(_, min, _)| value >= *min)
        .map(|(level, _, _)| *level)
        .unwrap_or(1)
}

/// Tier title for a raw reputation value.
pub fn reputation_title(value: i64) -> &'static str {
    let level = reputation_level(value);
    REPUTATION_TIERS
        .iter()
        .find(|(l, _, _)| *l == level)
        .map(|(_, _, name)| *name)
        .unwrap_or("Neutral")
}

/// A faction perk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perk {
    /// Market prices -5%.
    CorpExchange,
    /// Caravan capacity +20%.
    BulkLogistics,
    /// Caravan loss risk halved.
    Insurance,
    /// Passive generation doubled.
    Executive,
    /// Artifact value +10%.
    ResearchGrant,
    /// Analysis time -25%.
    AutoAnalysis,
    /// Side tunnel risk revealed.
    AnomalyScanner,
    /// Hazard frequency halved.
    QuantumStability,
    /// Black market access.
    BlackMarket,
    /// Travel cost -20%.
    Smuggler,
    /// Tunnel risk -10%.
    Sabotage,
    /// Base defence +50%.
    Liberation,
}

/// Static perk definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerkDef {
    /// The perk.
    pub perk: Perk,
    /// Owning faction.
    pub faction: FactionId,
    /// Tier level that unlocks it.
    pub level_required: u32,
    /// Display name.
    pub name: &'static str,
    /// Numeric strength, when the perk has one.
    pub value: Option<f64>,
}

/// All perks, grouped by faction in unlock order.
pub static PERKS: [PerkDef; 12] = [
    PerkDef { perk: Perk::CorpExchange, faction: FactionId::Corporate, level_required: 3, name: "Corporate Exchange", value: Some(0.05) },
    PerkDef { perk: Perk::BulkLogistics, faction: FactionId::Corporate, level_required: 5, name: "Bulk Logistics", value: Some(0.2) },
    PerkDef { perk: Perk::Insurance, faction: FactionId::Corporate, level_required: 7, name: "Cargo Insurance", value: Some(0.5) },
    PerkDef { perk: Perk::Executive, faction: FactionId::Corporate, level_required: 10, name: "Executive Access", value: Some(2.0) },
    PerkDef { perk: Perk::ResearchGrant, faction: FactionId::Science, level_required: 3, name: "Research Grants", value: Some(0.1) },
    PerkDef { perk: Perk::AutoAnalysis, faction: FactionId::Science, level_required: 5, name: "Auto-Analysis", value: Some(0.25) },
    PerkDef { perk: Perk::AnomalyScanner, faction: FactionId::Science, level_required: 7, name: "Anomaly Scanner", value: None },
    PerkDef { perk: Perk::QuantumStability, faction: FactionId::Science, level_required: 10, name: "Quantum Stability", value: Some(0.5) },
    PerkDef { perk: Perk::BlackMarket, faction: FactionId::Rebels, level_required: 3, name: "Black Market Access", value: None },
    PerkDef { perk: Perk::Smuggler, faction: FactionId::Rebels, level_required: 5, name: "Smuggler Routes", value: Some(0.2) },
    PerkDef { perk: Perk::Sabotage, faction: FactionId::Rebels, level_required: 7, name: "Sabotage Expertise", value: Some(0.1) },
    PerkDef { perk: Perk::Liberation, faction: FactionId::Rebels, level_required: 10, name: "Liberation Hero", value: Some(0.5) },
];

impl Perk {
    /// Static definition of this perk.
    pub fn def(self) -> &'static PerkDef {
        // Every variant has exactly one row.
        PERKS.iter().find(|d| d.perk == self).unwrap_or(&PERKS[0])
    }

    /// Numeric strength, or 0 for flag perks.
    pub fn value(self) -> f64 {
        self.def().value.unwrap_or(0.0)
    }
}

/// Outcome of a reputation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationChange {
    /// The faction that changed.
    pub faction: FactionId,
    /// Value after the change.
    pub value: i64,
    /// Tier level before.
    pub old_level: u32,
    /// Tier level after.
    pub new_level: u32,
    /// Amount the rival faction lost, if any.
    pub rival_penalty: Option<(FactionId, i64)>,
}

impl ReputationChange {
    /// Whether the faction gained a tier.
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Per-faction reputation values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionReputation {
    values: BTreeMap<FactionId, i64>,
}

impl FactionReputation {
    /// All factions at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw reputation with `faction`.
    pub fn get(&self, faction: FactionId) -> i64 {
        self.values.get(&faction).copied().unwrap_or(0)
    }

    /// Tier level with `faction`.
    pub fn level(&self, faction: FactionId) -> u32 {
        reputation_level(self.get(faction))
    }

    /// Adjust reputation, clamped to `0..=MAX_REPUTATION`.
    ///
    /// A positive gain for CORPORATE or REBELS costs the other side
    /// `floor(amount * 0.5)`, but only while the rival is above zero.
    pub fn add_reputation(&mut self, faction: FactionId, amount: i64) -> ReputationChange {
        let current = self.get(faction);
        let old_level = reputation_level(current);
        let value = (current + amount).clamp(0, MAX_REPUTATION);
        self.values.insert(faction, value);

        let mut rival_penalty = None;
        if amount > 0
            && let Some(rival) = faction.rival()
        {
            let rival_value = self.get(rival);
            if rival_value > 0 {
                let penalty = (amount as f64 * RIVALRY_PENALTY).floor() as i64;
                let after = (rival_value - penalty).max(0);
                self.values.insert(rival, after);
                rival_penalty = Some((rival, rival_value - after));
            }
        }

        ReputationChange {
            faction,
            value,
            old_level,
            new_level: reputation_level(value),
            rival_penalty,
        }
    }

    /// Perks unlocked with one faction.
    pub fn perks_for(&self, faction: FactionId) -> Vec<Perk> {
        let level = self.level(faction);
        PERKS
            .iter()
            .filter(|d| d.faction == faction && level >= d.level_required)
            .map(|d| d.perk)
            .collect()
    }

    /// Perks unlocked across all factions.
    pub fn active_perks(&self) -> Vec<Perk> {
        FactionId::ALL
            .into_iter()
            .flat_map(|f| self.perks_for(f))
            .collect()
    }

    /// Whether `perk` is unlocked.
    pub fn has_perk(&self, perk: Perk) -> bool {
        let def = perk.def();
        self.level(def.faction) >= def.level_required
    }
}
