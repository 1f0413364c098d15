//! Support drones and their upgrade table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cx_core::resource::{ResourceKind, Resources};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Highest drone level.
pub const MAX_DRONE_LEVEL: u32 = 10;

/// Cost growth per level.
pub const DRONE_COST_MULTIPLIER: f64 = 1.6;

/// Drone family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneKind {
    /// Patches the hull.
    Repair,
    /// Vents heat.
    Cooler,
}

impl DroneKind {
    /// Every drone.
    pub const ALL: [DroneKind; 2] = [Self::Repair, Self::Cooler];

    pub fn id(self) -> &'static str {
        match self {
            Self::Repair => "repair",
            Self::Cooler => "cooler",
        }
    }

    /// Price of level 1.
    pub fn base_cost(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Repair => &[(ResourceKind::Iron, 200.0), (ResourceKind::Rubies, 500.0)],
            Self::Cooler => &[(ResourceKind::Copper, 200.0), (ResourceKind::Rubies, 400.0)],
        }
    }

    /// Price of the level after `current`.
    pub fn cost(self, current: u32) -> Vec<(ResourceKind, f64)> {
        let scale = DRONE_COST_MULTIPLIER.powi(current as i32);
        self.base_cost()
            .iter()
            .map(|&(k, a)| (k, (a * scale).floor()))
            .collect()
    }
}

impl fmt::Display for DroneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DroneKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.id() == lower)
            .ok_or_else(|| SimError::Parse {
                input: s.to_string(),
                reason: "unknown drone".to_string(),
            })
    }
}

/// Owned drones and their levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DroneBay {
    levels: BTreeMap<DroneKind, u32>,
}

impl DroneBay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of `kind`, 0 when not owned.
    pub fn level(&self, kind: DroneKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_active(&self, kind: DroneKind) -> bool {
        self.level(kind) > 0
    }

    /// Buy the first level, or the next one. Returns the new level.
    pub fn upgrade(&mut self, kind: DroneKind, wallet: &mut Resources) -> SimResult<u32> {
        let current = self.level(kind);
        if current >= MAX_DRONE_LEVEL {
            return Err(SimError::NotAllowed(format!("{kind} drone is at max level")));
        }
        wallet.spend(&kind.cost(current))?;
        self.levels.insert(kind, current + 1);
        Ok(current + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DroneKind, u32)> + '_ {
        self.levels.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_grows_per_level() {
        assert_eq!(
            DroneKind::Repair.cost(0),
            vec![(ResourceKind::Iron, 200.0), (ResourceKind::Rubies, 500.0)]
        );
        assert_eq!(
            DroneKind::Cooler.cost(2),
            vec![(ResourceKind::Copper, 512.0), (ResourceKind::Rubies, 1024.0)]
        );
    }

    #[test]
    fn upgrade_spends_and_caps() {
        let mut wallet = Resources::from_bundle(&[
            (ResourceKind::Iron, 1e9),
            (ResourceKind::Rubies, 1e9),
        ]);
        let mut bay = DroneBay::new();
        assert!(!bay.is_active(DroneKind::Repair));
        for expected in 1..=MAX_DRONE_LEVEL {
            assert_eq!(bay.upgrade(DroneKind::Repair, &mut wallet).unwrap(), expected);
        }
        assert!(bay.upgrade(DroneKind::Repair, &mut wallet).is_err());
    }

    #[test]
    fn upgrade_without_funds_changes_nothing() {
        let mut wallet = Resources::from_bundle(&[(ResourceKind::Rubies, 400.0)]);
        let mut bay = DroneBay::new();
        assert!(bay.upgrade(DroneKind::Cooler, &mut wallet).is_err());
        assert_eq!(bay.level(DroneKind::Cooler), 0);
        assert_eq!(wallet.get(ResourceKind::Rubies), 400.0);
    }

    #[test]
    fn parses_ids() {
        assert_eq!("Cooler".parse::<DroneKind>().unwrap(), DroneKind::Cooler);
        assert!("miner".parse::<DroneKind>().is_err());
    }
}
