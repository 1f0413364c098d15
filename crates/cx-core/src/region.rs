//! The five surface regions of the global map and their danger zones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::resource::ResourceKind;

/// Identifier of a map region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    /// Starting region.
    RustValley,
    /// Emerald-rich northern desert.
    CrystalWastes,
    /// Industrial iron belt.
    IronGates,
    /// Volcanic southern core.
    MagmaCore,
    /// The deep rift, end-game region.
    VoidChasm,
}

impl RegionId {
    /// All regions in progression order.
    pub const ALL: [RegionId; 5] = [
        Self::RustValley,
        Self::CrystalWastes,
        Self::IronGates,
        Self::MagmaCore,
        Self::VoidChasm,
    ];

    /// Stable snake_case identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::RustValley => "rust_valley",
            Self::CrystalWastes => "crystal_wastes",
            Self::IronGates => "iron_gates",
            Self::MagmaCore => "magma_core",
            Self::VoidChasm => "void_chasm",
        }
    }

    /// Static data for this region.
    pub fn info(self) -> &'static Region {
        match self {
            Self::RustValley => &REGIONS[0],
            Self::CrystalWastes => &REGIONS[1],
            Self::IronGates => &REGIONS[2],
            Self::MagmaCore => &REGIONS[3],
            Self::VoidChasm => &REGIONS[4],
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RegionId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let lower = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|r| r.id() == lower)
            .ok_or_else(|| CoreError::UnknownRegion(s.to_string()))
    }
}

/// Danger classification. Ordered from safest to most dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneColor {
    /// Safe.
    Green,
    /// Moderate risk.
    Yellow,
    /// High risk.
    Red,
}

impl ZoneColor {
    /// All zones from safest to most dangerous.
    pub const ALL: [ZoneColor; 3] = [Self::Green, Self::Yellow, Self::Red];

    /// The zone one step safer, if any.
    pub fn previous(self) -> Option<ZoneColor> {
        match self {
            Self::Green => None,
            Self::Yellow => Some(Self::Green),
            Self::Red => Some(Self::Yellow),
        }
    }
}

impl fmt::Display for ZoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        })
    }
}

impl FromStr for ZoneColor {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            _ => Err(CoreError::UnknownRegion(s.to_string())),
        }
    }
}

/// Static description of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Region id.
    pub id: RegionId,
    /// Display name.
    pub name: &'static str,
    /// Map position `(x, y)`.
    pub coordinates: (f64, f64),
    /// Player level the region is balanced for.
    pub recommended_level: u32,
    /// Zone colour before level adjustment.
    pub base_zone: ZoneColor,
    /// Yield multipliers for resources found here.
    pub resource_bonuses: &'static [(ResourceKind, f64)],
}

impl Region {
    /// Yield multiplier for `kind` in this region (1.0 when unlisted).
    pub fn resource_bonus(&self, kind: ResourceKind) -> f64 {
        self.resource_bonuses
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }
}

/// The region table.
pub static REGIONS: [Region; 5] = [
    Region {
        id: RegionId::RustValley,
        name: "Rust Valley",
        coordinates: (0.0, 0.0),
        recommended_level: 10,
        base_zone: ZoneColor::Green,
        resource_bonuses: &[(ResourceKind::Coal, 1.3)],
    },
    Region {
        id: RegionId::CrystalWastes,
        name: "Crystal Wastes",
        coordinates: (0.0, 1000.0),
        recommended_level: 25,
        base_zone: ZoneColor::Green,
        resource_bonuses: &[
            (ResourceKind::Emeralds, 3.0),
            (ResourceKind::Stone, 1.5),
            (ResourceKind::Gas, 1.2),
        ],
    },
    Region {
        id: RegionId::IronGates,
        name: "Iron Gates",
        coordinates: (1000.0, 0.0),
        recommended_level: 35,
        base_zone: ZoneColor::Yellow,
        resource_bonuses: &[
            (ResourceKind::Iron, 2.0),
            (ResourceKind::Silver, 1.5),
            (ResourceKind::Oil, 1.3),
        ],
    },
    Region {
        id: RegionId::MagmaCore,
        name: "Magma Core",
        coordinates: (-700.0, -700.0),
        recommended_level: 50,
        base_zone: ZoneColor::Red,
        resource_bonuses: &[
            (ResourceKind::Gold, 2.0),
            (ResourceKind::Titanium, 2.0),
            (ResourceKind::Uranium, 1.5),
            (ResourceKind::AncientTech, 2.0),
        ],
    },
    Region {
        id: RegionId::VoidChasm,
        name: "Void Chasm",
        coordinates: (700.0, 700.0),
        recommended_level: 60,
        base_zone: ZoneColor::Red,
        resource_bonuses: &[
            (ResourceKind::AncientTech, 3.0),
            (ResourceKind::Diamonds, 2.0),
            (ResourceKind::NanoSwarm, 1.5),
        ],
    },
];

/// Travel milliseconds per map unit (one minute per 1000 units).
pub const TRAVEL_MS_PER_UNIT: f64 = 60.0;

/// Shortest possible trip between two distinct regions.
pub const MIN_TRAVEL_MS: u64 = 30_000;

/// Rounded Euclidean distance between two regions.
pub fn calculate_distance(from: RegionId, to: RegionId) -> u64 {
    let (x1, y1) = from.info().coordinates;
    let (x2, y2) = to.info().coordinates;
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt().round() as u64
}

/// Effective zone of `region` for a player of `player_level`.
///
/// Outlevelling a region by 20 makes it green; meeting the recommendation
/// makes it yellow; anything below is red.
pub fn region_color(player_level: u32, region: RegionId) -> ZoneColor {
    let recommended = region.info().recommended_level;
    if player_level >= recommended + 20 {
        ZoneColor::Green
    } else if player_level >= recommended {
        ZoneColor::Yellow
    } else {
        ZoneColor::Red
    }
}

/// Travel time in milliseconds. Zero when staying put.
pub fn travel_time_ms(from: RegionId, to: RegionId) -> u64 {
    if from == to {
        return 0;
    }
    let raw = (calculate_distance(from, to) as f64 * TRAVEL_MS_PER_UNIT).round() as u64;
    raw.max(MIN_TRAVEL_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_distances() {
        assert_eq!(calculate_distance(RegionId::RustValley, RegionId::CrystalWastes), 1000);
        assert_eq!(calculate_distance(RegionId::RustValley, RegionId::MagmaCore), 990);
        assert_eq!(calculate_distance(RegionId::MagmaCore, RegionId::VoidChasm), 1980);
        assert_eq!(calculate_distance(RegionId::IronGates, RegionId::IronGates), 0);
    }

    #[test]
    fn region_color_thresholds() {
        // rust_valley recommends level 10
        assert_eq!(region_color(30, RegionId::RustValley), ZoneColor::Green);
        assert_eq!(region_color(29, RegionId::RustValley), ZoneColor::Yellow);
        assert_eq!(region_color(10, RegionId::RustValley), ZoneColor::Yellow);
        assert_eq!(region_color(9, RegionId::RustValley), ZoneColor::Red);
    }

    #[test]
    fn zone_ordering() {
        assert!(ZoneColor::Green < ZoneColor::Yellow);
        assert!(ZoneColor::Yellow < ZoneColor::Red);
        assert_eq!(ZoneColor::Red.previous(), Some(ZoneColor::Yellow));
        assert_eq!(ZoneColor::Green.previous(), None);
    }

    #[test]
    fn info_matches_id() {
        for id in RegionId::ALL {
            assert_eq!(id.info().id, id);
            assert_eq!(id.id().parse::<RegionId>().unwrap(), id);
        }
    }

    #[test]
    fn resource_bonus_defaults_to_one() {
        let wastes = RegionId::CrystalWastes.info();
        assert_eq!(wastes.resource_bonus(ResourceKind::Emeralds), 3.0);
        assert_eq!(wastes.resource_bonus(ResourceKind::Iron), 1.0);
    }

    #[test]
    fn travel_time_has_floor() {
        assert_eq!(travel_time_ms(RegionId::RustValley, RegionId::RustValley), 0);
        assert_eq!(
            travel_time_ms(RegionId::RustValley, RegionId::CrystalWastes),
            60_000
        );
        assert!(travel_time_ms(RegionId::RustValley, RegionId::IronGates) >= MIN_TRAVEL_MS);
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in 0usize..5, b in 0usize..5) {
            let (a, b) = (RegionId::ALL[a], RegionId::ALL[b]);
            prop_assert_eq!(calculate_distance(a, b), calculate_distance(b, a));
        }
    }
}
