//! Zone licenses, regional permits, and global reputation discounts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::region::{RegionId, ZoneColor};
use crate::resource::{ResourceKind, Resources};

/// How long a temporary permit lasts: seven days.
pub const TEMP_PERMIT_DURATION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// A license tier derived from global reputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LicenseTier {
    /// Tier number, 1..=5.
    pub tier: u32,
    /// Lowest reputation in the tier.
    pub min: i64,
    /// Highest reputation in the tier.
    pub max: i64,
    /// Price discount applied to licenses and permits.
    pub discount: f64,
}

/// Global reputation tiers.
pub static LICENSE_TIERS: [LicenseTier; 5] = [
    LicenseTier { tier: 1, min: 0, max: 99, discount: 0.0 },
    LicenseTier { tier: 2, min: 100, max: 249, discount: 0.05 },
    LicenseTier { tier: 3, min: 250, max: 499, discount: 0.10 },
    LicenseTier { tier: 4, min: 500, max: 999, discount: 0.20 },
    LicenseTier { tier: 5, min: 1000, max: i64::MAX, discount: 0.30 },
];

/// Tier for a global reputation value.
pub fn license_tier(global_reputation: i64) -> &'static LicenseTier {
    LICENSE_TIERS
        .iter()
        .find(|t| global_reputation >= t.min && global_reputation <= t.max)
        .unwrap_or(&LICENSE_TIERS[0])
}

/// Base ruby price of a zone license.
pub fn license_price(zone: ZoneColor) -> u64 {
    match zone {
        ZoneColor::Green => 5_000,
        ZoneColor::Yellow => 25_000,
        ZoneColor::Red => 100_000,
    }
}

/// Temporary or permanent permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitKind {
    /// Expires after [`TEMP_PERMIT_DURATION_MS`].
    Temporary,
    /// Never expires.
    Permanent,
}

/// Base ruby price of a permit, or `None` when the region is quest-only.
pub fn permit_price(region: RegionId, kind: PermitKind) -> Option<u64> {
    let (temp, perm) = match region {
        RegionId::RustValley => (0, 0),
        RegionId::CrystalWastes => (1_000, 10_000),
        RegionId::IronGates => (5_000, 50_000),
        RegionId::MagmaCore => (20_000, 200_000),
        RegionId::VoidChasm => return None,
    };
    Some(match kind {
        PermitKind::Temporary => temp,
        PermitKind::Permanent => perm,
    })
}

/// Zone license needed before buying a permit for `region`.
pub fn required_license(region: RegionId) -> ZoneColor {
    match region {
        RegionId::RustValley | RegionId::CrystalWastes => ZoneColor::Green,
        RegionId::IronGates => ZoneColor::Yellow,
        RegionId::MagmaCore | RegionId::VoidChasm => ZoneColor::Red,
    }
}

/// `round(base * (1 - discount))` for the holder's tier.
pub fn discounted_price(base: u64, global_reputation: i64) -> u64 {
    let tier = license_tier(global_reputation);
    (base as f64 * (1.0 - tier.discount)).round() as u64
}

/// A permit held for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// Covered region.
    pub region: RegionId,
    /// Permit kind.
    pub kind: PermitKind,
    /// Expiry on the game clock; `None` for permanent permits.
    pub expires_at_ms: Option<u64>,
}

impl Permit {
    /// A new permit issued at `now_ms`.
    pub fn issue(region: RegionId, kind: PermitKind, now_ms: u64) -> Self {
        let expires_at_ms = match kind {
            PermitKind::Temporary => Some(now_ms + TEMP_PERMIT_DURATION_MS),
            PermitKind::Permanent => None,
        };
        Self {
            region,
            kind,
            expires_at_ms,
        }
    }

    /// Whether the permit still applies at `now_ms`.
    pub fn is_active(&self, now_ms: u64) -> bool {
        match self.kind {
            PermitKind::Permanent => true,
            PermitKind::Temporary => self.expires_at_ms.is_some_and(|t| t > now_ms),
        }
    }
}

/// Licenses, permits, and global reputation held by the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseState {
    /// Reputation shared across factions, drives price discounts.
    pub global_reputation: i64,
    /// Owned zone licenses.
    pub licenses: BTreeSet<ZoneColor>,
    /// Permits by region.
    pub permits: BTreeMap<RegionId, Permit>,
}

impl LicenseState {
    /// No licenses or permits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current global reputation tier.
    pub fn tier(&self) -> &'static LicenseTier {
        license_tier(self.global_reputation)
    }

    /// Whether the held licenses reach `zone` (green < yellow < red).
    pub fn has_license_for(&self, zone: ZoneColor) -> bool {
        self.licenses.iter().any(|z| *z >= zone)
    }

    /// Whether the player may operate in `region` at `now_ms`.
    pub fn has_active_permit(&self, region: RegionId, now_ms: u64) -> bool {
        if region == RegionId::RustValley {
            return true;
        }
        self.permits
            .get(&region)
            .is_some_and(|p| p.is_active(now_ms))
    }

    /// Buy a zone license with rubies and return the price paid.
    pub fn buy_license(&mut self, zone: ZoneColor, wallet: &mut Resources) -> CoreResult<u64> {
        if self.licenses.contains(&zone) {
            return Err(CoreError::LicenseOwned(zone));
        }
        if let Some(previous) = zone.previous()
            && !self.licenses.contains(&previous)
        {
            return Err(CoreError::LicenseRequired(previous));
        }
        let price = discounted_price(license_price(zone), self.global_reputation);
        wallet.spend(&[(ResourceKind::Rubies, price as f64)])?;
        self.licenses.insert(zone);
        Ok(price)
    }

    /// Buy a permit for `region` and return the price paid.
    pub fn buy_permit(
        &mut self,
        region: RegionId,
        kind: PermitKind,
        wallet: &mut Resources,
        now_ms: u64,
    ) -> CoreResult<u64> {
        if self
            .permits
            .get(&region)
            .is_some_and(|p| p.kind == PermitKind::Permanent)
        {
            return Err(CoreError::PermitOwned(region));
        }
        let base = permit_price(region, kind).ok_or(CoreError::PermitQuestOnly(region))?;
        let zone = required_license(region);
        if !self.has_license_for(zone) {
            return Err(CoreError::LicenseRequired(zone));
        }
        let price = discounted_price(base, self.global_reputation);
        wallet.spend(&[(ResourceKind::Rubies, price as f64)])?;
        self.permits
            .insert(region, Permit::issue(region, kind, now_ms));
        Ok(price)
    }

    /// Grant a permanent permit without payment (quest rewards).
    pub fn grant_permit(&mut self, region: RegionId, now_ms: u64) {
        self.permits
            .insert(region, Permit::issue(region, PermitKind::Permanent, now_ms));
    }

    /// Adjust global reputation (never below zero). Returns the new tier
    /// number when it went up.
    pub fn add_global_reputation(&mut self, amount: i64) -> Option<u32> {
        let before = self.tier().tier;
        self.global_reputation = (self.global_reputation + amount).max(0);
        let after = self.tier().tier;
        (after > before).then_some(after)
    }
}
