//! Random events: types, probability models, and the static catalog.
//!
//! Events are plain `static` data. Behaviour that depends on depth or game
//! context is named by [`DepthCurve`] and [`ConditionalRule`] and evaluated
//! by the roller.

pub mod catalog;
pub mod roller;

pub use catalog::{EVENTS, event_by_id};
pub use roller::{
    OptionOutcome, caravan_delay_ms, event_probability, is_on_cooldown, matches_trigger,
    resolve_option, roll_random_event, sample_instant_resource,
};

use std::fmt;
use std::str::FromStr;

use cx_core::region::ZoneColor;
use cx_core::resource::ResourceKind;
use serde::{Deserialize, Serialize};

use crate::error::MechError;

/// Presentation class of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Informational, applied immediately.
    Notification,
    /// Harmful, applied immediately.
    Warning,
    /// Waits for the player to pick an option.
    Choice,
    /// Drops an artifact.
    Artifact,
    /// Strange, usually with a lasting effect.
    Anomaly,
    /// Timed bonus.
    Buff,
}

/// The context an event may fire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTrigger {
    /// Drilling downwards.
    Drilling,
    /// Travelling between regions.
    Traveling,
    /// Standing at one of the player's bases.
    BaseVisit,
    /// A market refresh.
    MarketUpdate,
    /// Fighting a boss.
    Combat,
    /// On the global map.
    GlobalMapActive,
    /// A caravan is en route.
    CaravanTraveling,
    /// Stranded without fuel.
    StuckInSpace,
    /// A red-zone base is exposed.
    BaseRaid,
}

/// Depth scaling applied to a Poisson rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthCurve {
    /// Always 1.
    Flat,
    /// 0.5 shallower than 3000 m, 0.7 deeper than 6000 m, 1 between.
    GasPocket,
    /// 1.5 shallower than 3000 m, 0.5 deeper.
    CoalSeam,
    /// `min(3, 1 + depth/5000)`.
    OilDeposit,
}

impl DepthCurve {
    /// Multiplier at `depth`.
    pub fn factor(self, depth: f64) -> f64 {
        match self {
            Self::Flat => 1.0,
            Self::GasPocket => {
                if depth < 3000.0 {
                    0.5
                } else if depth > 6000.0 {
                    0.7
                } else {
                    1.0
                }
            }
            Self::CoalSeam => {
                if depth < 3000.0 {
                    1.5
                } else {
                    0.5
                }
            }
            Self::OilDeposit => (1.0 + depth / 5000.0).min(3.0),
        }
    }
}

/// Game facts a conditional probability reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventContext {
    /// Current depth.
    pub depth: f64,
    /// Current heat.
    pub heat: f64,
    /// Zone colour of the relevant region.
    pub zone: ZoneColor,
    /// Market value of cargo at risk.
    pub cargo_value: f64,
    /// Star level of the relevant caravan.
    pub caravan_level: u32,
    /// The relevant base has a fortification.
    pub has_fortification: bool,
    /// The relevant base has guards.
    pub has_guards: bool,
}

impl Default for EventContext {
    fn default() -> Self {
        Self {
            depth: 0.0,
            heat: 0.0,
            zone: ZoneColor::Green,
            cargo_value: 0.0,
            caravan_level: 1,
            has_fortification: false,
            has_guards: false,
        }
    }
}

/// Context-dependent chance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalRule {
    /// Zone risk plus `min(0.2, cargo/100000)`.
    PirateRaid,
    /// `0.10 / caravan level`.
    CaravanDelay,
    /// Red zone only: fortified 0, guarded 0.001, else 0.005.
    BaseRaid,
}

impl ConditionalRule {
    /// Chance for this rule in `ctx`.
    pub fn chance(self, ctx: &EventContext) -> f64 {
        match self {
            Self::PirateRaid => {
                let zone_risk = match ctx.zone {
                    ZoneColor::Green => 0.05,
                    ZoneColor::Yellow => 0.15,
                    ZoneColor::Red => 0.30,
                };
                zone_risk + (ctx.cargo_value.max(0.0) / 100_000.0).min(0.2)
            }
            Self::CaravanDelay => 0.10 / f64::from(ctx.caravan_level.max(1)),
            Self::BaseRaid => {
                if ctx.zone != ZoneColor::Red || ctx.has_fortification {
                    0.0
                } else if ctx.has_guards {
                    0.001
                } else {
                    0.005
                }
            }
        }
    }
}

/// How often an event fires once rolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbabilityModel {
    /// Rate per hour, scaled by depth.
    Poisson {
        /// Events per hour.
        lambda: f64,
        /// Depth scaling.
        curve: DepthCurve,
    },
    /// `base · e^(-depth/scale)`.
    ExponentialDecay {
        /// Chance at the surface.
        base: f64,
        /// Depth of one e-fold.
        scale: f64,
    },
    /// Evaluated against [`EventContext`].
    Conditional(ConditionalRule),
    /// Relies on the catalog weight alone.
    Weighted,
}

/// Player responses to choice events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    /// Brace against the shift.
    TectonicHold,
    /// Ride the shift downwards.
    TectonicPush,
    /// Cut the pod open.
    PodLaser,
    /// Decrypt the pod.
    PodHack,
    /// Accept the fluctuation.
    AcceptFluctuation,
    /// Stabilize.
    RejectFluctuation,
    /// Follow the AI's route.
    AiTrust,
    /// Reboot the logic core.
    AiReboot,
    /// Purge the nanomites.
    PurgeNanomites,
    /// Absorb the crystal energy.
    CrystalAbsorb,
    /// Take the stable tunnel.
    TunnelSafe,
    /// Explore the discovered tunnel.
    TunnelRisky,
    /// Enter a crystal cave.
    TunnelCrystal,
    /// Enter an abandoned mine.
    TunnelMine,
    /// Enter an alien nest.
    TunnelNest,
    /// Ignore the encounter.
    Ignore,
    /// Buy the tip.
    BlackMarketBuy,
    /// Refuse the tip.
    BlackMarketRefuse,
    /// Accept evacuation.
    RescueAccept,
    /// Refuse evacuation.
    RescueRefuse,
}

impl EventAction {
    /// All actions.
    pub const ALL: [EventAction; 20] = [
        Self::TectonicHold,
        Self::TectonicPush,
        Self::PodLaser,
        Self::PodHack,
        Self::AcceptFluctuation,
        Self::RejectFluctuation,
        Self::AiTrust,
        Self::AiReboot,
        Self::PurgeNanomites,
        Self::CrystalAbsorb,
        Self::TunnelSafe,
        Self::TunnelRisky,
        Self::TunnelCrystal,
        Self::TunnelMine,
        Self::TunnelNest,
        Self::Ignore,
        Self::BlackMarketBuy,
        Self::BlackMarketRefuse,
        Self::RescueAccept,
        Self::RescueRefuse,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::TectonicHold => "TECTONIC_HOLD",
            Self::TectonicPush => "TECTONIC_PUSH",
            Self::PodLaser => "POD_LASER",
            Self::PodHack => "POD_HACK",
            Self::AcceptFluctuation => "ACCEPT_FLUCTUATION",
            Self::RejectFluctuation => "REJECT_FLUCTUATION",
            Self::AiTrust => "AI_TRUST",
            Self::AiReboot => "AI_REBOOT",
            Self::PurgeNanomites => "PURGE_NANOMITES",
            Self::CrystalAbsorb => "CRYSTAL_ABSORB",
            Self::TunnelSafe => "TUNNEL_SAFE",
            Self::TunnelRisky => "TUNNEL_RISKY",
            Self::TunnelCrystal => "TUNNEL_CRYSTAL",
            Self::TunnelMine => "TUNNEL_MINE",
            Self::TunnelNest => "TUNNEL_NEST",
            Self::Ignore => "IGNORE",
            Self::BlackMarketBuy => "BLACK_MARKET_BUY",
            Self::BlackMarketRefuse => "BLACK_MARKET_REFUSE",
            Self::RescueAccept => "RESCUE_ACCEPT",
            Self::RescueRefuse => "RESCUE_REFUSE",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EventAction {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, MechError> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|a| a.id() == upper)
            .ok_or_else(|| MechError::UnknownAction(s.to_string()))
    }
}

/// One choice offered by an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventOption {
    /// Button text.
    pub label: &'static str,
    /// Action taken.
    pub action: EventAction,
    /// Warning shown next to the option.
    pub risk: Option<&'static str>,
}

/// Resource granted on trigger, drawn from a clamped normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantResource {
    /// Resource granted.
    pub kind: ResourceKind,
    /// Lower clamp (default 0).
    pub min: Option<f64>,
    /// Upper clamp (default 1000).
    pub max: Option<f64>,
    /// Mean (default 100).
    pub mean: Option<f64>,
    /// Standard deviation. Without it the mean is used as-is.
    pub std_dev: Option<f64>,
}

/// Delay length of a caravan delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayMinutes {
    /// A fixed delay.
    Fixed(f64),
    /// Exponentially distributed with this mean.
    Exponential(f64),
}

/// What an event does to caravans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaravanEffect {
    /// Push the arrival back.
    Delay {
        /// Length of the delay.
        minutes: DelayMinutes,
        /// Also block player travel.
        block_travel: bool,
    },
    /// Pirates attack; cargo is lost unless defended.
    Raid {
        /// Chance to fend off the raid.
        success_chance: f64,
    },
}

/// What an event does to a base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaseEffect {
    /// Raiders loot storage on failure.
    Raid {
        /// Chance to defend.
        defend_chance: f64,
        /// Minimum fraction of storage lost.
        storage_loss_min: f64,
        /// Maximum fraction of storage lost.
        storage_loss_max: f64,
        /// Rubies charged for repairs.
        repair_cost: f64,
        /// Rubies awarded for a successful defense.
        defend_reward: f64,
    },
}

/// A catalog event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameEvent {
    /// Identifier.
    pub id: &'static str,
    /// Headline.
    pub title: &'static str,
    /// Flavour text.
    pub description: &'static str,
    /// Presentation class.
    pub kind: EventType,
    /// Weight in the roll.
    pub weight: f64,
    /// Shallowest depth the event can occur at.
    pub min_depth: f64,
    /// Choices, empty for non-choice events.
    pub options: &'static [EventOption],
    /// Effect applied on trigger.
    pub effect_id: Option<&'static str>,
    /// Damage as a fraction of max integrity.
    pub instant_damage: Option<f64>,
    /// Metres gained.
    pub instant_depth: Option<f64>,
    /// XP gained.
    pub instant_xp: Option<f64>,
    /// Heat gained.
    pub instant_heat: Option<f64>,
    /// Drop an artifact on trigger.
    pub force_artifact_drop: bool,
    /// Contexts the event may fire in. Empty matches all.
    pub triggers: &'static [EventTrigger],
    /// Chance model. `None` uses the legacy 10%.
    pub probability: Option<ProbabilityModel>,
    /// Resource granted on trigger.
    pub instant_resource: Option<InstantResource>,
    /// Effect on caravans.
    pub caravan_effect: Option<CaravanEffect>,
    /// Effect on bases.
    pub base_effect: Option<BaseEffect>,
    /// Seconds before the event can fire again. 0 for none.
    pub cooldown_secs: u64,
}

impl GameEvent {
    /// Whether the event waits for a player choice.
    pub fn is_choice(&self) -> bool {
        !self.options.is_empty()
    }

    /// Whether `action` is one of this event's options.
    pub fn offers(&self, action: EventAction) -> bool {
        self.options.iter().any(|o| o.action == action)
    }
}
