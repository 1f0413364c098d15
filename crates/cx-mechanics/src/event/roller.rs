//! Picking, gating and resolving events.

use cx_core::region::RegionId;
use cx_core::resource::ResourceKind;
use rand::Rng;
use tracing::debug;

use super::catalog::EVENTS;
use super::{
    CaravanEffect, DelayMinutes, EventAction, EventContext, EventTrigger, GameEvent,
    InstantResource, ProbabilityModel,
};
use crate::probability::{exponential_decay, normal, poisson_event_chance};

/// Chance used for events without a probability model.
pub const LEGACY_EVENT_CHANCE: f64 = 0.1;

/// Number of recent event ids kept to prevent repeats.
pub const RECENT_EVENT_MEMORY: usize = 5;

/// Weighted pick among catalog events that are not recent and are reachable
/// at `depth`. `None` when nothing qualifies.
pub fn roll_random_event(
    rng: &mut impl Rng,
    recent_ids: &[String],
    depth: f64,
) -> Option<&'static GameEvent> {
    let valid: Vec<&'static GameEvent> = EVENTS
        .iter()
        .filter(|e| !recent_ids.iter().any(|r| r == e.id))
        .filter(|e| depth >= e.min_depth)
        .collect();
    if valid.is_empty() {
        return None;
    }

    let total: f64 = valid.iter().map(|e| e.weight).sum();
    let mut roll = rng.random::<f64>() * total;
    for event in valid {
        if roll < event.weight {
            debug!(event = event.id, "picked random event");
            return Some(event);
        }
        roll -= event.weight;
    }
    None
}

/// An event with no triggers matches every trigger.
pub fn matches_trigger(event: &GameEvent, trigger: EventTrigger) -> bool {
    event.triggers.is_empty() || event.triggers.contains(&trigger)
}

/// Whether an event last fired at `last_ms` is still cooling down.
pub fn is_on_cooldown(last_ms: Option<u64>, now_ms: u64, cooldown_secs: u64) -> bool {
    match last_ms {
        Some(last) if cooldown_secs > 0 => now_ms.saturating_sub(last) < cooldown_secs * 1000,
        _ => false,
    }
}

/// Chance that `event` fires during a window of `dt_secs`.
pub fn event_probability(event: &GameEvent, ctx: &EventContext, dt_secs: f64) -> f64 {
    let Some(model) = event.probability else {
        return LEGACY_EVENT_CHANCE;
    };
    match model {
        ProbabilityModel::Poisson { lambda, curve } => {
            poisson_event_chance(lambda * curve.factor(ctx.depth), dt_secs / 3600.0)
        }
        ProbabilityModel::ExponentialDecay { base, scale } => {
            exponential_decay(base, ctx.depth, scale)
        }
        ProbabilityModel::Conditional(rule) => rule.chance(ctx),
        ProbabilityModel::Weighted => LEGACY_EVENT_CHANCE,
    }
}

/// Draw the amount of an instant resource, rounded down.
///
/// With both a mean and a deviation the amount is a normal draw clamped to
/// `[min, max]`; otherwise it is the mean.
pub fn sample_instant_resource(rng: &mut impl Rng, res: &InstantResource) -> f64 {
    let amount = match (res.mean, res.std_dev) {
        (Some(mean), Some(sd)) => {
            let lo = res.min.unwrap_or(0.0);
            let hi = res.max.unwrap_or(1000.0);
            normal(rng, mean, sd).clamp(lo, hi.max(lo))
        }
        (mean, _) => mean.unwrap_or(100.0),
    };
    amount.floor().max(0.0)
}

/// Delay a caravan effect adds, in milliseconds. Zero for raids.
pub fn caravan_delay_ms(rng: &mut impl Rng, effect: &CaravanEffect) -> u64 {
    let minutes = match effect {
        CaravanEffect::Delay { minutes, .. } => match minutes {
            DelayMinutes::Fixed(m) => *m,
            DelayMinutes::Exponential(mean) => {
                let u = 1.0 - rng.random::<f64>();
                -mean * u.ln()
            }
        },
        CaravanEffect::Raid { .. } => 0.0,
    };
    (minutes.max(0.0) * 60_000.0).round() as u64
}

/// State changes produced by an event option.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionOutcome {
    /// Integrity change.
    pub integrity_delta: f64,
    /// Depth change.
    pub depth_delta: f64,
    /// Heat change.
    pub heat_delta: f64,
    /// Heat set outright, applied before the delta.
    pub heat_set: Option<f64>,
    /// Resources granted.
    pub resources: Vec<(ResourceKind, f64)>,
    /// Effect to start.
    pub effect_id: Option<&'static str>,
    /// The option opens a side tunnel.
    pub enters_tunnel: bool,
    /// Move the player to this region.
    pub relocate_to: Option<RegionId>,
    /// Fraction of rubies charged.
    pub ruby_fee_fraction: f64,
    /// Log line.
    pub message: String,
}

impl OptionOutcome {
    fn message(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            ..Self::default()
        }
    }
}

/// Fraction of rubies a rescue costs.
pub const RESCUE_FEE: f64 = 0.10;

/// Resolve a player's choice.
pub fn resolve_option(action: EventAction, rng: &mut impl Rng) -> OptionOutcome {
    match action {
        EventAction::TectonicHold => OptionOutcome {
            integrity_delta: -30.0,
            ..OptionOutcome::message("Held position. The hull took a beating.")
        },
        EventAction::TectonicPush => OptionOutcome {
            depth_delta: 1500.0,
            heat_delta: 40.0,
            ..OptionOutcome::message("Rode the shift down 1500 m.")
        },
        EventAction::PodLaser => {
            if rng.random::<f64>() < 0.5 {
                OptionOutcome::message("The laser melted the contents.")
            } else {
                OptionOutcome {
                    resources: vec![(ResourceKind::AncientTech, 20.0)],
                    ..OptionOutcome::message("The pod cracked open: +20 ancient tech.")
                }
            }
        }
        EventAction::PodHack => OptionOutcome {
            resources: vec![(ResourceKind::AncientTech, 5.0)],
            ..OptionOutcome::message("Decrypted the pod: +5 ancient tech.")
        },
        EventAction::AcceptFluctuation => OptionOutcome {
            effect_id: Some("QUANTUM_FLUCTUATION_EFFECT"),
            heat_set: Some(90.0),
            ..OptionOutcome::message("Quantum instability embraced.")
        },
        EventAction::AiTrust => OptionOutcome {
            depth_delta: 3000.0,
            heat_delta: 20.0,
            ..OptionOutcome::message("The AI's shortcut worked: +3000 m.")
        },
        EventAction::AiReboot => OptionOutcome {
            heat_set: Some(0.0),
            ..OptionOutcome::message("Logic core rebooted. Systems cold.")
        },
        EventAction::PurgeNanomites => OptionOutcome {
            resources: vec![(ResourceKind::NanoSwarm, 50.0)],
            ..OptionOutcome::message("Nanomites purged: +50 nano swarm.")
        },
        EventAction::CrystalAbsorb => OptionOutcome {
            resources: vec![(ResourceKind::Diamonds, 2.0)],
            heat_delta: 50.0,
            ..OptionOutcome::message("Crystal energy absorbed: +2 diamonds.")
        },
        EventAction::TunnelSafe
        | EventAction::TunnelRisky
        | EventAction::TunnelCrystal
        | EventAction::TunnelMine
        | EventAction::TunnelNest => OptionOutcome {
            enters_tunnel: true,
            ..OptionOutcome::message("Entering the side tunnel.")
        },
        EventAction::RescueAccept => OptionOutcome {
            relocate_to: Some(RegionId::RustValley),
            ruby_fee_fraction: RESCUE_FEE,
            ..OptionOutcome::message("Evacuated to Rust Valley.")
        },
        EventAction::RejectFluctuation => OptionOutcome::message("Field stabilized."),
        EventAction::BlackMarketBuy | EventAction::BlackMarketRefuse => {
            OptionOutcome::message("The contact disappears into the crowd.")
        }
        EventAction::RescueRefuse | EventAction::Ignore => OptionOutcome::message("Moving on."),
    }
}
