//! The static event catalog.

use cx_core::resource::ResourceKind;

use super::{
    BaseEffect, CaravanEffect, ConditionalRule, DelayMinutes, DepthCurve, EventAction,
    EventOption, EventTrigger, EventType, GameEvent, InstantResource, ProbabilityModel,
};

const BLANK: GameEvent = GameEvent {
    id: "",
    title: "",
    description: "",
    kind: EventType::Notification,
    weight: 0.0,
    min_depth: 0.0,
    options: &[],
    effect_id: None,
    instant_damage: None,
    instant_depth: None,
    instant_xp: None,
    instant_heat: None,
    force_artifact_drop: false,
    triggers: &[],
    probability: None,
    instant_resource: None,
    caravan_effect: None,
    base_effect: None,
    cooldown_secs: 0,
};

const fn option(label: &'static str, action: EventAction, risk: Option<&'static str>) -> EventOption {
    EventOption { label, action, risk }
}

/// Every event, in catalog order.
pub static EVENTS: [GameEvent; 26] = [
    // Geology
    GameEvent {
        id: "GAS_POCKET",
        title: "Gas Pocket",
        description: "Flammable gas ignites against the bit. Hull integrity compromised.",
        kind: EventType::Warning,
        weight: 15.0,
        min_depth: 200.0,
        instant_damage: Some(0.15),
        instant_heat: Some(20.0),
        ..BLANK
    },
    GameEvent {
        id: "GOLD_VEIN",
        title: "Gold Vein",
        description: "Dense mineral concentration ahead. Yield x5 for a short while.",
        kind: EventType::Notification,
        weight: 35.0,
        min_depth: 100.0,
        effect_id: Some("GOLD_RUSH_EFFECT"),
        ..BLANK
    },
    GameEvent {
        id: "TECTONIC_SHIFT",
        title: "Tectonic Shift",
        description: "The plates are moving. Depth is there for the taking, at a price.",
        kind: EventType::Warning,
        weight: 25.0,
        min_depth: 1000.0,
        options: &[
            option("Hold position", EventAction::TectonicHold, Some("hull damage")),
            option("Push through", EventAction::TectonicPush, Some("massive heat")),
        ],
        ..BLANK
    },
    // Fuel finds while drilling
    GameEvent {
        id: "GAS_POCKET_FUEL",
        title: "Gas Pocket Tapped",
        description: "The bit punched into a methane pocket. Tanks are filling.",
        kind: EventType::Notification,
        weight: 15.0,
        min_depth: 200.0,
        triggers: &[EventTrigger::Drilling],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.05,
            curve: DepthCurve::GasPocket,
        }),
        instant_resource: Some(InstantResource {
            kind: ResourceKind::Gas,
            min: Some(50.0),
            max: Some(150.0),
            mean: Some(100.0),
            std_dev: Some(25.0),
        }),
        cooldown_secs: 60,
        ..BLANK
    },
    GameEvent {
        id: "COAL_SEAM",
        title: "Coal Seam",
        description: "Dense black rock. Collectors switch to coal for five minutes.",
        kind: EventType::Buff,
        weight: 12.0,
        min_depth: 50.0,
        triggers: &[EventTrigger::Drilling],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.03,
            curve: DepthCurve::CoalSeam,
        }),
        effect_id: Some("COAL_SEAM_BUFF"),
        cooldown_secs: 120,
        ..BLANK
    },
    GameEvent {
        id: "OIL_DEPOSIT",
        title: "Oil Deposit",
        description: "Crude oil seeps down the tunnel walls. Tanks are filling.",
        kind: EventType::Notification,
        weight: 10.0,
        min_depth: 500.0,
        triggers: &[EventTrigger::Drilling],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.02,
            curve: DepthCurve::OilDeposit,
        }),
        instant_resource: Some(InstantResource {
            kind: ResourceKind::Oil,
            min: Some(200.0),
            max: Some(500.0),
            mean: Some(350.0),
            std_dev: Some(100.0),
        }),
        cooldown_secs: 180,
        ..BLANK
    },
    // Global map
    GameEvent {
        id: "COSMIC_STORM",
        title: "Cosmic Storm",
        description: "A magnetic storm grounds all traffic for 30 minutes. Caravans are held.",
        kind: EventType::Warning,
        weight: 5.0,
        triggers: &[EventTrigger::GlobalMapActive],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.01,
            curve: DepthCurve::Flat,
        }),
        caravan_effect: Some(CaravanEffect::Delay {
            minutes: DelayMinutes::Fixed(30.0),
            block_travel: true,
        }),
        cooldown_secs: 180,
        ..BLANK
    },
    GameEvent {
        id: "PIRATE_RAID",
        title: "Pirate Raid",
        description: "Pirates are closing on your caravan. Even odds to hold them off.",
        kind: EventType::Warning,
        weight: 8.0,
        triggers: &[EventTrigger::CaravanTraveling],
        probability: Some(ProbabilityModel::Conditional(ConditionalRule::PirateRaid)),
        caravan_effect: Some(CaravanEffect::Raid {
            success_chance: 0.5,
        }),
        cooldown_secs: 60,
        ..BLANK
    },
    GameEvent {
        id: "CARAVAN_DELAY",
        title: "Caravan Delayed",
        description: "Technical trouble on the road. The caravan is running late.",
        kind: EventType::Warning,
        weight: 20.0,
        triggers: &[EventTrigger::CaravanTraveling],
        probability: Some(ProbabilityModel::Conditional(ConditionalRule::CaravanDelay)),
        caravan_effect: Some(CaravanEffect::Delay {
            minutes: DelayMinutes::Exponential(30.0),
            block_travel: false,
        }),
        ..BLANK
    },
    // Rare finds
    GameEvent {
        id: "BLACK_MARKET_TIP",
        title: "Black Market Tip",
        description: "An anonymous contact knows where to get a cheap permit.",
        kind: EventType::Choice,
        weight: 3.0,
        triggers: &[EventTrigger::BaseVisit],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.005,
            curve: DepthCurve::Flat,
        }),
        options: &[
            option("Buy", EventAction::BlackMarketBuy, Some("raid risk")),
            option("Refuse", EventAction::BlackMarketRefuse, None),
        ],
        cooldown_secs: 360,
        ..BLANK
    },
    GameEvent {
        id: "WRECKAGE_DISCOVERY",
        title: "Wreckage Found",
        description: "A broken drill, a skeleton, and a stack of documents.",
        kind: EventType::Artifact,
        weight: 5.0,
        min_depth: 1000.0,
        triggers: &[EventTrigger::Drilling],
        probability: Some(ProbabilityModel::ExponentialDecay {
            base: 0.01,
            scale: 5000.0,
        }),
        force_artifact_drop: true,
        cooldown_secs: 240,
        ..BLANK
    },
    GameEvent {
        id: "RESCUE_CONVOY",
        title: "Rescue Convoy",
        description: "A rescue crew offers evacuation to Rust Valley, for a fee.",
        kind: EventType::Choice,
        weight: 15.0,
        triggers: &[EventTrigger::StuckInSpace],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.30,
            curve: DepthCurve::Flat,
        }),
        options: &[
            option("Accept", EventAction::RescueAccept, Some("10% of rubies")),
            option("Refuse", EventAction::RescueRefuse, None),
        ],
        ..BLANK
    },
    GameEvent {
        id: "DEFEND_THE_BASE",
        title: "Base Under Attack",
        description: "Raiders are hitting one of your red-zone bases.",
        kind: EventType::Warning,
        weight: 2.0,
        triggers: &[EventTrigger::BaseRaid],
        probability: Some(ProbabilityModel::Conditional(ConditionalRule::BaseRaid)),
        base_effect: Some(BaseEffect::Raid {
            defend_chance: 0.5,
            storage_loss_min: 0.2,
            storage_loss_max: 0.5,
            repair_cost: 10_000.0,
            defend_reward: 1000.0,
        }),
        cooldown_secs: 1440,
        ..BLANK
    },
    GameEvent {
        id: "PRICE_SPIKE",
        title: "Price Spike",
        description: "Demand for a rare resource has surged.",
        kind: EventType::Notification,
        weight: 10.0,
        triggers: &[EventTrigger::MarketUpdate],
        probability: Some(ProbabilityModel::Poisson {
            lambda: 0.02,
            curve: DepthCurve::Flat,
        }),
        effect_id: Some("PRICE_SPIKE_EFFECT"),
        cooldown_secs: 720,
        ..BLANK
    },
    // Items and artifacts
    GameEvent {
        id: "FOSSIL_FIND",
        title: "Strange Object",
        description: "The bit struck an anomalous mass with a technological signature.",
        kind: EventType::Artifact,
        weight: 20.0,
        min_depth: 10.0,
        force_artifact_drop: true,
        ..BLANK
    },
    GameEvent {
        id: "DORMANT_POD",
        title: "Dormant Pod",
        description: "An ancient supply container. Cut it open or take it apart?",
        kind: EventType::Choice,
        weight: 30.0,
        min_depth: 50.0,
        options: &[
            option("Laser it open", EventAction::PodLaser, Some("may destroy the loot")),
            option("Decrypt", EventAction::PodHack, None),
        ],
        ..BLANK
    },
    // Malfunctions
    GameEvent {
        id: "QUANTUM_FLUCTUATION",
        title: "Quantum Fluctuation",
        description: "Unstable space. Cooling goes offline but yield is multiplied by five.",
        kind: EventType::Warning,
        weight: 20.0,
        min_depth: 500.0,
        options: &[
            option("Take the risk", EventAction::AcceptFluctuation, Some("overheat")),
            option("Stabilize", EventAction::RejectFluctuation, None),
        ],
        ..BLANK
    },
    GameEvent {
        id: "MAGNETIC_STORM",
        title: "Magnetic Storm",
        description: "Ionospheric noise. Drones and auto systems are offline.",
        kind: EventType::Warning,
        weight: 20.0,
        min_depth: 50.0,
        effect_id: Some("MAGNETIC_INTERFERENCE"),
        ..BLANK
    },
    GameEvent {
        id: "AI_GLITCH",
        title: "AI Glitch",
        description: "The logic core suggests a shortcut straight through the magma.",
        kind: EventType::Choice,
        weight: 15.0,
        min_depth: 2000.0,
        options: &[
            option("Trust the AI", EventAction::AiTrust, Some("critical heat")),
            option("Reboot", EventAction::AiReboot, Some("lost progress")),
        ],
        ..BLANK
    },
    // Anomalies
    GameEvent {
        id: "NANOMITE_SWARM",
        title: "Nanomite Swarm",
        description: "Pest robots are eating the hull. Run the purge protocol?",
        kind: EventType::Anomaly,
        weight: 10.0,
        min_depth: 1000.0,
        options: &[option("Purge", EventAction::PurgeNanomites, None)],
        ..BLANK
    },
    GameEvent {
        id: "GRAVITY_ANOMALY",
        title: "Gravity Anomaly",
        description: "The probe loses its footing. Heat readings are unstable.",
        kind: EventType::Anomaly,
        weight: 10.0,
        min_depth: 3000.0,
        effect_id: Some("GRAVITY_WARP"),
        ..BLANK
    },
    GameEvent {
        id: "CRYSTAL_OVERLOAD",
        title: "Crystal Resonance",
        description: "The crystals hum in time with the bit. Energy floods the systems.",
        kind: EventType::Anomaly,
        weight: 15.0,
        min_depth: 8000.0,
        options: &[option("Absorb", EventAction::CrystalAbsorb, None)],
        ..BLANK
    },
    GameEvent {
        id: "PRECURSOR_ECHO",
        title: "Precursor Echo",
        description: "An archived data packet from a type III civilization.",
        kind: EventType::Notification,
        weight: 5.0,
        min_depth: 100.0,
        instant_xp: Some(500.0),
        ..BLANK
    },
    GameEvent {
        id: "QUANTUM_JUMP",
        title: "Quantum Jump",
        description: "Space folds. The drill drops 5000 m in an instant.",
        kind: EventType::Notification,
        weight: 2.0,
        min_depth: 1000.0,
        instant_depth: Some(5000.0),
        ..BLANK
    },
    // Side tunnels
    GameEvent {
        id: "SIDE_TUNNEL_DISCOVERY",
        title: "Side Tunnel",
        description: "Scanners found a branch. The walls are unstable but promising.",
        kind: EventType::Choice,
        weight: 25.0,
        min_depth: 300.0,
        options: &[
            option("Safe mining", EventAction::TunnelSafe, Some("low yield")),
            option("Explore", EventAction::TunnelRisky, Some("cave-in / artifact")),
        ],
        ..BLANK
    },
    // Core
    GameEvent {
        id: "CORE_RESONANCE",
        title: "Core Resonance",
        description: "The drill synchronizes with the planetary core.",
        kind: EventType::Anomaly,
        weight: 5.0,
        min_depth: 100_000.0,
        ..BLANK
    },
];

/// Look up an event by id.
pub fn event_by_id(id: &str) -> Option<&'static GameEvent> {
    EVENTS.iter().find(|e| e.id == id)
}
