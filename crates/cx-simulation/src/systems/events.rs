use std::any::Any;

use cx_core::artifact::roll_artifact;
use cx_core::effect::create_effect;
use cx_core::faction::Perk;
use cx_core::region::RegionId;
use cx_core::resource::{ResourceKind, Resources};
use cx_economy::base::{Facility, RaidOutcome};
use cx_economy::caravan::CaravanTier;
use cx_economy::market::base_price;
use cx_mechanics::event::roller::RECENT_EVENT_MEMORY;
use cx_mechanics::event::{
    BaseEffect, CaravanEffect, ConditionalRule, ProbabilityModel, caravan_delay_ms,
    event_by_id, event_probability, is_on_cooldown, matches_trigger, resolve_option,
    roll_random_event, sample_instant_resource,
};
use cx_mechanics::tunnel::{self, TunnelContext, TunnelKind};
use cx_mechanics::{EventAction, EventContext, EventTrigger, GameEvent};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::state::GameState;
use crate::system::System;

/// Ticks between event checks.
pub const CHECK_INTERVAL_TICKS: u32 = 10;

/// Event that discovers a side tunnel on trigger.
pub const SIDE_TUNNEL_EVENT: &str = "SIDE_TUNNEL_DISCOVERY";

/// Every context the player is in right now.
pub fn active_triggers(state: &GameState) -> Vec<EventTrigger> {
    let mut triggers = Vec::new();
    let traveling = state.is_traveling();
    if state.drilling && !traveling {
        triggers.push(EventTrigger::Drilling);
    }
    if traveling {
        triggers.push(EventTrigger::Traveling);
        triggers.push(EventTrigger::GlobalMapActive);
    }
    if state.caravan_en_route().is_some() {
        triggers.push(EventTrigger::CaravanTraveling);
    }
    if state.stuck {
        triggers.push(EventTrigger::StuckInSpace);
    }
    if !traveling && state.current_base().is_some_and(|b| b.is_active()) {
        triggers.push(EventTrigger::BaseVisit);
    }
    if !traveling && state.bases.has_station_in(state.region) {
        triggers.push(EventTrigger::MarketUpdate);
    }
    triggers
}

/// Market value of `cargo` at base prices.
pub fn cargo_value(cargo: &Resources) -> f64 {
    cargo
        .iter()
        .map(|(kind, amount)| base_price(kind).unwrap_or(0.0) * amount)
        .sum()
}

/// Facts the conditional rules read for `event`.
pub fn event_context(state: &GameState, event: &GameEvent, target_base: Option<Uuid>) -> EventContext {
    let mut ctx = EventContext {
        depth: state.depth,
        heat: state.vitals.heat,
        zone: state.region.info().base_zone,
        ..EventContext::default()
    };
    let caravan = event
        .caravan_effect
        .and_then(|_| state.caravan_en_route());
    if let Some(caravan) = caravan {
        ctx.zone = caravan
            .from_region
            .info()
            .base_zone
            .max(caravan.to_region.info().base_zone);
        ctx.cargo_value = cargo_value(&caravan.cargo);
        ctx.caravan_level = tier_level(caravan.tier);
    }
    let base = event
        .base_effect
        .and_then(|_| raid_target(state, target_base))
        .and_then(|id| state.bases.get(id));
    if let Some(base) = base {
        ctx.zone = base.region.info().base_zone;
        ctx.has_fortification = base.has(Facility::Fortification);
        ctx.has_guards = base.has(Facility::Guards);
    }
    ctx
}

fn tier_level(tier: CaravanTier) -> u32 {
    match tier {
        CaravanTier::OneStar => 1,
        CaravanTier::TwoStar => 2,
        CaravanTier::ThreeStar => 3,
    }
}

/// Chance that `event` fires within `window_secs`.
///
/// Conditional rules are rates: base raids per day, caravan incidents per hour.
pub fn windowed_chance(event: &GameEvent, ctx: &EventContext, window_secs: f64) -> f64 {
    let p = event_probability(event, ctx, window_secs);
    match event.probability {
        Some(ProbabilityModel::Conditional(ConditionalRule::BaseRaid)) => p * window_secs / 86_400.0,
        Some(ProbabilityModel::Conditional(_)) => p * window_secs / 3600.0,
        _ => p,
    }
    .clamp(0.0, 1.0)
}

fn raid_target(state: &GameState, explicit: Option<Uuid>) -> Option<Uuid> {
    explicit
        .or_else(|| state.current_base().map(|b| b.id))
        .or_else(|| state.bases.iter().next().map(|b| b.id))
}

/// Fire `event`: apply its instant effects and queue it for the player.
pub fn trigger_event(ctx: &mut SimContext<'_>, event: &'static GameEvent, target_base: Option<Uuid>) {
    let now = ctx.now_ms();
    let max = ctx.state.max_integrity();

    if let Some(frac) = event.instant_damage {
        let vitals = &mut ctx.state.vitals;
        vitals.integrity = (vitals.integrity - frac * max).max(0.0);
    }
    if let Some(metres) = event.instant_depth {
        ctx.state.depth += metres;
        ctx.state.max_depth = ctx.state.max_depth.max(ctx.state.depth);
    }
    if let Some(heat) = event.instant_heat {
        ctx.state.vitals.heat = (ctx.state.vitals.heat + heat).clamp(0.0, 100.0);
    }
    if let Some(res) = event.instant_resource {
        let amount = sample_instant_resource(ctx.rng, &res);
        ctx.state.resources.add(res.kind, amount);
    }
    if let Some(effect) = event.caravan_effect {
        apply_caravan_effect(ctx, &effect);
    }
    if let Some(BaseEffect::Raid {
        defend_chance,
        storage_loss_min,
        storage_loss_max,
        repair_cost,
        defend_reward,
    }) = event.base_effect
    {
        let liberation = if ctx.state.has_perk(Perk::Liberation) {
            Perk::Liberation.value()
        } else {
            0.0
        };
        let target = raid_target(ctx.state, target_base);
        if let Some(base) = target.and_then(|id| ctx.state.bases.get_mut(id)) {
            let chance = base.defend_chance(defend_chance, liberation);
            let region = base.region;
            let outcome = base.raid(ctx.rng, chance, storage_loss_min, storage_loss_max);
            let defended = outcome == RaidOutcome::Defended;
            if defended {
                ctx.state.resources.add(ResourceKind::Rubies, defend_reward);
            } else {
                ctx.state.resources.take_up_to(ResourceKind::Rubies, repair_cost);
            }
            info!(%region, defended, "base raided");
            ctx.emit(
                SimEventKind::BaseRaided { region, defended },
                if defended {
                    format!("raid on {region} beaten off")
                } else {
                    format!("base in {region} looted")
                },
            );
        }
    }
    if event.id == SIDE_TUNNEL_EVENT {
        let scanner = ctx.state.has_perk(Perk::AnomalyScanner);
        ctx.state.pending_tunnel = Some(tunnel::generate(ctx.rng, ctx.state.depth, scanner));
    }
    if let Some(level) = event.instant_xp.and_then(|xp| ctx.state.add_xp(xp)) {
        ctx.emit(SimEventKind::LevelUp { level }, format!("reached level {level}"));
    }

    let state = &mut *ctx.state;
    state.event_queue.push_back(event.id.to_string());
    state.recent_events.push(event.id.to_string());
    if state.recent_events.len() > RECENT_EVENT_MEMORY {
        let excess = state.recent_events.len() - RECENT_EVENT_MEMORY;
        state.recent_events.drain(..excess);
    }
    state.event_cooldowns.insert(event.id.to_string(), now);

    info!(event = event.id, "event triggered");
    ctx.emit(
        SimEventKind::EventTriggered {
            id: event.id.to_string(),
        },
        event.title,
    );
}

fn apply_caravan_effect(ctx: &mut SimContext<'_>, effect: &CaravanEffect) {
    let now = ctx.now_ms();
    let Some(caravan) = ctx.state.caravans.iter_mut().find(|c| c.in_transit()) else {
        return;
    };
    let id = caravan.id;
    match *effect {
        CaravanEffect::Delay { block_travel, .. } => {
            let ms = caravan_delay_ms(ctx.rng, effect);
            caravan.delay(ms);
            if block_travel {
                let until = now.saturating_add(ms);
                ctx.state.travel_blocked_until_ms = ctx.state.travel_blocked_until_ms.max(until);
            }
            ctx.emit(
                SimEventKind::CaravanDelayed { id, ms },
                format!("caravan held up for {} min", ms.div_ceil(60_000)),
            );
        }
        CaravanEffect::Raid { success_chance } => {
            if ctx.rng.random::<f64>() < success_chance {
                debug!(caravan = %id, "pirates driven off");
            } else {
                caravan.lose();
                info!(caravan = %id, "caravan taken by pirates");
                ctx.emit(SimEventKind::CaravanLost { id }, "caravan taken by pirates");
            }
        }
    }
}

/// Answer the event at the front of the queue.
///
/// Choice events need one of their options. Other events are dismissed,
/// which starts their effect and hands over any artifact.
pub fn resolve_event(ctx: &mut SimContext<'_>, choice: Option<EventAction>) -> SimResult<String> {
    let id = ctx
        .state
        .event_queue
        .front()
        .cloned()
        .ok_or_else(|| SimError::NotAllowed("no event is waiting".into()))?;
    let Some(event) = event_by_id(&id) else {
        ctx.state.event_queue.pop_front();
        return Err(SimError::NotAllowed(format!("unknown event {id} dropped")));
    };

    let message = match (event.is_choice(), choice) {
        (true, None) => {
            return Err(SimError::NotAllowed(format!("{id} needs a choice")));
        }
        (false, Some(action)) => {
            return Err(SimError::NotAllowed(format!("{id} has no option {action}")));
        }
        (true, Some(action)) => {
            let message = choose(ctx, event, action)?;
            ctx.emit(
                SimEventKind::EventResolved {
                    id: id.clone(),
                    action: action.id().to_string(),
                },
                message.clone(),
            );
            message
        }
        (false, None) => dismiss(ctx, event),
    };
    ctx.state.event_queue.pop_front();
    Ok(message)
}

fn dismiss(ctx: &mut SimContext<'_>, event: &GameEvent) -> String {
    let mut message = format!("{} acknowledged", event.title);
    if let Some(effect) = event.effect_id.and_then(create_effect) {
        message = format!("{} started", effect.name);
        let id = effect.id.clone();
        ctx.state.start_effect(ctx.rng, effect);
        ctx.emit(SimEventKind::EffectApplied { id }, message.clone());
    }
    if event.force_artifact_drop {
        let luck = ctx.state.stats().luck;
        let def = roll_artifact(ctx.rng, ctx.state.depth, luck);
        let now = ctx.now_ms();
        ctx.state.grant_artifact(ctx.rng, def, now);
        message = format!("found {}", def.name);
        ctx.emit(
            SimEventKind::ArtifactFound {
                def_id: def.id.to_string(),
            },
            message.clone(),
        );
    }
    message
}

fn tunnel_for(state: &GameState, event: &GameEvent, action: EventAction) -> SimResult<Option<TunnelKind>> {
    let Some(kind) = TunnelKind::from_action(action) else {
        return Ok(None);
    };
    let pending = state.pending_tunnel.as_ref().map(|t| t.kind);
    match kind {
        TunnelKind::Safe => Ok(Some(TunnelKind::Safe)),
        TunnelKind::Risky => Ok(Some(pending.unwrap_or(TunnelKind::Risky))),
        special if pending == Some(special) => Ok(Some(special)),
        _ => Err(SimError::NotAllowed(format!(
            "{} does not offer {action}",
            event.id
        ))),
    }
}

fn choose(ctx: &mut SimContext<'_>, event: &GameEvent, action: EventAction) -> SimResult<String> {
    let tunnel_kind = tunnel_for(ctx.state, event, action)?;
    if tunnel_kind.is_none() && !event.offers(action) {
        return Err(SimError::NotAllowed(format!(
            "{} does not offer {action}",
            event.id
        )));
    }

    let outcome = resolve_option(action, ctx.rng);
    let max = ctx.state.max_integrity();
    let state = &mut *ctx.state;

    state.vitals.integrity = (state.vitals.integrity + outcome.integrity_delta).clamp(0.0, max);
    if outcome.depth_delta != 0.0 {
        state.depth = (state.depth + outcome.depth_delta).max(0.0);
        state.max_depth = state.max_depth.max(state.depth);
    }
    if let Some(heat) = outcome.heat_set {
        state.vitals.heat = heat;
    }
    state.vitals.heat = (state.vitals.heat + outcome.heat_delta).clamp(0.0, 100.0);
    for (kind, amount) in &outcome.resources {
        state.resources.add(*kind, *amount);
    }
    if outcome.ruby_fee_fraction > 0.0 {
        let fee = (state.resources.get(ResourceKind::Rubies) * outcome.ruby_fee_fraction).floor();
        state.resources.take_up_to(ResourceKind::Rubies, fee);
    }
    if let Some(region) = outcome.relocate_to {
        relocate(state, region);
    }
    if let Some(effect) = outcome.effect_id.and_then(create_effect) {
        let id = effect.id.clone();
        ctx.state.start_effect(ctx.rng, effect);
        ctx.emit(SimEventKind::EffectApplied { id }, outcome.message.clone());
    }

    match tunnel_kind {
        Some(kind) if outcome.enters_tunnel => Ok(enter_tunnel(ctx, kind)),
        _ => Ok(outcome.message),
    }
}

fn relocate(state: &mut GameState, region: RegionId) {
    state.region = region;
    state.travel = None;
    state.stuck = false;
    state.visited_regions.insert(region);
}

fn enter_tunnel(ctx: &mut SimContext<'_>, kind: TunnelKind) -> String {
    let stats = ctx.state.stats();
    let tunnel_ctx = TunnelContext {
        luck: stats.luck,
        depth: ctx.state.depth,
        sabotage: ctx.state.has_perk(Perk::Sabotage),
        max_integrity: stats.integrity,
        defense: stats.defense,
    };
    let outcome = tunnel::resolve(ctx.rng, kind, &tunnel_ctx);
    ctx.state.pending_tunnel = None;

    for (res, amount) in &outcome.resources {
        ctx.state.resources.add(*res, *amount);
    }
    if outcome.tech > 0.0 {
        ctx.state.resources.add(ResourceKind::AncientTech, outcome.tech);
    }
    let vitals = &mut ctx.state.vitals;
    vitals.integrity = (vitals.integrity - outcome.damage).max(0.0);

    if let Some(def) = outcome.artifact {
        let now = ctx.now_ms();
        ctx.state.grant_artifact(ctx.rng, def, now);
        ctx.emit(
            SimEventKind::ArtifactFound {
                def_id: def.id.to_string(),
            },
            format!("found {} in the tunnel", def.name),
        );
    }

    let def = kind.def();
    if outcome.success {
        format!("{} cleared", def.name)
    } else {
        format!("{} collapsed: -{:.0} hull", def.name, outcome.damage)
    }
}

/// Periodically rolls a random event for the contexts the player is in.
#[derive(Debug, Default)]
pub struct EventSystem;

impl EventSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for EventSystem {
    fn name(&self) -> &str {
        "events"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        ctx.state.event_check_tick += 1;
        if ctx.state.event_check_tick < CHECK_INTERVAL_TICKS {
            return Ok(());
        }
        ctx.state.event_check_tick = 0;

        let state = &*ctx.state;
        if !state.event_queue.is_empty() || state.boss.is_some() || state.minigame.is_some() {
            return Ok(());
        }
        let triggers = active_triggers(state);
        if triggers.is_empty() {
            return Ok(());
        }

        let Some(event) = roll_random_event(ctx.rng, &state.recent_events, state.depth) else {
            return Ok(());
        };
        if !triggers.iter().any(|t| matches_trigger(event, *t)) {
            return Ok(());
        }
        let now = ctx.now_ms();
        let last = state.event_cooldowns.get(event.id).copied();
        if is_on_cooldown(last, now, event.cooldown_secs) {
            debug!(event = event.id, "event on cooldown");
            return Ok(());
        }

        let window = ctx.dt_secs() * f64::from(CHECK_INTERVAL_TICKS);
        let chance = windowed_chance(event, &event_context(state, event, None), window);
        if ctx.rng.random::<f64>() >= chance {
            return Ok(());
        }
        trigger_event(ctx, event, None);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::event::EventLog;
    use crate::systems::testing::run_system;
    use cx_core::region::ZoneColor;
    use cx_economy::base::BaseType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn with_ctx<T>(state: &mut GameState, f: impl FnOnce(&mut SimContext<'_>) -> T) -> (T, EventLog) {
        let clock = SimClock::new(0, 100);
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = SimContext {
            state,
            clock: &clock,
            events: &mut events,
            rng: &mut rng,
        };
        let out = f(&mut ctx);
        (out, events)
    }

    fn event(id: &str) -> &'static GameEvent {
        event_by_id(id).unwrap()
    }

    #[test]
    fn idle_player_sees_no_events() {
        let mut state = GameState::new();
        let log = run_system(&mut EventSystem::new(), &mut state, 10_000).unwrap();
        assert!(log.is_empty());
        assert!(state.event_queue.is_empty());
    }

    #[test]
    fn drilling_eventually_queues_an_event() {
        let mut state = GameState::new();
        state.drilling = true;
        state.depth = 500.0;
        let log = run_system(&mut EventSystem::new(), &mut state, 2_000).unwrap();
        assert_eq!(log.with_label("event").len(), 1);
        assert_eq!(state.event_queue.len(), 1);
        assert_eq!(state.recent_events.len(), 1);
    }

    #[test]
    fn triggers_follow_context() {
        let mut state = GameState::new();
        assert!(active_triggers(&state).is_empty());
        state.drilling = true;
        assert_eq!(active_triggers(&state), vec![EventTrigger::Drilling]);
        state.stuck = true;
        assert!(active_triggers(&state).contains(&EventTrigger::StuckInSpace));
    }

    #[test]
    fn recent_memory_is_bounded() {
        let mut state = GameState::new();
        for id in ["GOLD_VEIN", "FOSSIL_FIND", "MAGNETIC_STORM", "AI_GLITCH", "NANOMITE_SWARM", "GRAVITY_ANOMALY"] {
            with_ctx(&mut state, |ctx| trigger_event(ctx, event(id), None));
        }
        assert_eq!(state.recent_events.len(), RECENT_EVENT_MEMORY);
        assert_eq!(state.recent_events[0], "FOSSIL_FIND");
        assert_eq!(state.event_queue.len(), 6);
    }

    #[test]
    fn instant_effects_apply_on_trigger() {
        let mut state = GameState::new();
        with_ctx(&mut state, |ctx| trigger_event(ctx, event("GAS_POCKET"), None));
        assert_eq!(state.vitals.integrity, 85.0);
        assert_eq!(state.vitals.heat, 20.0);

        with_ctx(&mut state, |ctx| trigger_event(ctx, event("PRECURSOR_ECHO"), None));
        assert_eq!(state.xp, 500.0);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn dismissing_starts_the_effect() {
        let mut state = GameState::new();
        let (res, log) = with_ctx(&mut state, |ctx| {
            trigger_event(ctx, event("GOLD_VEIN"), None);
            resolve_event(ctx, None)
        });
        res.unwrap();
        assert!(state.event_queue.is_empty());
        assert!(state.effects.iter().any(|e| e.id == "GOLD_RUSH_EFFECT"));
        assert_eq!(log.with_label("effect").len(), 1);
    }

    #[test]
    fn artifact_events_hand_over_an_artifact() {
        let mut state = GameState::new();
        let (res, _) = with_ctx(&mut state, |ctx| {
            trigger_event(ctx, event("FOSSIL_FIND"), None);
            resolve_event(ctx, None)
        });
        res.unwrap();
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.artifacts_found, 1);
    }

    #[test]
    fn choice_events_need_a_valid_option() {
        let mut state = GameState::new();
        let (res, _) = with_ctx(&mut state, |ctx| {
            trigger_event(ctx, event("TECTONIC_SHIFT"), None);
            resolve_event(ctx, None)
        });
        assert!(res.is_err());
        let (res, _) = with_ctx(&mut state, |ctx| resolve_event(ctx, Some(EventAction::PodHack)));
        assert!(res.is_err());
        assert_eq!(state.event_queue.len(), 1);

        let (res, log) = with_ctx(&mut state, |ctx| resolve_event(ctx, Some(EventAction::TectonicPush)));
        res.unwrap();
        assert_eq!(state.depth, 1500.0);
        assert_eq!(state.vitals.heat, 40.0);
        assert_eq!(log.with_label("choice").len(), 1);
        assert!(state.event_queue.is_empty());
    }

    #[test]
    fn side_tunnel_is_generated_then_entered() {
        let mut state = GameState::new();
        state.depth = 500.0;
        let (res, _) = with_ctx(&mut state, |ctx| {
            trigger_event(ctx, event(SIDE_TUNNEL_EVENT), None);
            assert!(ctx.state.pending_tunnel.is_some());
            resolve_event(ctx, Some(EventAction::TunnelSafe))
        });
        res.unwrap();
        assert!(state.pending_tunnel.is_none());
        assert!(state.resources.get(ResourceKind::Copper) > 0.0);
    }

    #[test]
    fn rescue_returns_home_for_a_fee() {
        let mut state = GameState::new();
        state.region = RegionId::IronGates;
        state.stuck = true;
        state.resources.add(ResourceKind::Rubies, 1000.0);
        let (res, _) = with_ctx(&mut state, |ctx| {
            trigger_event(ctx, event("RESCUE_CONVOY"), None);
            resolve_event(ctx, Some(EventAction::RescueAccept))
        });
        res.unwrap();
        assert_eq!(state.region, RegionId::RustValley);
        assert!(!state.stuck);
        assert_eq!(state.resources.get(ResourceKind::Rubies), 900.0);
    }

    #[test]
    fn base_raid_hits_storage_or_pays_out() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GameState::new();
        state.resources.add(ResourceKind::Rubies, 1_000_000.0);
        state.resources.add(ResourceKind::Stone, 10_000.0);
        state
            .bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut state.resources, 0)
            .unwrap();
        let before = state.resources.get(ResourceKind::Rubies);

        let (_, log) = with_ctx(&mut state, |ctx| trigger_event(ctx, event("DEFEND_THE_BASE"), None));
        let raids = log.with_label("raid");
        assert_eq!(raids.len(), 1);
        let after = state.resources.get(ResourceKind::Rubies);
        match raids[0].kind {
            SimEventKind::BaseRaided { defended: true, .. } => assert_eq!(after, before + 1000.0),
            _ => assert_eq!(after, before - 10_000.0),
        }
    }

    #[test]
    fn zone_risk_shapes_conditional_chances() {
        let state = GameState::new();
        let pirate = event("PIRATE_RAID");
        let safe = EventContext {
            zone: ZoneColor::Green,
            ..event_context(&state, pirate, None)
        };
        let red = EventContext {
            zone: ZoneColor::Red,
            ..event_context(&state, pirate, None)
        };
        assert!(windowed_chance(pirate, &red, 3600.0) > windowed_chance(pirate, &safe, 3600.0));
    }

    #[test]
    fn context_zone_follows_region_danger_not_player_level() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new();
        assert_eq!(state.level, 1);
        let raid = event("DEFEND_THE_BASE");
        assert_eq!(event_context(&state, raid, None).zone, ZoneColor::Green);

        state.resources.add(ResourceKind::Rubies, 1_000_000.0);
        state.resources.add(ResourceKind::Stone, 10_000.0);
        state
            .bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut state.resources, 0)
            .unwrap();
        let ctx = event_context(&state, raid, None);
        assert_eq!(ctx.zone, ZoneColor::Green);
        assert_eq!(windowed_chance(raid, &ctx, 86_400.0), 0.0);
    }
}
